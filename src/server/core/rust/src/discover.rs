/* src/server/core/rust/src/discover.rs */

// Page discovery: walk the pages directory and turn file paths into routes.
// Order is "sort by relative file path, then reverse", which puts static
// names ahead of `$param` files at the same level.

use std::path::Path;

use premix_engine::Route;
use walkdir::WalkDir;

use crate::errors::PremixError;

pub const DEFAULT_EXTENSIONS: &[&str] = &["tsx", "ts", "jsx", "js"];

/// Subdirectory of the pages root holding API handlers.
pub const API_DIR: &str = "api";

/// Page routes under `pages_root`, excluding the `api` subtree.
pub fn discover(pages_root: impl AsRef<Path>) -> Result<Vec<Route>, PremixError> {
  discover_with(pages_root.as_ref(), DEFAULT_EXTENSIONS)
}

pub fn discover_with(pages_root: &Path, extensions: &[&str]) -> Result<Vec<Route>, PremixError> {
  ensure_dir(pages_root)?;
  let files = collect_files(pages_root, extensions, true)?;
  Ok(build_routes(pages_root, files, ""))
}

/// API routes under `<pages_root>/api`, patterns prefixed with `/api`.
/// No `api` directory means no API routes.
pub fn discover_api(pages_root: impl AsRef<Path>) -> Result<Vec<Route>, PremixError> {
  discover_api_with(pages_root.as_ref(), DEFAULT_EXTENSIONS)
}

pub fn discover_api_with(pages_root: &Path, extensions: &[&str]) -> Result<Vec<Route>, PremixError> {
  ensure_dir(pages_root)?;
  let api_root = pages_root.join(API_DIR);
  if !api_root.is_dir() {
    return Ok(Vec::new());
  }
  let files = collect_files(&api_root, extensions, false)?;
  Ok(build_routes(&api_root, files, "/api"))
}

fn ensure_dir(pages_root: &Path) -> Result<(), PremixError> {
  if pages_root.is_dir() {
    Ok(())
  } else {
    Err(PremixError::configuration(format!(
      "pages directory not found: {}",
      pages_root.display()
    )))
  }
}

/// Relative `/`-separated paths of every page file under `root`.
fn collect_files(root: &Path, extensions: &[&str], skip_api: bool) -> Result<Vec<String>, PremixError> {
  let mut files = Vec::new();
  let walker = WalkDir::new(root).follow_links(true).into_iter().filter_entry(|entry| {
    !(skip_api && entry.depth() == 1 && entry.file_type().is_dir() && entry.file_name() == API_DIR)
  });

  for entry in walker {
    let entry = entry.map_err(|e| {
      PremixError::configuration(format!("failed to read pages directory {}", root.display())).caused_by(&e)
    })?;
    if !entry.file_type().is_file() {
      continue;
    }
    let path = entry.path();
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
      continue;
    };
    if !extensions.contains(&ext) {
      continue;
    }
    if let Ok(rel) = path.strip_prefix(root) {
      files.push(to_slash(rel));
    }
  }

  files.sort();
  files.reverse();
  Ok(files)
}

fn build_routes(root: &Path, files: Vec<String>, prefix: &str) -> Vec<Route> {
  let root_label = to_slash(root);
  let root_label = root_label.trim_end_matches('/');
  files
    .into_iter()
    .map(|rel| {
      let stem = strip_extension(&rel);
      let pattern = route_pattern(stem);
      let path = match (prefix, pattern.as_str()) {
        ("", p) => p.to_string(),
        (pre, "/") => pre.to_string(),
        (pre, p) => format!("{pre}{p}"),
      };
      let page_id = if prefix.is_empty() { stem.to_string() } else { format!("{API_DIR}/{stem}") };
      Route { path, page_id, page_path: format!("{root_label}/{rel}") }
    })
    .collect()
}

/// `posts/$post` -> `/posts/:post`; a lone `index` -> `/`.
pub fn route_pattern(stem: &str) -> String {
  if stem == "index" {
    return "/".to_string();
  }
  let segments: Vec<String> = stem
    .split('/')
    .map(|segment| match segment.strip_prefix('$') {
      Some(name) => format!(":{name}"),
      None => segment.to_string(),
    })
    .collect();
  format!("/{}", segments.join("/"))
}

fn strip_extension(rel: &str) -> &str {
  match rel.rfind('.') {
    Some(dot) if !rel[dot..].contains('/') => &rel[..dot],
    _ => rel,
  }
}

fn to_slash(path: &Path) -> String {
  path.to_string_lossy().replace('\\', "/")
}
