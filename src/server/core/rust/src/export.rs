/* src/server/core/rust/src/export.rs */

use std::path::{Path, PathBuf};

use premix_engine::{build_path, data_url, PageState};

use crate::errors::PremixError;
use crate::http::PageRequest;
use crate::page::LoaderKind;
use crate::render::Renderer;

/// On-disk locations of a page's static HTML and data JSON under `root`.
/// `/` maps to `index.html` and `_premix/data/index.json`.
pub fn static_paths(root: &Path, page_path: &str) -> (PathBuf, PathBuf) {
  let trimmed = page_path.trim_matches('/');
  let html = if trimmed.is_empty() { "index.html".to_string() } else { format!("{trimmed}.html") };
  let json = data_url(page_path);
  (root.join(html), root.join(json.trim_start_matches('/')))
}

/// Persist a rendered page as static HTML plus its data JSON.
pub async fn write_page(root: &Path, page_path: &str, html: &str, state: &PageState) -> Result<(), PremixError> {
  let (html_path, json_path) = static_paths(root, page_path);
  let json = serde_json::to_vec(&state.to_json())?;
  for (path, contents) in [(&html_path, html.as_bytes()), (&json_path, json.as_slice())] {
    if let Some(parent) = path.parent() {
      tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents)
      .await
      .map_err(|e| PremixError::internal(format!("failed to write {}", path.display())).caused_by(&e))?;
  }
  Ok(())
}

/// Pre-render every route into `out_dir`. Dynamic routes are expanded with
/// their `load_paths`; dynamic routes without one are skipped. Returns the
/// exported URL paths.
pub async fn export_static(renderer: &Renderer, out_dir: &Path) -> Result<Vec<String>, PremixError> {
  let mut urls = Vec::new();
  for route in &renderer.manifest().routes {
    let module = renderer.pages().get(&route.page_id).await?;
    if module.action.is_some() {
      tracing::warn!(route = %route.path, "actions do not work with prerendering");
    }
    if module.loader.kind() == LoaderKind::Server {
      tracing::warn!(route = %route.path, "skipping page with a server loader");
      continue;
    }
    match &module.load_paths {
      Some(load_paths) => {
        for params in load_paths().await? {
          let url = build_path(&route.path, &params).ok_or_else(|| {
            PremixError::configuration(format!("load_paths for {} is missing a route parameter", route.path))
          })?;
          urls.push(url);
        }
      }
      None if route.path.contains(':') => {
        tracing::warn!(route = %route.path, "dynamic route has no load_paths, not exported");
      }
      None => urls.push(route.path.clone()),
    }
  }

  for url in &urls {
    let page = renderer.render(PageRequest::get(url.as_str())).await?;
    let html = renderer.document(&page);
    write_page(out_dir, url, &html, &page.state).await?;
    tracing::info!(url = %url, "pre-rendered");
  }
  Ok(urls)
}
