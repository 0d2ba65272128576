/* src/cli/core/src/build/mod.rs */

// `premix build` (4 steps): discover routes, write the client variant of
// every page, write the route manifest plus the generated route module, then
// run the bundler and verify its metafile.

mod entry;


use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use premix_server::discover::{discover_api_with, discover_with};
use premix_server::{AssetIndex, Route, RouteManifest, ROUTE_MANIFEST};

use crate::config::PremixConfig;
use crate::shell::run_command;
use crate::ui::{self, DIM, RESET};

pub use entry::{import_prefix, render_routes_module, ROUTES_MODULE};

/// Directory under `out_dir` holding the client variant of every page, laid
/// out by project-relative page path.
pub const CLIENT_PAGES_DIR: &str = "client";

#[derive(Debug)]
pub struct BuildSummary {
  pub manifest: RouteManifest,
  pub stripped: usize,
  pub bundled: bool,
}

pub fn run_build(config: &PremixConfig, base_dir: &Path) -> Result<BuildSummary> {
  let started = Instant::now();
  ui::banner("build");

  // [1/4] Discover routes
  ui::step(1, 4, "Discovering routes");
  let manifest = discover_routes(config, base_dir)?;
  let pages = ui::count(manifest.routes.len(), "page");
  ui::detail_ok(&format!("{pages}, {}", ui::count(manifest.api_routes.len(), "api route")));
  ui::blank();

  // [2/4] Client transform
  ui::step(2, 4, "Transforming pages");
  let stripped = write_client_pages(base_dir, &base_dir.join(&config.build.out_dir), &manifest.routes)?;
  ui::detail_ok(&format!("{} stripped", ui::count(stripped, "server-only export")));
  ui::blank();

  // [3/4] Route manifest + generated module
  ui::step(3, 4, "Writing route manifest");
  write_outputs(config, base_dir, &manifest)?;
  ui::blank();

  // [4/4] Bundle
  ui::step(4, 4, "Bundling client");
  let bundled = match &config.build.bundler_command {
    Some(command) => {
      run_command(base_dir, command, "bundler", &bundler_env(config))?;
      verify_metafile(config, base_dir)?;
      true
    }
    None => {
      ui::warn("build.bundler_command is not set, skipping bundling");
      false
    }
  };
  ui::blank();

  ui::ok(&format!("build complete in {}", ui::elapsed(started.elapsed())));
  Ok(BuildSummary { manifest, stripped, bundled })
}

/// Page and API route tables, with page paths relative to the project root
/// so they line up with the bundler's metafile keys.
pub fn discover_routes(config: &PremixConfig, base_dir: &Path) -> Result<RouteManifest> {
  let root = base_dir.join(&config.pages.root);
  let extensions = config.extensions();
  let routes = discover_with(&root, &extensions).context("route discovery failed")?;
  let api_routes = discover_api_with(&root, &extensions).context("api route discovery failed")?;
  let label = project_label(&config.pages.root);
  Ok(RouteManifest::new(relativize(routes, &root, &label), relativize(api_routes, &root, &label)))
}

fn project_label(pages_root: &str) -> String {
  let label = pages_root.replace('\\', "/");
  let label = label.strip_prefix("./").unwrap_or(&label);
  label.trim_end_matches('/').to_string()
}

fn relativize(routes: Vec<Route>, root: &Path, label: &str) -> Vec<Route> {
  let absolute = root.to_string_lossy().replace('\\', "/");
  let absolute = absolute.trim_end_matches('/');
  routes
    .into_iter()
    .map(|mut route| {
      if let Some(rest) = route.page_path.strip_prefix(absolute) {
        route.page_path = format!("{label}{rest}");
      }
      route
    })
    .collect()
}

/// Run the client transform on every page and write each client variant
/// under `<out_dir>/client`, where the bundler loads it in place of the
/// source. Nothing is written unless every page transforms. Returns the
/// total number of stripped exports.
fn write_client_pages(base_dir: &Path, out_dir: &Path, routes: &[Route]) -> Result<usize> {
  let mut variants = Vec::with_capacity(routes.len());
  let mut stripped = 0;
  for route in routes {
    let path = base_dir.join(&route.page_path);
    let source =
      std::fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
    let out = premix_transform::transform(&route.page_path, &source)?;
    if !out.stripped.is_empty() {
      ui::detail(&format!("{}  {DIM}-{}{RESET}", route.page_id, out.stripped.join(", -")));
    }
    stripped += out.stripped.len();
    variants.push((&route.page_path, out.client));
  }

  let client_dir = out_dir.join(CLIENT_PAGES_DIR);
  if client_dir.exists() {
    std::fs::remove_dir_all(&client_dir)
      .with_context(|| format!("failed to clear {}", client_dir.display()))?;
  }
  for (page_path, client) in variants {
    let target = client_page_path(&client_dir, page_path);
    if let Some(parent) = target.parent() {
      std::fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(&target, client).with_context(|| format!("failed to write {}", target.display()))?;
  }
  Ok(stripped)
}

/// `<client_dir>/<page_path>`, keeping only the normal components of the
/// page path so an absolute pages root never escapes `client_dir`.
pub fn client_page_path(client_dir: &Path, page_path: &str) -> PathBuf {
  let mut path = client_dir.to_path_buf();
  for component in Path::new(page_path).components() {
    if let Component::Normal(part) = component {
      path.push(part);
    }
  }
  path
}

fn write_outputs(config: &PremixConfig, base_dir: &Path, manifest: &RouteManifest) -> Result<()> {
  let out_dir = base_dir.join(&config.build.out_dir);
  std::fs::create_dir_all(&out_dir).with_context(|| format!("failed to create {}", out_dir.display()))?;

  let manifest_out = out_dir.join(ROUTE_MANIFEST);
  let manifest_json = serde_json::to_string_pretty(manifest)?;
  std::fs::write(&manifest_out, manifest_json)
    .with_context(|| format!("failed to write {}", manifest_out.display()))?;
  ui::detail_ok(ROUTE_MANIFEST);

  let module_out = out_dir.join(ROUTES_MODULE);
  let module = render_routes_module(manifest, &import_prefix(base_dir, &config.build.out_dir));
  std::fs::write(&module_out, module).with_context(|| format!("failed to write {}", module_out.display()))?;
  ui::detail_ok(ROUTES_MODULE);
  Ok(())
}

/// Environment handed to the bundler command.
fn bundler_env(config: &PremixConfig) -> Vec<(&'static str, String)> {
  let options = config.server_options();
  vec![
    ("PREMIX_ENV", "production".to_string()),
    ("PREMIX_CLIENT_ENTRY", config.build.client_entry.clone()),
    ("PREMIX_ROUTES_MODULE", format!("{}/{ROUTES_MODULE}", config.build.out_dir.trim_end_matches('/'))),
    ("PREMIX_OUT_DIR", config.build.out_dir.clone()),
    ("PREMIX_CLIENT_PAGES", format!("{}/{CLIENT_PAGES_DIR}", config.build.out_dir.trim_end_matches('/'))),
    ("PREMIX_PUBLIC_DIR", config.build.public_dir.clone()),
    ("PREMIX_PUBLIC_PATH", config.build.public_path.clone()),
    ("PREMIX_METAFILE", options.metafile_path().to_string_lossy().into_owned()),
  ]
}

/// The bundler must have written a metafile that knows the client entry.
fn verify_metafile(config: &PremixConfig, base_dir: &Path) -> Result<AssetIndex> {
  let path = base_dir.join(config.server_options().metafile_path());
  let json =
    std::fs::read_to_string(&path).with_context(|| format!("bundler did not write {}", path.display()))?;
  let index = AssetIndex::parse(&json, &config.build.public_dir, &config.build.client_entry)
    .with_context(|| format!("invalid metafile {}", path.display()))?;
  ui::detail_ok(&format!("{} (+{})", index.root_script(), ui::count(index.root_imports().len(), "chunk")));
  Ok(index)
}
