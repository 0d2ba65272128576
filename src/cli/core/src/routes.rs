/* src/cli/core/src/routes.rs */

// `premix routes`: the route table in match order.

use std::path::Path;

use anyhow::Result;
use premix_server::{Route, RouteManifest};

use crate::build::discover_routes;
use crate::config::PremixConfig;
use crate::ui::{self, CYAN, DIM, RESET};

pub fn run_routes(config: &PremixConfig, base_dir: &Path) -> Result<()> {
  let manifest = discover_routes(config, base_dir)?;
  ui::banner("routes");
  for line in route_table(&manifest) {
    ui::detail(&line);
  }
  ui::blank();
  let pages = ui::count(manifest.routes.len(), "page");
  let api = ui::count(manifest.api_routes.len(), "api route");
  ui::ok(&format!("{pages}, {api} {DIM}({}){RESET}", manifest.version));
  Ok(())
}

/// One aligned line per route; pages first, then API routes.
pub fn route_table(manifest: &RouteManifest) -> Vec<String> {
  let all: Vec<(&str, &Route)> = manifest
    .routes
    .iter()
    .map(|r| ("page", r))
    .chain(manifest.api_routes.iter().map(|r| ("api", r)))
    .collect();
  let width = all.iter().map(|(_, r)| r.path.len()).max().unwrap_or(0);
  all
    .iter()
    .map(|(kind, route)| {
      format!("{CYAN}{kind:<4}{RESET} {:<width$}  {DIM}{}{RESET}", route.path, route.page_path)
    })
    .collect()
}
