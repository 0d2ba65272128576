/* src/server/core/rust/src/build_loader.rs */

// Read the route manifest written by `premix build`.

use std::path::Path;

use premix_engine::RouteManifest;

use crate::errors::PremixError;

pub const ROUTE_MANIFEST: &str = "route-manifest.json";

pub fn load_route_manifest(build_dir: impl AsRef<Path>) -> Result<RouteManifest, PremixError> {
  let path = build_dir.as_ref().join(ROUTE_MANIFEST);
  let content = std::fs::read_to_string(&path).map_err(|e| {
    PremixError::configuration("route manifest not found: run `premix build` first")
      .context(format!("reading {}", path.display()))
      .caused_by(&e)
  })?;
  parse_route_manifest(&content)
}

pub fn parse_route_manifest(json: &str) -> Result<RouteManifest, PremixError> {
  let manifest: RouteManifest = serde_json::from_str(json)
    .map_err(|e| PremixError::configuration("route manifest is not valid JSON").caused_by(&e))?;
  if !manifest.is_consistent() {
    return Err(PremixError::configuration("route manifest version does not match its routes: rerun `premix build`"));
  }
  Ok(manifest)
}
