/* src/server/engine/rust/src/route.rs */

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::matcher::is_match;

/// One entry of the route table produced by discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
  /// Pattern with `:name` dynamic segments, e.g. `/posts/:post`.
  pub path: String,
  /// Stable page id: the file path under the pages root without extension.
  pub page_id: String,
  /// Source path as the bundler records it, e.g. `app/pages/posts/$post.tsx`.
  pub page_path: String,
}

/// Ordered route table shared by the server and the client bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteManifest {
  /// Content hash of the tables below, used to detect client/server skew.
  pub version: String,
  pub routes: Vec<Route>,
  #[serde(default)]
  pub api_routes: Vec<Route>,
}

impl RouteManifest {
  pub fn new(routes: Vec<Route>, api_routes: Vec<Route>) -> Self {
    let version = manifest_hash(&routes, &api_routes);
    Self { version, routes, api_routes }
  }

  /// First page route matching `path`, in table order.
  pub fn find(&self, path: &str) -> Option<&Route> {
    find_route(&self.routes, path)
  }

  pub fn find_api(&self, path: &str) -> Option<&Route> {
    find_route(&self.api_routes, path)
  }

  /// False when the tables were edited after the version was computed.
  pub fn is_consistent(&self) -> bool {
    self.version == manifest_hash(&self.routes, &self.api_routes)
  }
}

/// Linear first-match scan. Table order is the precedence rule.
pub fn find_route<'a>(routes: &'a [Route], path: &str) -> Option<&'a Route> {
  routes.iter().find(|route| is_match(&route.path, path))
}

/// Short hex digest over every route field, in order.
pub fn manifest_hash(routes: &[Route], api_routes: &[Route]) -> String {
  let mut hasher = Sha256::new();
  for (section, table) in [("pages", routes), ("api", api_routes)] {
    hasher.update(section.as_bytes());
    hasher.update([b'\n']);
    for route in table {
      for field in [&route.path, &route.page_id, &route.page_path] {
        hasher.update(field.as_bytes());
        hasher.update([0]);
      }
      hasher.update([b'\n']);
    }
  }
  hex::encode(&hasher.finalize()[..8])
}
