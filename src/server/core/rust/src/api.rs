/* src/server/core/rust/src/api.rs */

use std::collections::HashMap;
use std::sync::Arc;

use premix_engine::{extract_params, RouteManifest};

use crate::errors::PremixError;
use crate::http::{HttpResponse, PageRequest};
use crate::page::ApiHandlerFn;

/// Handlers for `pages/api/**`, matched against the manifest's API table.
pub struct ApiRoutes {
  manifest: Arc<RouteManifest>,
  handlers: HashMap<String, ApiHandlerFn>,
}

impl ApiRoutes {
  pub fn new(manifest: Arc<RouteManifest>, handlers: HashMap<String, ApiHandlerFn>) -> Self {
    Self { manifest, handlers }
  }

  pub async fn call(&self, mut req: PageRequest) -> Result<HttpResponse, PremixError> {
    let route = self.manifest.find_api(&req.path).ok_or_else(|| PremixError::not_found("Page not found"))?;
    let handler = self
      .handlers
      .get(&route.page_id)
      .ok_or_else(|| PremixError::internal(format!("no API handler registered for '{}'", route.page_id)))?;
    req.params = extract_params(&route.path, &req.path).unwrap_or_default();
    handler(req).await
  }
}
