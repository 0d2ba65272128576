/* src/server/core/rust/src/server.rs */

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use premix_engine::RouteManifest;

use crate::api::ApiRoutes;
use crate::build_loader::{load_route_manifest, ROUTE_MANIFEST};
use crate::config::ServerOptions;
use crate::discover::{discover, discover_api};
use crate::errors::PremixError;
use crate::http::{HttpResponse, PageRequest};
use crate::metafile::{AssetIndex, MetafileSource};
use crate::page::{api_handler, ApiHandlerFn, PageModule};
use crate::registry::PageRegistry;
use crate::render::Renderer;
use crate::revalidate::{Clock, RevalidationState, Revalidator, SystemClock};

/// Framework-agnostic parts extracted from `PremixServer`.
/// Adapter crates consume this to build framework-specific routers.
pub struct PremixParts {
  pub renderer: Arc<Renderer>,
  pub api: Arc<ApiRoutes>,
  /// Present only in production mode.
  pub revalidator: Option<Arc<Revalidator>>,
  pub options: ServerOptions,
}

pub struct PremixServer {
  manifest: Option<RouteManifest>,
  pages: PageRegistry,
  api: HashMap<String, ApiHandlerFn>,
  options: ServerOptions,
  shell: Option<String>,
  assets: Option<AssetIndex>,
  clock: Option<Arc<dyn Clock>>,
}

impl PremixServer {
  pub fn new() -> Self {
    Self {
      manifest: None,
      pages: PageRegistry::new(),
      api: HashMap::new(),
      options: ServerOptions::default(),
      shell: None,
      assets: None,
      clock: None,
    }
  }

  /// Use this route table instead of reading `route-manifest.json`.
  pub fn manifest(mut self, manifest: RouteManifest) -> Self {
    self.manifest = Some(manifest);
    self
  }

  pub fn page(mut self, page_id: impl Into<String>, module: PageModule) -> Self {
    self.pages.insert(page_id, module);
    self
  }

  /// Register a page whose module is built on first request.
  pub fn lazy_page<F, Fut>(mut self, page_id: impl Into<String>, load: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<PageModule, PremixError>> + Send + 'static,
  {
    self.pages.insert_lazy(page_id, load);
    self
  }

  /// Register the handler for an API route id such as `api/hello`.
  pub fn api<F, Fut>(mut self, page_id: impl Into<String>, handler: F) -> Self
  where
    F: Fn(PageRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<HttpResponse, PremixError>> + Send + 'static,
  {
    self.api.insert(page_id.into(), api_handler(handler));
    self
  }

  pub fn options(mut self, options: ServerOptions) -> Self {
    self.options = options;
    self
  }

  /// HTML shell with `<!--premix:head-->`, `<!--premix:body-->` and
  /// `<!--premix:scripts-->` markers.
  pub fn shell(mut self, shell: impl Into<String>) -> Self {
    self.shell = Some(shell.into());
    self
  }

  /// Use an in-memory asset index instead of the metafile on disk.
  pub fn asset_index(mut self, index: AssetIndex) -> Self {
    self.assets = Some(index);
    self
  }

  pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.clock = Some(clock);
    self
  }

  /// Consume the builder. Fails when the manifest cannot be loaded or names a
  /// page id nothing was registered for.
  pub fn into_parts(self) -> Result<PremixParts, PremixError> {
    let manifest = match self.manifest {
      Some(m) => m,
      None => manifest_from_disk(&self.options)?,
    };

    let missing: Vec<&str> = manifest
      .routes
      .iter()
      .filter(|r| !self.pages.contains(&r.page_id))
      .chain(manifest.api_routes.iter().filter(|r| !self.api.contains_key(&r.page_id)))
      .map(|r| r.page_id.as_str())
      .collect();
    if !missing.is_empty() {
      return Err(PremixError::configuration(format!("no module registered for: {}", missing.join(", "))));
    }

    tracing::info!(
      pages = manifest.routes.len(),
      api = manifest.api_routes.len(),
      version = %manifest.version,
      mode = ?self.options.mode,
      "premix routes loaded"
    );

    let manifest = Arc::new(manifest);
    let assets = match self.assets {
      Some(index) => MetafileSource::fixed(index),
      None => MetafileSource::from_options(&self.options),
    };
    let mut renderer = Renderer::new(manifest.clone(), Arc::new(self.pages), assets)
      .loader_timeout(self.options.loader_timeout);
    if let Some(shell) = self.shell {
      renderer = renderer.shell(shell);
    }
    let renderer = Arc::new(renderer);

    let revalidator = (!self.options.mode.is_dev()).then(|| {
      let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock::default()));
      let state = RevalidationState::new(clock, self.options.revalidate_cap);
      Arc::new(Revalidator::new(renderer.clone(), self.options.public_dir.clone(), state))
    });

    Ok(PremixParts { renderer, api: Arc::new(ApiRoutes::new(manifest, self.api)), revalidator, options: self.options })
  }
}

/// Read `route-manifest.json`. Development falls back to discovering the
/// pages root when no build has run yet.
fn manifest_from_disk(options: &ServerOptions) -> Result<RouteManifest, PremixError> {
  if !options.mode.is_dev() || options.build_dir.join(ROUTE_MANIFEST).exists() {
    return load_route_manifest(&options.build_dir);
  }
  tracing::warn!(pages_root = %options.pages_root, "no route manifest, discovering routes");
  let root = Path::new(&options.pages_root);
  Ok(RouteManifest::new(discover(root)?, discover_api(root)?))
}

impl Default for PremixServer {
  fn default() -> Self {
    Self::new()
  }
}
