/* src/server/core/rust/src/render.rs */

// The request render pipeline. One pass produces the page state; the HTML
// document and the JSON data endpoint are two serializations of it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use premix_engine::{
  assemble_links, extract_params, render_document, LoaderData, PageState, Route, RouteManifest, DEFAULT_SHELL,
};

use crate::errors::PremixError;
use crate::http::{HttpResponse, PageRequest};
use crate::metafile::MetafileSource;
use crate::page::{Loader, LoaderKind, PageModule, StaticContext};
use crate::registry::PageRegistry;

/// Result of rendering one request.
pub struct RenderedPage {
  pub route: Route,
  pub module: Arc<PageModule>,
  pub state: PageState,
  pub loader: LoaderKind,
}

impl RenderedPage {
  /// Body markup from the page's render function.
  pub fn render(&self) -> String {
    (self.module.render)(&self.state)
  }

  /// Revalidation interval, only for static-loader pages that declared one.
  pub fn revalidate(&self) -> Option<u64> {
    match self.loader {
      LoaderKind::Static => self.state.data.revalidate,
      _ => None,
    }
  }

  /// Pages with per-request data or side effects are never regenerated.
  pub fn is_static(&self) -> bool {
    self.loader != LoaderKind::Server && self.module.action.is_none()
  }
}

pub struct Renderer {
  manifest: Arc<RouteManifest>,
  pages: Arc<PageRegistry>,
  assets: MetafileSource,
  shell: String,
  loader_timeout: Option<Duration>,
}

impl Renderer {
  pub fn new(manifest: Arc<RouteManifest>, pages: Arc<PageRegistry>, assets: MetafileSource) -> Self {
    Self { manifest, pages, assets, shell: DEFAULT_SHELL.to_string(), loader_timeout: None }
  }

  pub fn shell(mut self, shell: impl Into<String>) -> Self {
    self.shell = shell.into();
    self
  }

  pub fn loader_timeout(mut self, timeout: Option<Duration>) -> Self {
    self.loader_timeout = timeout;
    self
  }

  pub fn manifest(&self) -> &RouteManifest {
    &self.manifest
  }

  pub fn pages(&self) -> &PageRegistry {
    &self.pages
  }

  /// Match the request path and resolve its page module.
  pub async fn resolve(&self, path: &str) -> Result<(Route, Arc<PageModule>), PremixError> {
    let route = self.manifest.find(path).ok_or_else(|| PremixError::not_found("Page not found"))?.clone();
    let module = self.pages.get(&route.page_id).await?;
    Ok((route, module))
  }

  pub async fn render(&self, mut req: PageRequest) -> Result<RenderedPage, PremixError> {
    let (route, module) = self.resolve(&req.path).await?;
    req.params = extract_params(&route.path, &req.path).unwrap_or_default();

    let loader = module.loader.kind();
    let data = match &module.loader {
      Loader::None => LoaderData::default(),
      Loader::Static(load) => {
        let ctx = StaticContext { params: req.params.clone(), query: req.query.clone() };
        self.run_loader(&req.path, load(ctx)).await?
      }
      Loader::Server(load) => {
        let path = req.path.clone();
        self.run_loader(&path, load(req)).await?
      }
    };

    let meta = module.meta_for(&data.props);
    let headers = module.headers_for(&data.props);
    let no_js = module.config.no_js;
    let index = self.assets.index().await?;
    let links = assemble_links(&index.assets_for(&route.page_path), module.links_for(&data.props), no_js);

    let state = PageState { meta, links, data, script: index.root_script().to_string(), headers, no_js };
    Ok(RenderedPage { route, module, state, loader })
  }

  /// Full HTML document for a rendered page.
  pub fn document(&self, page: &RenderedPage) -> String {
    render_document(&self.shell, &page.state, &page.render(), &self.manifest.version)
  }

  /// Run the page's action. Routes without one answer 404.
  pub async fn action(&self, mut req: PageRequest) -> Result<HttpResponse, PremixError> {
    let (route, module) = self.resolve(&req.path).await?;
    let action = module.action.clone().ok_or_else(|| PremixError::not_found("Loader doesn't exist"))?;
    req.params = extract_params(&route.path, &req.path).unwrap_or_default();
    action(req).await
  }

  async fn run_loader<F>(&self, path: &str, fut: F) -> Result<LoaderData, PremixError>
  where
    F: Future<Output = Result<LoaderData, PremixError>>,
  {
    let result = match self.loader_timeout {
      Some(limit) => tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| PremixError::loader_timeout(format!("loader for {path} exceeded {}ms", limit.as_millis())))?,
      None => fut.await,
    };
    result.map_err(|err| {
      if err.status() < 500 {
        return err;
      }
      tracing::error!(path, error = %err, "loader failed");
      let mut wrapped = PremixError::loader_failure(format!("loader for {path} failed")).context(err.to_string());
      for cause in err.chain() {
        wrapped = wrapped.context(cause.clone());
      }
      wrapped
    })
  }
}

#[cfg(test)]
mod tests;
