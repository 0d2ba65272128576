/* src/server/core/rust/src/page.rs */

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use premix_engine::{LinkDescriptor, LoaderData, Params};
use serde_json::Value;

use crate::errors::PremixError;
use crate::http::{HttpResponse, PageRequest, Query};

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Render function: page state in, body markup out.
pub type RenderFn = Arc<dyn Fn(&premix_engine::PageState) -> String + Send + Sync>;
pub type MetaFn = Arc<dyn Fn(&Value) -> BTreeMap<String, String> + Send + Sync>;
pub type LinksFn = Arc<dyn Fn(&Value) -> Vec<LinkDescriptor> + Send + Sync>;
pub type HeadersFn = Arc<dyn Fn(&Value) -> BTreeMap<String, String> + Send + Sync>;
pub type StaticLoaderFn = Arc<dyn Fn(StaticContext) -> BoxFuture<Result<LoaderData, PremixError>> + Send + Sync>;
pub type ServerLoaderFn = Arc<dyn Fn(PageRequest) -> BoxFuture<Result<LoaderData, PremixError>> + Send + Sync>;
pub type ActionFn = Arc<dyn Fn(PageRequest) -> BoxFuture<Result<HttpResponse, PremixError>> + Send + Sync>;
pub type LoadPathsFn = Arc<dyn Fn() -> BoxFuture<Result<Vec<Params>, PremixError>> + Send + Sync>;

/// Input to a static loader. Results may be cached and regenerated, so no
/// request-specific data beyond the URL is available.
#[derive(Debug, Clone, Default)]
pub struct StaticContext {
  pub params: Params,
  pub query: Query,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageConfig {
  /// Ship no client script and skip hydration.
  pub no_js: bool,
}

/// Which data function a page uses. At most one per page.
#[derive(Clone, Default)]
pub enum Loader {
  #[default]
  None,
  Static(StaticLoaderFn),
  Server(ServerLoaderFn),
}

impl Loader {
  pub fn kind(&self) -> LoaderKind {
    match self {
      Self::None => LoaderKind::None,
      Self::Static(_) => LoaderKind::Static,
      Self::Server(_) => LoaderKind::Server,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderKind {
  None,
  Static,
  Server,
}

/// Everything a page file exports on the server side.
#[derive(Clone)]
pub struct PageModule {
  pub render: RenderFn,
  pub meta: Option<MetaFn>,
  pub links: Option<LinksFn>,
  pub headers: Option<HeadersFn>,
  pub loader: Loader,
  pub action: Option<ActionFn>,
  pub load_paths: Option<LoadPathsFn>,
  pub config: PageConfig,
}

impl PageModule {
  pub fn new<F>(render: F) -> Self
  where
    F: Fn(&premix_engine::PageState) -> String + Send + Sync + 'static,
  {
    Self {
      render: Arc::new(render),
      meta: None,
      links: None,
      headers: None,
      loader: Loader::None,
      action: None,
      load_paths: None,
      config: PageConfig::default(),
    }
  }

  pub fn meta<F>(mut self, f: F) -> Self
  where
    F: Fn(&Value) -> BTreeMap<String, String> + Send + Sync + 'static,
  {
    self.meta = Some(Arc::new(f));
    self
  }

  pub fn links<F>(mut self, f: F) -> Self
  where
    F: Fn(&Value) -> Vec<LinkDescriptor> + Send + Sync + 'static,
  {
    self.links = Some(Arc::new(f));
    self
  }

  pub fn headers<F>(mut self, f: F) -> Self
  where
    F: Fn(&Value) -> BTreeMap<String, String> + Send + Sync + 'static,
  {
    self.headers = Some(Arc::new(f));
    self
  }

  /// Replaces any previously set loader.
  pub fn static_loader<F, Fut>(mut self, f: F) -> Self
  where
    F: Fn(StaticContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<LoaderData, PremixError>> + Send + 'static,
  {
    self.loader = Loader::Static(Arc::new(move |ctx| Box::pin(f(ctx))));
    self
  }

  /// Replaces any previously set loader.
  pub fn server_loader<F, Fut>(mut self, f: F) -> Self
  where
    F: Fn(PageRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<LoaderData, PremixError>> + Send + 'static,
  {
    self.loader = Loader::Server(Arc::new(move |req| Box::pin(f(req))));
    self
  }

  pub fn action<F, Fut>(mut self, f: F) -> Self
  where
    F: Fn(PageRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<HttpResponse, PremixError>> + Send + 'static,
  {
    self.action = Some(Arc::new(move |req| Box::pin(f(req))));
    self
  }

  pub fn load_paths<F, Fut>(mut self, f: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<Params>, PremixError>> + Send + 'static,
  {
    self.load_paths = Some(Arc::new(move || Box::pin(f())));
    self
  }

  pub fn no_js(mut self) -> Self {
    self.config.no_js = true;
    self
  }

  pub fn meta_for(&self, props: &Value) -> BTreeMap<String, String> {
    self.meta.as_ref().map(|f| f(props)).unwrap_or_default()
  }

  pub fn links_for(&self, props: &Value) -> Vec<LinkDescriptor> {
    self.links.as_ref().map(|f| f(props)).unwrap_or_default()
  }

  pub fn headers_for(&self, props: &Value) -> BTreeMap<String, String> {
    self.headers.as_ref().map(|f| f(props)).unwrap_or_default()
  }
}

/// API route handler.
pub type ApiHandlerFn = Arc<dyn Fn(PageRequest) -> BoxFuture<Result<HttpResponse, PremixError>> + Send + Sync>;

pub fn api_handler<F, Fut>(f: F) -> ApiHandlerFn
where
  F: Fn(PageRequest) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Result<HttpResponse, PremixError>> + Send + 'static,
{
  Arc::new(move |req| Box::pin(f(req)))
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn neutral_defaults() {
    let page = PageModule::new(|_| "<p>hi</p>".to_string());
    assert!(page.meta_for(&json!({})).is_empty());
    assert!(page.links_for(&json!({})).is_empty());
    assert!(page.headers_for(&json!({})).is_empty());
    assert_eq!(page.loader.kind(), LoaderKind::None);
    assert!(page.action.is_none());
    assert!(!page.config.no_js);
  }

  #[test]
  fn second_loader_replaces_first() {
    let page = PageModule::new(|_| String::new())
      .static_loader(|_| async { Ok(LoaderData::default()) })
      .server_loader(|_| async { Ok(LoaderData::default()) });
    assert_eq!(page.loader.kind(), LoaderKind::Server);
  }

  #[test]
  fn meta_sees_props() {
    let page = PageModule::new(|_| String::new())
      .meta(|props| BTreeMap::from([("title".to_string(), props["title"].as_str().unwrap_or("").to_string())]));
    assert_eq!(page.meta_for(&json!({ "title": "Hello" }))["title"], "Hello");
  }

  #[tokio::test]
  async fn static_loader_runs() {
    let page = PageModule::new(|_| String::new()).static_loader(|ctx: StaticContext| async move {
      Ok(LoaderData::new(json!({ "post": ctx.params.get("post").cloned() })).revalidate(5))
    });
    let Loader::Static(load) = &page.loader else { panic!("expected static loader") };
    let ctx = StaticContext { params: Params::from([("post".to_string(), "hello".to_string())]), ..Default::default() };
    let data = load(ctx).await.unwrap();
    assert_eq!(data.props["post"], "hello");
    assert_eq!(data.revalidate, Some(5));
  }
}
