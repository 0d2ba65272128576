/* src/client/rust/src/lib.rs */

//! Client side of the Premix page protocol: recover the server-rendered page
//! state from the document, then drive client navigations against the data
//! endpoint. Network access and module loading are supplied by the host
//! through [`DataFetcher`] and [`ModuleImporter`].

pub mod error;
pub mod loadable;
pub mod navigation;

use futures_util::future::LocalBoxFuture;
use premix_engine::Route;

pub use error::ClientError;
pub use loadable::LoadableCache;
pub use navigation::{ClientApp, NavigateOptions, NavigationState};

/// Response of the data endpoint as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
  pub status: u16,
  /// Value of the `x-premix-manifest` header, if the server sent one.
  pub manifest_version: Option<String>,
  pub body: String,
}

impl FetchResponse {
  pub fn ok(body: impl Into<String>) -> Self {
    Self { status: 200, manifest_version: None, body: body.into() }
  }

  pub fn with_status(mut self, status: u16) -> Self {
    self.status = status;
    self
  }

  pub fn with_manifest(mut self, version: impl Into<String>) -> Self {
    self.manifest_version = Some(version.into());
    self
  }
}

/// GET requests against the data endpoint.
pub trait DataFetcher {
  fn fetch<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<FetchResponse, ClientError>>;
}

/// Loads the code of one page. Modules are cached by page id, so a module
/// type that is cheap to clone (an `Rc`, a handle) is expected.
pub trait ModuleImporter {
  type Module: Clone;

  fn import<'a>(&'a self, route: &'a Route) -> LocalBoxFuture<'a, Result<Self::Module, ClientError>>;
}
