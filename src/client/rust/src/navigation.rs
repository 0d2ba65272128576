/* src/client/rust/src/navigation.rs */

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use premix_engine::{data_url, extract_page_state, extract_params, PageState, Params, Route, RouteManifest};
use serde_json::Value;

use crate::error::ClientError;
use crate::loadable::LoadableCache;
use crate::{DataFetcher, FetchResponse, ModuleImporter};

/// Everything the host needs to render the current page.
#[derive(Debug, Clone)]
pub struct NavigationState<M> {
  /// Path plus query string as navigated to.
  pub location: String,
  pub route: Route,
  pub params: Params,
  pub module: M,
  pub page: PageState,
}

#[derive(Debug, Clone, Default)]
pub struct NavigateOptions {
  /// Reuse the current page state instead of fetching, when staying on the
  /// same page.
  pub shallow: bool,
  /// History state; object keys override loader props of the same name.
  pub state: Option<Value>,
}

impl NavigateOptions {
  pub fn shallow() -> Self {
    Self { shallow: true, state: None }
  }

  pub fn with_state(mut self, state: Value) -> Self {
    self.state = Some(state);
    self
  }
}

pub struct ClientApp<F, I: ModuleImporter> {
  manifest: RouteManifest,
  fetcher: F,
  importer: I,
  modules: LoadableCache<I::Module>,
  current: RefCell<Option<Rc<NavigationState<I::Module>>>>,
  generation: Cell<u64>,
}

impl<F, I> ClientApp<F, I>
where
  F: DataFetcher,
  I: ModuleImporter,
{
  pub fn new(manifest: RouteManifest, fetcher: F, importer: I) -> Self {
    Self {
      manifest,
      fetcher,
      importer,
      modules: LoadableCache::new(),
      current: RefCell::new(None),
      generation: Cell::new(0),
    }
  }

  /// Hydration entry: adopt the state the server embedded in `html` for
  /// `location`. No data request is made.
  pub async fn bootstrap(&self, html: &str, location: &str) -> Result<Rc<NavigationState<I::Module>>, ClientError> {
    let (page, version) = extract_page_state(html).ok_or(ClientError::MissingState)?;
    if let Some(found) = version {
      self.check_version(&found)?;
    }
    let token = self.next_generation();
    let (path, _) = split_location(location);
    let (route, params) = self.resolve(path)?;
    let module = self.modules.load(&self.importer, &route).await?;
    self.commit(token, NavigationState { location: location.to_string(), route, params, module, page })
  }

  /// Client navigation to `location`. A navigation started later wins: an
  /// earlier one still in flight resolves to [`ClientError::Superseded`]
  /// and leaves the current state alone.
  pub async fn navigate(
    &self,
    location: &str,
    options: NavigateOptions,
  ) -> Result<Rc<NavigationState<I::Module>>, ClientError> {
    let token = self.next_generation();
    let (path, query) = split_location(location);
    let (route, params) = self.resolve(path)?;

    let reusable = match self.current() {
      Some(current) if options.shallow && current.route.page_id == route.page_id => Some(current.page.clone()),
      _ => None,
    };
    let mut page = match reusable {
      Some(page) => page,
      None => self.fetch_state(path, query).await?,
    };
    if let Some(Value::Object(state)) = options.state {
      merge_props(&mut page, state);
    }

    let module = self.modules.load(&self.importer, &route).await?;
    self.commit(token, NavigationState { location: location.to_string(), route, params, module, page })
  }

  pub fn current(&self) -> Option<Rc<NavigationState<I::Module>>> {
    self.current.borrow().clone()
  }

  pub fn manifest(&self) -> &RouteManifest {
    &self.manifest
  }

  pub fn modules(&self) -> &LoadableCache<I::Module> {
    &self.modules
  }

  fn next_generation(&self) -> u64 {
    let token = self.generation.get() + 1;
    self.generation.set(token);
    token
  }

  fn resolve(&self, path: &str) -> Result<(Route, Params), ClientError> {
    let route = self.manifest.find(path).ok_or_else(|| ClientError::NotFound { path: path.to_string() })?;
    let params = extract_params(&route.path, path).unwrap_or_default();
    Ok((route.clone(), params))
  }

  fn check_version(&self, found: &str) -> Result<(), ClientError> {
    if found == self.manifest.version {
      Ok(())
    } else {
      Err(ClientError::ManifestSkew { expected: self.manifest.version.clone(), found: found.to_string() })
    }
  }

  async fn fetch_state(&self, path: &str, query: Option<&str>) -> Result<PageState, ClientError> {
    let mut url = data_url(path);
    if let Some(query) = query {
      url.push('?');
      url.push_str(query);
    }
    let FetchResponse { status, manifest_version, body } = self.fetcher.fetch(&url).await?;
    if let Some(found) = manifest_version {
      self.check_version(&found)?;
    }
    match status {
      200..=299 => serde_json::from_str(&body).map_err(|e| ClientError::InvalidState(e.to_string())),
      404 => Err(ClientError::NotFound { path: path.to_string() }),
      status => Err(ClientError::Fetch { url, status }),
    }
  }

  fn commit(
    &self,
    token: u64,
    state: NavigationState<I::Module>,
  ) -> Result<Rc<NavigationState<I::Module>>, ClientError> {
    if self.generation.get() != token {
      return Err(ClientError::Superseded);
    }
    let state = Rc::new(state);
    *self.current.borrow_mut() = Some(Rc::clone(&state));
    Ok(state)
  }
}

fn split_location(location: &str) -> (&str, Option<&str>) {
  let location = location.split('#').next().unwrap_or(location);
  match location.split_once('?') {
    Some((path, query)) => (path, Some(query).filter(|q| !q.is_empty())),
    None => (location, None),
  }
}

fn merge_props(page: &mut PageState, state: serde_json::Map<String, Value>) {
  match &mut page.data.props {
    Value::Object(props) => props.extend(state),
    props => *props = Value::Object(state),
  }
}
