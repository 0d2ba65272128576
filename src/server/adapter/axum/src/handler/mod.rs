/* src/server/adapter/axum/src/handler/mod.rs */

mod action;
mod api;
mod data;
mod page;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::Response;
use axum::routing::{any, get, get_service};
use axum::Router;
use premix_server::{ApiRoutes, HttpResponse, PageRequest, PremixError, PremixParts, Renderer, Revalidator, ServerOptions};
use tower_http::services::ServeDir;

use crate::error::{AxumError, Surface};

/// Response header carrying the route manifest version.
pub(crate) const MANIFEST_HEADER: &str = "x-premix-manifest";

/// Request bodies above this size are rejected.
const BODY_LIMIT: usize = 2 * 1024 * 1024;

pub(crate) struct AppState {
  pub renderer: Arc<Renderer>,
  pub api: Arc<ApiRoutes>,
  pub revalidator: Option<Arc<Revalidator>>,
  pub options: ServerOptions,
}

impl AppState {
  fn is_dev(&self) -> bool {
    self.options.mode.is_dev()
  }

  fn manifest_version(&self) -> &str {
    &self.renderer.manifest().version
  }
}

pub(crate) fn build_router(parts: PremixParts) -> Router {
  let assets_dir = parts.options.public_dir.join(parts.options.public_path.trim_matches('/'));
  let public_path = normalize_prefix(&parts.options.public_path);
  let state = Arc::new(AppState {
    renderer: parts.renderer,
    api: parts.api,
    revalidator: parts.revalidator,
    options: parts.options,
  });

  let mut router = Router::new()
    .route("/_premix/data/{*path}", get(data::handle_data))
    .route("/api", any(api::handle_api))
    .route("/api/{*path}", any(api::handle_api));
  if let Some(prefix) = public_path {
    router = router.nest_service(&prefix, get_service(ServeDir::new(assets_dir)));
  }
  router.fallback(page::handle_page_or_action).with_state(state)
}

fn normalize_prefix(prefix: &str) -> Option<String> {
  let trimmed = prefix.trim_matches('/');
  (!trimmed.is_empty()).then(|| format!("/{trimmed}"))
}

/// Convert an axum request into the framework-neutral form.
pub(crate) async fn page_request(req: Request, surface: Surface) -> Result<PageRequest, AxumError> {
  let (parts, body) = req.into_parts();
  let url = parts.uri.path_and_query().map_or_else(|| parts.uri.path().to_string(), |pq| pq.as_str().to_string());
  let mut page_req = PageRequest::new(parts.method.as_str(), url);
  for (name, value) in &parts.headers {
    if let Ok(value) = value.to_str() {
      page_req.headers.insert(name.as_str().to_string(), value.to_string());
    }
  }
  page_req.body = axum::body::to_bytes(body, BODY_LIMIT)
    .await
    .map_err(|e| AxumError::new(PremixError::bad_request(format!("unreadable request body: {e}")), surface))?;
  Ok(page_req)
}

/// Convert a handler's response into an axum response. Invalid header names
/// or values are dropped.
pub(crate) fn into_axum_response(res: HttpResponse) -> Response {
  let status = StatusCode::from_u16(res.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
  let mut response = Response::new(Body::from(res.body));
  *response.status_mut() = status;
  for (name, value) in res.headers {
    if let (Ok(name), Ok(value)) = (HeaderName::try_from(name), HeaderValue::try_from(value)) {
      response.headers_mut().append(name, value);
    }
  }
  response
}

/// Apply page-declared headers plus the framework headers.
pub(crate) fn apply_headers<'a>(
  response: &mut Response,
  headers: impl IntoIterator<Item = (&'a String, &'a String)>,
  manifest_version: &str,
) {
  let map = response.headers_mut();
  for (name, value) in headers {
    if let (Ok(name), Ok(value)) = (HeaderName::try_from(name.as_str()), HeaderValue::try_from(value.as_str())) {
      map.insert(name, value);
    }
  }
  if let Ok(value) = HeaderValue::try_from(manifest_version) {
    map.insert(HeaderName::from_static(MANIFEST_HEADER), value);
  }
  map.insert(HeaderName::from_static("x-powered-by"), HeaderValue::from_static("Premix"));
}

/// Contents of a static output file, if present.
pub(crate) async fn read_static(path: &Path) -> Option<Vec<u8>> {
  tokio::fs::read(path).await.ok()
}

pub(crate) fn is_safe_path(path: &str) -> bool {
  !path.split('/').any(|segment| segment == ".." || segment.contains('\\'))
}

/// HTML and JSON locations for `page_path`, or `None` for paths that try to
/// leave the static output directory.
pub(crate) fn static_paths(state: &AppState, page_path: &str) -> Option<(PathBuf, PathBuf)> {
  is_safe_path(page_path).then(|| premix_server::export::static_paths(&state.options.public_dir, page_path))
}
