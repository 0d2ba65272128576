/* src/server/adapter/axum/src/handler/page.rs */

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::Method;
use axum::response::{Html, IntoResponse, Response};

use super::{action, apply_headers, page_request, read_static, static_paths, AppState};
use crate::error::{AxumError, Surface};

/// Everything that is not an API, data or asset request. GET/HEAD render the
/// page; any other method runs the page's action.
pub(super) async fn handle_page_or_action(State(state): State<Arc<AppState>>, req: Request) -> Response {
  if req.method() != Method::GET && req.method() != Method::HEAD {
    return action::handle_action(state, req).await;
  }
  match handle_page(&state, req).await {
    Ok(response) => response,
    Err(err) => err.into_response(),
  }
}

async fn handle_page(state: &Arc<AppState>, req: Request) -> Result<Response, AxumError> {
  let surface = Surface::Document { dev: state.is_dev() };
  let page_req = page_request(req, surface).await?;
  let path = page_req.path.clone();

  if let Some(revalidator) = &state.revalidator {
    if let Some((html_path, _)) = static_paths(state, &path)
      && let Some(bytes) = read_static(&html_path).await
    {
      revalidator.spawn_static(path);
      let mut response = Html(bytes).into_response();
      apply_headers(&mut response, [], state.manifest_version());
      return Ok(response);
    }
  }

  let page = state.renderer.render(page_req).await.map_err(|e| AxumError::new(e, surface))?;
  let html = state.renderer.document(&page);
  let mut response = Html(html).into_response();
  apply_headers(&mut response, &page.state.headers, state.manifest_version());

  if let (Some(revalidator), Some(seconds)) = (&state.revalidator, page.revalidate())
    && page.is_static()
  {
    revalidator.spawn(path, Duration::from_secs(seconds));
  }
  Ok(response)
}
