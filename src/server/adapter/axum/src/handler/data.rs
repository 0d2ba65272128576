/* src/server/adapter/axum/src/handler/data.rs */

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use premix_server::premix_engine::page_path_from_data_url;
use premix_server::PremixError;

use super::{apply_headers, page_request, read_static, static_paths, AppState};
use crate::error::{AxumError, Surface};

/// `GET /_premix/data/<path>.json`: the page state as JSON, without headers.
pub(super) async fn handle_data(State(state): State<Arc<AppState>>, req: Request) -> Response {
  match serve_data(&state, req).await {
    Ok(response) => response,
    Err(err) => err.into_response(),
  }
}

async fn serve_data(state: &Arc<AppState>, req: Request) -> Result<Response, AxumError> {
  let mut page_req = page_request(req, Surface::Json).await?;
  let page_path = page_path_from_data_url(&page_req.path)
    .ok_or_else(|| AxumError::new(PremixError::not_found("Page not found"), Surface::Json))?;

  if let Some(revalidator) = &state.revalidator
    && let Some((_, json_path)) = static_paths(state, &page_path)
    && let Some(bytes) = read_static(&json_path).await
  {
    revalidator.spawn_static(page_path);
    let mut response = bytes.into_response();
    response.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    apply_headers(&mut response, [], state.manifest_version());
    return Ok(response);
  }

  page_req.url = match page_req.url.split_once('?') {
    Some((_, query)) => format!("{page_path}?{query}"),
    None => page_path.clone(),
  };
  page_req.path = page_path.clone();

  let page = state.renderer.render(page_req).await.map_err(|e| AxumError::new(e, Surface::Json))?;
  let mut response = axum::Json(page.state.to_json()).into_response();
  apply_headers(&mut response, &page.state.headers, state.manifest_version());

  if let (Some(revalidator), Some(seconds)) = (&state.revalidator, page.revalidate())
    && page.is_static()
  {
    revalidator.spawn(page_path, Duration::from_secs(seconds));
  }
  Ok(response)
}
