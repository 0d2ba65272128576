/* src/server/adapter/axum/src/handler/api.rs */

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};

use super::{into_axum_response, page_request, AppState};
use crate::error::{AxumError, Surface};

pub(super) async fn handle_api(State(state): State<Arc<AppState>>, req: Request) -> Response {
  let page_req = match page_request(req, Surface::Text).await {
    Ok(r) => r,
    Err(err) => return err.into_response(),
  };
  match state.api.call(page_req).await {
    Ok(res) => into_axum_response(res),
    Err(err) => AxumError::new(err, Surface::Text).into_response(),
  }
}
