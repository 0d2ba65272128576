/* src/server/adapter/axum/src/handler/action.rs */

use std::sync::Arc;

use axum::extract::Request;
use axum::response::{IntoResponse, Response};

use super::{into_axum_response, page_request, AppState};
use crate::error::{AxumError, Surface};

/// Non-GET request to a page URL. Unknown pages and pages without an action
/// answer 404; a failing action still ends the response, with a 500 and no body.
pub(super) async fn handle_action(state: Arc<AppState>, req: Request) -> Response {
  let page_req = match page_request(req, Surface::Empty).await {
    Ok(r) => r,
    Err(err) => return err.into_response(),
  };
  match state.renderer.action(page_req).await {
    Ok(res) => into_axum_response(res),
    Err(err) => AxumError::new(err, Surface::Empty).into_response(),
  }
}
