/* src/server/adapter/axum/src/error.rs */

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use premix_server::premix_engine::escape_html;
use premix_server::PremixError;

/// How an error is presented to the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Surface {
  /// HTML page route. Development shows a diagnostic document.
  Document { dev: bool },
  /// JSON data endpoint.
  Json,
  /// Action endpoint: status only, empty body.
  Empty,
  /// API route: plain text.
  Text,
}

/// Newtype wrapper to implement `IntoResponse` for `PremixError`.
/// Required because Rust's orphan rule prevents `impl IntoResponse for PremixError`
/// when both types are foreign to this crate.
pub(crate) struct AxumError {
  pub err: PremixError,
  pub surface: Surface,
}

impl AxumError {
  pub fn new(err: PremixError, surface: Surface) -> Self {
    Self { err, surface }
  }
}

impl IntoResponse for AxumError {
  fn into_response(self) -> Response {
    let err = self.err;
    let status = StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if err.is_not_found() {
      return match self.surface {
        Surface::Json => (status, axum::Json(serde_json::json!({ "error": err.message() }))).into_response(),
        _ => (status, err.message().to_string()).into_response(),
      };
    }
    if status.is_client_error() {
      return (status, err.message().to_string()).into_response();
    }

    tracing::error!(code = err.code(), message = err.message(), chain = ?err.chain(), "request failed");
    match self.surface {
      Surface::Document { dev: true } => (status, Html(diagnostic_document(&err))).into_response(),
      Surface::Document { dev: false } => {
        (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong!").into_response()
      }
      Surface::Json => (
        StatusCode::INTERNAL_SERVER_ERROR,
        axum::Json(serde_json::json!({ "message": "Something went wrong" })),
      )
        .into_response(),
      Surface::Empty => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
      Surface::Text => (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong").into_response(),
    }
  }
}

/// Development error page listing the error and its causes.
fn diagnostic_document(err: &PremixError) -> String {
  let mut causes = String::new();
  for cause in err.chain() {
    causes.push_str("<li><pre>");
    causes.push_str(&escape_html(cause));
    causes.push_str("</pre></li>");
  }
  format!(
    concat!(
      "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{code}</title>",
      "<style>body{{font-family:monospace;padding:2rem;background:#1e1e1e;color:#eee}}",
      "h1{{color:#ff5555}}pre{{white-space:pre-wrap}}</style></head>",
      "<body><h1>{code}</h1><p>{message}</p><ol>{causes}</ol></body></html>"
    ),
    code = escape_html(err.code()),
    message = escape_html(err.message()),
    causes = causes,
  )
}
