/* src/client/rust/src/error.rs */

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
  /// The document carries no embedded page state.
  MissingState,
  /// The embedded or fetched page state could not be decoded.
  InvalidState(String),
  /// No route matches the path, or the server answered 404.
  NotFound { path: String },
  /// The data endpoint answered with an unexpected status.
  Fetch { url: String, status: u16 },
  /// The request never produced a response.
  Transport(String),
  /// Loading the page module failed.
  Import { page_id: String, message: String },
  /// Client and server were built from different route tables. The host
  /// should fall back to a full document load.
  ManifestSkew { expected: String, found: String },
  /// A newer navigation started before this one finished.
  Superseded,
}

impl fmt::Display for ClientError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::MissingState => write!(f, "document has no embedded page state"),
      Self::InvalidState(msg) => write!(f, "invalid page state: {msg}"),
      Self::NotFound { path } => write!(f, "no page for {path}"),
      Self::Fetch { url, status } => write!(f, "fetching {url} failed with status {status}"),
      Self::Transport(msg) => write!(f, "request failed: {msg}"),
      Self::Import { page_id, message } => write!(f, "failed to load page '{page_id}': {message}"),
      Self::ManifestSkew { expected, found } => {
        write!(f, "route manifest mismatch: client has {expected}, server has {found}")
      }
      Self::Superseded => write!(f, "navigation superseded by a newer one"),
    }
  }
}

impl std::error::Error for ClientError {}

impl ClientError {
  /// Errors after which the host should reload the whole document.
  pub fn needs_full_reload(&self) -> bool {
    matches!(self, Self::ManifestSkew { .. } | Self::Fetch { .. })
  }
}
