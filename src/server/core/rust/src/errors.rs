/* src/server/core/rust/src/errors.rs */

use std::fmt;

#[derive(Debug, Clone)]
pub struct PremixError {
  code: String,
  message: String,
  status: u16,
  /// Underlying causes, outermost first.
  chain: Vec<String>,
}

fn default_status(code: &str) -> u16 {
  match code {
    "BAD_REQUEST" => 400,
    "NOT_FOUND" => 404,
    "METHOD_NOT_ALLOWED" => 405,
    "LOADER_FAILURE" => 500,
    "LOADER_TIMEOUT" => 504,
    "CONFIGURATION_ERROR" => 500,
    "INTERNAL_ERROR" => 500,
    _ => 500,
  }
}

impl PremixError {
  pub fn new(code: impl Into<String>, message: impl Into<String>, status: u16) -> Self {
    Self { code: code.into(), message: message.into(), status, chain: Vec::new() }
  }

  pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
    let code = code.into();
    let status = default_status(&code);
    Self { code, message: message.into(), status, chain: Vec::new() }
  }

  pub fn bad_request(msg: impl Into<String>) -> Self {
    Self::with_code("BAD_REQUEST", msg)
  }

  pub fn not_found(msg: impl Into<String>) -> Self {
    Self::with_code("NOT_FOUND", msg)
  }

  pub fn configuration(msg: impl Into<String>) -> Self {
    Self::with_code("CONFIGURATION_ERROR", msg)
  }

  pub fn loader_failure(msg: impl Into<String>) -> Self {
    Self::with_code("LOADER_FAILURE", msg)
  }

  pub fn loader_timeout(msg: impl Into<String>) -> Self {
    Self::with_code("LOADER_TIMEOUT", msg)
  }

  pub fn internal(msg: impl Into<String>) -> Self {
    Self::with_code("INTERNAL_ERROR", msg)
  }

  /// Record an underlying cause, including its own `source()` chain.
  pub fn caused_by(mut self, err: &(dyn std::error::Error + 'static)) -> Self {
    let mut current = Some(err);
    while let Some(e) = current {
      self.chain.push(e.to_string());
      current = e.source();
    }
    self
  }

  /// Record a cause given as text.
  pub fn context(mut self, detail: impl Into<String>) -> Self {
    self.chain.push(detail.into());
    self
  }

  pub fn code(&self) -> &str {
    &self.code
  }

  pub fn message(&self) -> &str {
    &self.message
  }

  pub fn status(&self) -> u16 {
    self.status
  }

  pub fn chain(&self) -> &[String] {
    &self.chain
  }

  pub fn is_not_found(&self) -> bool {
    self.code == "NOT_FOUND"
  }
}

impl fmt::Display for PremixError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.code, self.message)
  }
}

impl std::error::Error for PremixError {}

impl From<std::io::Error> for PremixError {
  fn from(err: std::io::Error) -> Self {
    Self::internal("I/O failure").caused_by(&err)
  }
}

impl From<serde_json::Error> for PremixError {
  fn from(err: serde_json::Error) -> Self {
    Self::internal("JSON failure").caused_by(&err)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_status_known_codes() {
    assert_eq!(default_status("BAD_REQUEST"), 400);
    assert_eq!(default_status("NOT_FOUND"), 404);
    assert_eq!(default_status("METHOD_NOT_ALLOWED"), 405);
    assert_eq!(default_status("LOADER_FAILURE"), 500);
    assert_eq!(default_status("LOADER_TIMEOUT"), 504);
    assert_eq!(default_status("CONFIGURATION_ERROR"), 500);
    assert_eq!(default_status("INTERNAL_ERROR"), 500);
  }

  #[test]
  fn default_status_unknown_code() {
    assert_eq!(default_status("CUSTOM_ERROR"), 500);
  }

  #[test]
  fn new_explicit_status() {
    let err = PremixError::new("TEAPOT", "short and stout", 418);
    assert_eq!(err.code(), "TEAPOT");
    assert_eq!(err.message(), "short and stout");
    assert_eq!(err.status(), 418);
  }

  #[test]
  fn convenience_constructors() {
    assert_eq!(PremixError::not_found("x").status(), 404);
    assert!(PremixError::not_found("x").is_not_found());
    assert_eq!(PremixError::loader_failure("x").status(), 500);
    assert_eq!(PremixError::loader_timeout("x").status(), 504);
    assert_eq!(PremixError::configuration("x").code(), "CONFIGURATION_ERROR");
  }

  #[test]
  fn chain_follows_sources() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "meta.json missing");
    let err = PremixError::loader_failure("loader crashed").context("while loading /posts").caused_by(&io);
    assert_eq!(err.chain(), ["while loading /posts", "meta.json missing"]);
  }

  #[test]
  fn display_format() {
    let err = PremixError::not_found("missing");
    assert_eq!(err.to_string(), "NOT_FOUND: missing");
  }
}
