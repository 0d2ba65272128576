/* src/cli/transform/src/lib.rs */

//! Build-time transform for page modules. The client variant of a page drops
//! every server-only export together with the imports and top-level bindings
//! that only those exports used, so server code never reaches the browser
//! bundle. The server variant is the source unchanged.

pub mod error;
mod strip;

pub use error::{Position, TransformError};

/// Exports that only ever run on the server.
pub const SERVER_ONLY_EXPORTS: &[&str] =
  &["action", "serverLoader", "staticLoader", "meta", "links", "headers", "loadPaths"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
  #[default]
  Client,
  Server,
}

impl std::str::FromStr for Target {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "client" => Ok(Self::Client),
      "server" => Ok(Self::Server),
      other => Err(format!("unknown target '{other}', expected 'client' or 'server'")),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
  pub client: String,
  pub server: String,
  /// Server-only export names removed from the client variant, in source order.
  pub stripped: Vec<String>,
}

impl Transformed {
  pub fn variant(&self, target: Target) -> &str {
    match target {
      Target::Client => &self.client,
      Target::Server => &self.server,
    }
  }
}

/// Both variants of the page module at `file` (used in diagnostics only).
pub fn transform(file: &str, source: &str) -> Result<Transformed, TransformError> {
  let (client, stripped) = strip::strip_server_exports(file, source)?;
  Ok(Transformed { client, server: source.to_string(), stripped })
}

pub fn is_server_only(name: &str) -> bool {
  SERVER_ONLY_EXPORTS.contains(&name)
}

#[cfg(test)]
mod tests;
