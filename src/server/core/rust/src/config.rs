/* src/server/core/rust/src/config.rs */

use std::path::PathBuf;
use std::time::Duration;

/// Environment variable selecting the runtime mode.
pub const MODE_ENV: &str = "PREMIX_ENV";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
  Development,
  #[default]
  Production,
}

impl Mode {
  /// Read `PREMIX_ENV`. Anything other than `development`/`dev` is production.
  pub fn from_env() -> Self {
    std::env::var(MODE_ENV).map(|v| Self::parse(&v)).unwrap_or_default()
  }

  pub fn parse(value: &str) -> Self {
    match value.trim().to_ascii_lowercase().as_str() {
      "development" | "dev" => Self::Development,
      _ => Self::Production,
    }
  }

  pub fn is_dev(self) -> bool {
    self == Self::Development
  }
}

/// Runtime options for the server tier. Paths are relative to the process
/// working directory unless absolute.
#[derive(Debug, Clone)]
pub struct ServerOptions {
  pub mode: Mode,
  /// Holds `route-manifest.json` and the bundler metafile.
  pub build_dir: PathBuf,
  /// Static output root: bundled assets plus exported/regenerated pages.
  pub public_dir: PathBuf,
  /// Source path of the client entry as recorded in the metafile.
  pub client_entry: String,
  /// Metafile name inside `build_dir`.
  pub metafile: String,
  /// URL prefix under which bundled assets are served.
  pub public_path: String,
  pub pages_root: String,
  pub loader_timeout: Option<Duration>,
  /// Upper bound on URLs tracked for revalidation.
  pub revalidate_cap: Option<usize>,
}

impl Default for ServerOptions {
  fn default() -> Self {
    Self {
      mode: Mode::default(),
      build_dir: PathBuf::from(".premix/build"),
      public_dir: PathBuf::from(".premix/public"),
      client_entry: "app/entry-client.tsx".to_string(),
      metafile: "meta.json".to_string(),
      public_path: "/build".to_string(),
      pages_root: "app/pages".to_string(),
      loader_timeout: None,
      revalidate_cap: Some(10_000),
    }
  }
}

impl ServerOptions {
  pub fn from_env() -> Self {
    Self { mode: Mode::from_env(), ..Self::default() }
  }

  pub fn metafile_path(&self) -> PathBuf {
    self.build_dir.join(&self.metafile)
  }

  pub fn mode(mut self, mode: Mode) -> Self {
    self.mode = mode;
    self
  }

  pub fn loader_timeout(mut self, timeout: Duration) -> Self {
    self.loader_timeout = Some(timeout);
    self
  }
}
