/* src/cli/core/src/config/types.rs */

use std::path::PathBuf;

use anyhow::{bail, Result};
use premix_server::ServerOptions;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct PremixConfig {
  pub project: ProjectConfig,
  #[serde(default)]
  pub pages: PagesSection,
  #[serde(default)]
  pub build: BuildSection,
  #[serde(default)]
  pub server: ServerSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
  pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PagesSection {
  #[serde(default = "default_pages_root")]
  pub root: String,
  #[serde(default = "default_extensions")]
  pub extensions: Vec<String>,
}

impl Default for PagesSection {
  fn default() -> Self {
    Self { root: default_pages_root(), extensions: default_extensions() }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
  #[serde(default = "default_out_dir")]
  pub out_dir: String,
  #[serde(default = "default_public_dir")]
  pub public_dir: String,
  #[serde(default = "default_client_entry")]
  pub client_entry: String,
  pub bundler_command: Option<String>,
  #[serde(default = "default_metafile")]
  pub metafile: String,
  #[serde(default = "default_public_path")]
  pub public_path: String,
}

impl Default for BuildSection {
  fn default() -> Self {
    Self {
      out_dir: default_out_dir(),
      public_dir: default_public_dir(),
      client_entry: default_client_entry(),
      bundler_command: None,
      metafile: default_metafile(),
      public_path: default_public_path(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
  #[serde(default = "default_port")]
  pub port: u16,
  pub revalidate_cap: Option<usize>,
  pub loader_timeout_ms: Option<u64>,
}

impl Default for ServerSection {
  fn default() -> Self {
    Self { port: default_port(), revalidate_cap: None, loader_timeout_ms: None }
  }
}

fn default_pages_root() -> String {
  "app/pages".to_string()
}

fn default_extensions() -> Vec<String> {
  premix_server::discover::DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect()
}

fn default_out_dir() -> String {
  ".premix/build".to_string()
}

fn default_public_dir() -> String {
  ".premix/public".to_string()
}

fn default_client_entry() -> String {
  "app/entry-client.tsx".to_string()
}

fn default_metafile() -> String {
  "meta.json".to_string()
}

fn default_public_path() -> String {
  "/build".to_string()
}

fn default_port() -> u16 {
  3000
}

impl PremixConfig {
  pub fn validate(&self) -> Result<()> {
    if self.project.name.trim().is_empty() {
      bail!("project.name must not be empty");
    }
    if self.pages.extensions.is_empty() {
      bail!("pages.extensions must not be empty");
    }
    if let Some(ext) = self.pages.extensions.iter().find(|e| e.starts_with('.') || e.is_empty()) {
      bail!("pages.extensions entries are bare extensions like \"tsx\", got \"{ext}\"");
    }
    if !self.build.public_path.starts_with('/') {
      bail!("build.public_path must start with '/', got \"{}\"", self.build.public_path);
    }
    if self.build.out_dir == self.build.public_dir {
      bail!("build.out_dir and build.public_dir must differ (both \"{}\")", self.build.out_dir);
    }
    if self.build.client_entry.is_empty() {
      bail!("build.client_entry must not be empty");
    }
    if self.server.port == 0 {
      bail!("server.port must not be 0");
    }
    if self.server.revalidate_cap == Some(0) {
      bail!("server.revalidate_cap must be at least 1 (omit it for the default)");
    }
    Ok(())
  }

  pub fn extensions(&self) -> Vec<&str> {
    self.pages.extensions.iter().map(String::as_str).collect()
  }

  /// Runtime options equivalent to this config. Paths stay relative to the
  /// project root, which is where the server process runs.
  pub fn server_options(&self) -> ServerOptions {
    let defaults = ServerOptions::default();
    ServerOptions {
      build_dir: PathBuf::from(&self.build.out_dir),
      public_dir: PathBuf::from(&self.build.public_dir),
      client_entry: self.build.client_entry.clone(),
      metafile: self.build.metafile.clone(),
      public_path: self.build.public_path.clone(),
      pages_root: self.pages.root.clone(),
      loader_timeout: self.server.loader_timeout_ms.map(std::time::Duration::from_millis),
      revalidate_cap: self.server.revalidate_cap.or(defaults.revalidate_cap),
      ..defaults
    }
  }
}
