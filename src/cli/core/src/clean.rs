/* src/cli/core/src/clean.rs */

// `premix clean` command: removes build output and the public directory
// (bundled assets plus exported and regenerated pages).

use std::path::Path;

use anyhow::{Context, Result};

use crate::config::PremixConfig;
use crate::ui;

pub fn run_clean(config: &PremixConfig, base_dir: &Path) -> Result<()> {
  ui::arrow("cleaning project");
  for dir in [&config.build.out_dir, &config.build.public_dir] {
    let path = base_dir.join(dir);
    if delete_dir_if_exists(&path)? {
      ui::detail_ok(&format!("removed {dir}"));
    }
  }
  ui::ok("clean complete");
  Ok(())
}

fn delete_dir_if_exists(path: &Path) -> Result<bool> {
  if !path.exists() {
    return Ok(false);
  }
  std::fs::remove_dir_all(path).with_context(|| format!("failed to remove {}", path.display()))?;
  Ok(true)
}
