/* src/cli/core/src/shell.rs */

use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};

use crate::ui::{self, DIM, RESET};

/// Run `command` through `sh -c` in `base_dir` with extra environment.
/// Output is echoed under the current step on success and attached to the
/// error on failure.
pub(crate) fn run_command(base_dir: &Path, command: &str, label: &str, env: &[(&str, String)]) -> Result<()> {
  ui::detail(&format!("{DIM}$ {command}{RESET}"));
  let output = Command::new("sh")
    .args(["-c", command])
    .current_dir(base_dir)
    .envs(env.iter().map(|(k, v)| (*k, v.as_str())))
    .output()
    .with_context(|| format!("failed to run {label}"))?;

  let stdout = String::from_utf8_lossy(&output.stdout);
  let stderr = String::from_utf8_lossy(&output.stderr);
  if output.status.success() {
    ui::passthrough(&stdout);
    ui::passthrough(&stderr);
    return Ok(());
  }

  let mut msg = format!("{label} exited with status {}", output.status);
  for stream in [stderr.trim_end(), stdout.trim_end()] {
    if !stream.is_empty() {
      msg.push('\n');
      msg.push_str(stream);
    }
  }
  bail!("{msg}")
}
