/* src/cli/core/src/main.rs */

mod build;
mod clean;
mod config;
mod routes;
mod shell;
mod ui;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use premix_transform::Target;

use config::{find_premix_config, load_premix_config, PremixConfig};

#[derive(Parser)]
#[command(name = "premix", about = "Premix CLI", version)]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Discover routes, check page transforms, write the route manifest and bundle
  Build {
    /// Path to premix.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
  /// Print the route table in match order
  Routes {
    /// Path to premix.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
  /// Print the client or server variant of a page module
  Transform {
    /// Page module to transform
    file: PathBuf,
    /// Which variant to print: client or server
    #[arg(short, long, default_value = "client")]
    target: Target,
  },
  /// Remove build output and the public directory
  Clean {
    /// Path to premix.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
}

/// Warn if `.premix/` is not covered by any gitignore rule
fn warn_premix_not_gitignored(base_dir: &Path) {
  use std::process::Command;
  let output =
    Command::new("git").args(["check-ignore", "-q", ".premix"]).current_dir(base_dir).output();
  // exit 1 = not ignored; 0 = ignored; anything else = not a git repo or git missing
  if let Ok(o) = output
    && o.status.code() == Some(1)
  {
    ui::warn(".premix/ is not in .gitignore -- consider adding it to avoid tracking build artifacts");
  }
}

/// Resolve config path (explicit or auto-detected) and parse it
fn resolve_config(explicit: Option<PathBuf>) -> Result<(PathBuf, PremixConfig)> {
  let path = match explicit {
    Some(p) => p,
    None => {
      let cwd = std::env::current_dir().context("failed to get cwd")?;
      find_premix_config(&cwd)?
    }
  };
  let config = load_premix_config(&path)?;
  Ok((path, config))
}

fn base_dir(config_path: &Path) -> &Path {
  match config_path.parent() {
    Some(dir) if !dir.as_os_str().is_empty() => dir,
    _ => Path::new("."),
  }
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  match cli.command {
    Command::Build { config } => {
      let (config_path, premix_config) = resolve_config(config)?;
      let base_dir = base_dir(&config_path);
      warn_premix_not_gitignored(base_dir);
      let summary = build::run_build(&premix_config, base_dir)?;
      let bundled = if summary.bundled { "bundled" } else { "not bundled" };
      ui::detail(&format!(
        "{} \u{00b7} {} \u{00b7} {bundled} \u{00b7} manifest {}",
        ui::count(summary.manifest.routes.len(), "page"),
        ui::count(summary.stripped, "stripped export"),
        summary.manifest.version,
      ));
    }
    Command::Routes { config } => {
      let (config_path, premix_config) = resolve_config(config)?;
      routes::run_routes(&premix_config, base_dir(&config_path))?;
    }
    Command::Transform { file, target } => {
      let source = std::fs::read_to_string(&file)
        .with_context(|| format!("failed to read {}", file.display()))?;
      let out = premix_transform::transform(&file.to_string_lossy(), &source)?;
      let mut stdout = std::io::stdout().lock();
      stdout.write_all(out.variant(target).as_bytes()).context("failed to write output")?;
      stdout.flush().context("failed to write output")?;
    }
    Command::Clean { config } => {
      let (config_path, premix_config) = resolve_config(config)?;
      clean::run_clean(&premix_config, base_dir(&config_path))?;
    }
  }

  Ok(())
}
