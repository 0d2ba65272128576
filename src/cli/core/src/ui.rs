/* src/cli/core/src/ui.rs */

use std::time::Duration;

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

const VERSION: &str = env!("CARGO_PKG_VERSION");
const INDENT: &str = "        ";

pub fn banner(cmd: &str) {
  println!();
  println!("  {BOLD}Premix{RESET} {cmd} {DIM}v{VERSION}{RESET}");
  println!();
}

pub fn step(n: u32, total: u32, msg: &str) {
  println!("  {BOLD}[{n}/{total}]{RESET} {msg}...");
}

pub fn ok(msg: &str) {
  println!("  {GREEN}\u{2713}{RESET} {msg}");
}

pub fn warn(msg: &str) {
  println!("  {YELLOW}!{RESET} {msg}");
}

pub fn arrow(msg: &str) {
  println!("  {GREEN}\u{2192}{RESET} {msg}");
}

pub fn detail(msg: &str) {
  println!("{INDENT}{msg}");
}

pub fn detail_ok(msg: &str) {
  println!("{INDENT}{GREEN}\u{2713}{RESET} {msg}");
}

/// Multi-line tool output, dimmed and indented under the current step.
pub fn passthrough(output: &str) {
  for line in output.lines().filter(|l| !l.trim().is_empty()) {
    println!("{INDENT}{DIM}{line}{RESET}");
  }
}

pub fn blank() {
  println!();
}

/// `1 page`, `3 pages`, `0 api routes`.
pub fn count(n: usize, noun: &str) -> String {
  if n == 1 { format!("{n} {noun}") } else { format!("{n} {noun}s") }
}

/// `820ms` below one second, `1.4s` above.
pub fn elapsed(d: Duration) -> String {
  if d < Duration::from_secs(1) {
    format!("{}ms", d.as_millis())
  } else {
    format!("{:.1}s", d.as_secs_f64())
  }
}
