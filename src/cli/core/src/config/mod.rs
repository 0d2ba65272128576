/* src/cli/core/src/config/mod.rs */

mod loader;
mod types;

#[cfg(test)]
mod tests;

pub use loader::{find_premix_config, load_premix_config, CONFIG_FILE};
pub use types::PremixConfig;
