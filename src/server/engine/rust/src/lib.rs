/* src/server/engine/rust/src/lib.rs */

//! Logic shared by the Premix server and client tiers.
//!
//! Everything here is pure: no filesystem, no network, no async. Both tiers
//! compile the same matcher and the same page-state types, which is what keeps
//! server-side matching and client-side hydration in agreement.

pub mod data_url;
pub mod document;
pub mod escape;
pub mod links;
pub mod matcher;
pub mod route;
pub mod state;

// Public API re-exports
pub use data_url::{data_url, page_path_from_data_url, DATA_PREFIX};
pub use document::{extract_page_state, render_document, DATA_SCRIPT_ID, DEFAULT_SHELL};
pub use escape::{ascii_escape_json, escape_html, escape_json_for_script};
pub use links::{assemble_links, unique_links, AssetLinks};
pub use matcher::{build_path, extract_params, is_match, Params};
pub use route::{find_route, manifest_hash, Route, RouteManifest};
pub use state::{LinkDescriptor, LoaderData, PageState};
