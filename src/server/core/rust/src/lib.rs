/* src/server/core/rust/src/lib.rs */

pub mod api;
pub mod build_loader;
pub mod config;
pub mod discover;
pub mod errors;
pub mod export;
pub mod http;
pub mod metafile;
pub mod page;
pub mod registry;
pub mod render;
pub mod revalidate;
pub mod server;

// Re-exports for ergonomic use
pub use api::ApiRoutes;
pub use build_loader::{load_route_manifest, ROUTE_MANIFEST};
pub use config::{Mode, ServerOptions};
pub use discover::{discover, discover_api};
pub use errors::PremixError;
pub use export::export_static;
pub use http::{HttpResponse, PageRequest};
pub use metafile::{AssetIndex, Metafile, MetafileSource};
pub use page::{BoxFuture, LoaderKind, PageConfig, PageModule, StaticContext};
pub use premix_engine::{LinkDescriptor, LoaderData, PageState, Params, Route, RouteManifest};
pub use render::{RenderedPage, Renderer};
pub use revalidate::{Decision, ManualClock, RevalidationState, Revalidator};
pub use server::{PremixParts, PremixServer};

/// Re-export the shared engine crate.
pub use premix_engine;
