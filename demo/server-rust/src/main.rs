/* demo/server-rust/src/main.rs */

mod pages;
mod posts;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use premix_server::{export_static, HttpResponse, PremixError, PremixServer, ServerOptions};
use premix_server_axum::IntoAxumRouter;
use tracing_subscriber::EnvFilter;

fn app() -> PremixServer {
  let guestbook: pages::Guestbook = Arc::new(Mutex::new(Vec::new()));
  PremixServer::new()
    .options(ServerOptions::from_env())
    .page("index", pages::index())
    .page("$post", pages::post())
    .page("guestbook", pages::guestbook(&guestbook))
    .api("api/hello", |_req| async {
      HttpResponse::json(&serde_json::json!({ "message": "hello from premix" })).map_err(PremixError::from)
    })
}

/// `--export <dir>` pre-renders every page instead of serving.
fn export_dir() -> Option<PathBuf> {
  let mut args = std::env::args().skip(1);
  while let Some(arg) = args.next() {
    if arg == "--export" {
      return args.next().map(PathBuf::from);
    }
  }
  None
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  if let Some(out_dir) = export_dir() {
    let parts = app().into_parts()?;
    let urls = export_static(&parts.renderer, &out_dir).await?;
    tracing::info!(count = urls.len(), dir = %out_dir.display(), "exported pages");
    return Ok(());
  }

  let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
  app().serve(&format!("0.0.0.0:{port}")).await
}
