/* src/server/adapter/axum/src/lib.rs */

mod error;
mod handler;

use premix_server::{PremixError, PremixParts, PremixServer};

/// Re-export premix-server core for convenience
pub use premix_server;

/// Extension trait that converts a `PremixServer` into an Axum router.
pub trait IntoAxumRouter {
  fn into_axum_router(self) -> Result<axum::Router, PremixError>;
  fn serve(
    self,
    addr: &str,
  ) -> impl std::future::Future<Output = Result<(), Box<dyn std::error::Error>>> + Send;
}

impl IntoAxumRouter for PremixParts {
  fn into_axum_router(self) -> Result<axum::Router, PremixError> {
    Ok(handler::build_router(self))
  }

  async fn serve(self, addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    serve_router(self.into_axum_router()?, addr).await
  }
}

impl IntoAxumRouter for PremixServer {
  fn into_axum_router(self) -> Result<axum::Router, PremixError> {
    self.into_parts()?.into_axum_router()
  }

  async fn serve(self, addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    serve_router(self.into_axum_router()?, addr).await
  }
}

async fn serve_router(router: axum::Router, addr: &str) -> Result<(), Box<dyn std::error::Error>> {
  let listener = tokio::net::TcpListener::bind(addr).await?;
  let local_addr = listener.local_addr()?;
  tracing::info!("Premix server running on http://localhost:{}", local_addr.port());
  axum::serve(listener, router).await?;
  Ok(())
}
