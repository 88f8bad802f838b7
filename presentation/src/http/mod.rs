//! HTTP surfaces

pub mod gateway;
pub mod tool_server;

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Serve `router` on `bind` until `shutdown` is cancelled.
pub async fn serve(
    name: &str,
    router: Router,
    bind: &str,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind).await?;
    info!(server = name, addr = %listener.local_addr()?, "Listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    info!(server = name, "Stopped");
    Ok(())
}
