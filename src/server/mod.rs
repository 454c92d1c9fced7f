//! HTTP surface: the form, the insights view and the raw table view.

pub mod handlers;
pub mod router;
pub mod state;
pub mod templates;

use hyper::Server;
use std::net::SocketAddr;
use tracing::info;

pub use router::app_router;
pub use state::AppState;

/// Start the HTTP server on the specified port and run until Ctrl-C.
pub async fn start_server(state: AppState, port: u16) -> Result<(), hyper::Error> {
    let app = app_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("HTTP server running on http://localhost:{port}");
    info!("Health check: http://localhost:{port}/health");

    Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
