//! HTTP server for the chat client.
//!
//! Serves the rendered page, the form actions behind it and a health check.

pub mod cookies;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

/// Start the HTTP server on the configured address, with graceful shutdown support.
///
/// The server will stop accepting new connections when `shutdown_signal` completes.
///
/// # Errors
/// Returns an error if the server fails to start.
pub async fn run_server_with_shutdown<F>(state: Arc<AppState>, shutdown_signal: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = SocketAddr::new(state.config.bind_addr, state.config.port);
    let app: Router = create_router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Perfomai chat listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use super::*;
    use crate::config::ChatClientConfig;
    use crate::test_support::unreachable_url;

    #[tokio::test]
    async fn test_server_stops_on_shutdown_signal() {
        let config = ChatClientConfig::new(unreachable_url().await).with_port(0);
        let config = ChatClientConfig {
            bind_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            ..config
        };
        let state = AppState::new(config).unwrap();

        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(run_server_with_shutdown(state, async {
            let _ = rx.await;
        }));
        tx.send(()).unwrap();

        let result = tokio::time::timeout(std::time::Duration::from_secs(5), server)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
