//! Server execution logic.

use std::sync::Arc;

use axum::{Router as AxumRouter, extract::Request};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::{
    routes::build_router,
    routing::{RouteError, Router},
    signal::shutdown_signal,
    state::AppState,
};

/// Chat server
///
/// The dispatcher is mounted as the single axum fallback, so axum only provides
/// the transport.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(AppState::in_memory(clock, ttl, interval))?;
/// server.run("127.0.0.1", 8080).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
    router: Arc<Router<AppState>>,
}

impl Server {
    /// Build the route table over `state`
    pub fn new(state: AppState) -> Result<Self, RouteError> {
        let router = build_router(state.check_session_usecase.clone())?;
        Ok(Self {
            state: Arc::new(state),
            router: Arc::new(router),
        })
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// The axum application: every request goes through the dispatcher
    pub fn app(&self) -> AxumRouter {
        let router = self.router.clone();
        let state = self.state.clone();
        AxumRouter::new()
            .fallback(move |req: Request| {
                let router = router.clone();
                let state = state.clone();
                async move { router.dispatch(req, state).await }
            })
            .layer(TraceLayer::new_for_http())
    }

    /// Bind `host:port` and serve until Ctrl+C / SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: &str, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;
        tracing::info!("Chat server listening on {}", listener.local_addr()?);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Serve on `listener` until `signal` resolves.
    ///
    /// The shutdown token is cancelled as soon as `signal` resolves, which ends
    /// every open event stream so graceful shutdown can complete.
    pub async fn serve<F>(self, listener: TcpListener, signal: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let shutdown = self.state.shutdown.clone();
        axum::serve(listener, self.app())
            .with_graceful_shutdown(async move {
                signal.await;
                shutdown.cancel();
            })
            .await
    }
}
