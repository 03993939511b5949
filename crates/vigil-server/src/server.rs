//! `VigilServer`: router assembly and the listener lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use vigil_store::ConnectionPool;
use vigil_tracking::LifecycleController;

use crate::config::ServerConfig;
use crate::routes;
use crate::shutdown::ShutdownCoordinator;

/// Handles every route handler receives.
#[derive(Clone)]
pub struct AppState {
    /// Session lifecycle entry point.
    pub controller: Arc<LifecycleController>,
    /// Pool pinged by `/health`.
    pub pool: ConnectionPool,
    /// Prometheus render handle.
    pub metrics: PrometheusHandle,
    /// Process start, for uptime in `/health`.
    pub start_time: Instant,
}

/// The Vigil HTTP server.
pub struct VigilServer {
    config: ServerConfig,
    state: AppState,
    shutdown: Arc<ShutdownCoordinator>,
}

impl VigilServer {
    /// Create a new server.
    pub fn new(
        config: ServerConfig,
        controller: Arc<LifecycleController>,
        pool: ConnectionPool,
        metrics: PrometheusHandle,
    ) -> Self {
        Self {
            config,
            state: AppState {
                controller,
                pool,
                metrics,
                start_time: Instant::now(),
            },
            shutdown: Arc::new(ShutdownCoordinator::new()),
        }
    }

    /// Router with every endpoint, CORS, and request tracing.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(routes::health))
            .route("/metrics", get(routes::metrics))
            .route("/sessions", post(routes::create_session))
            .route("/sessions/{id}", get(routes::session_details))
            .route("/sessions/{id}/end", post(routes::end_session))
            .route("/sessions/{id}/rest-breaks", post(routes::record_rest_break))
            .route("/sessions/{id}/diagnosis", post(routes::diagnose))
            .route("/fatigue-reports", post(routes::submit_report))
            .route("/rest-activities", get(routes::rest_activities))
            .with_state(self.state.clone())
            .layer(cors_layer(&self.config.cors_origins))
            .layer(TraceLayer::new_for_http())
    }

    /// Bind and serve in a background task until shutdown is requested.
    ///
    /// Returns the bound address (useful with port 0) and the serve task.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener = tokio::net::TcpListener::bind(self.config.bind_addr()).await?;
        let addr = listener.local_addr()?;
        let router = self.router();
        let token = self.shutdown.token();

        let handle = tokio::spawn(async move {
            let result = axum::serve(listener, router)
                .with_graceful_shutdown(async move { token.cancelled().await })
                .await;
            if let Err(e) = result {
                error!(error = %e, "server stopped with error");
            }
        });

        info!(%addr, "vigil server listening");
        Ok((addr, handle))
    }

    /// Coordinator that stops the listener.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Listener configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Permissive CORS when no origins are configured, an allow-list otherwise.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}
