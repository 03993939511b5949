//! # vigil-server
//!
//! Axum HTTP API over the tracking core.
//!
//! - **Routes**: fatigue reports, session lifecycle, diagnosis, rest activities
//! - **Errors**: [`error::ApiError`] maps error categories to HTTP statuses
//! - **Health**: `/health` pings the database
//! - **Metrics**: Prometheus text at `/metrics`
//! - **Shutdown**: `CancellationToken`-driven graceful stop

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod health;
pub mod metrics;
pub mod routes;
pub mod server;
pub mod shutdown;

pub use config::ServerConfig;
pub use server::{AppState, VigilServer};
pub use shutdown::ShutdownCoordinator;
