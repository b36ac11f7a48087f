//! HTTP API layer.
//!
//! This module contains thin handlers that delegate to services.
//! It provides the router construction and server startup functionality.

use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use crate::browse::PlayAlbumOrchestrator;
use crate::protocol_constants::PORT_RANGE;
use crate::services::{PlaybackService, ZoneRegistry};
use crate::state::Config;

pub mod http;
pub mod response;

/// Errors that can occur when starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to a TCP port.
    #[error("Failed to bind to port: {0}")]
    Bind(#[from] std::io::Error),

    /// No available ports in the specified range.
    #[error("No available ports in range {start}-{end}")]
    NoAvailablePort { start: u16, end: u16 },
}

/// Shared application state for the API layer.
///
/// Holds references to services only; all logic lives in the services.
#[derive(Clone)]
pub struct AppState {
    /// Zone cache fed by the controller subscription.
    pub registry: Arc<ZoneRegistry>,
    /// Serialized browse navigation and play strategies.
    pub orchestrator: Arc<PlayAlbumOrchestrator>,
    /// Direct transport operations.
    pub playback: Arc<PlaybackService>,
    /// Application configuration.
    pub config: Arc<RwLock<Config>>,
}

/// Builder for constructing an `AppState`.
#[derive(Default)]
pub struct AppStateBuilder {
    registry: Option<Arc<ZoneRegistry>>,
    orchestrator: Option<Arc<PlayAlbumOrchestrator>>,
    playback: Option<Arc<PlaybackService>>,
    config: Option<Arc<RwLock<Config>>>,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the zone registry.
    pub fn registry(mut self, registry: Arc<ZoneRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sets the play orchestrator.
    pub fn orchestrator(mut self, orchestrator: Arc<PlayAlbumOrchestrator>) -> Self {
        self.orchestrator = Some(orchestrator);
        self
    }

    /// Sets the playback service.
    pub fn playback(mut self, playback: Arc<PlaybackService>) -> Self {
        self.playback = Some(playback);
        self
    }

    /// Sets the configuration.
    pub fn config(mut self, config: Arc<RwLock<Config>>) -> Self {
        self.config = Some(config);
        self
    }

    /// Builds the `AppState`, panicking if required fields are missing.
    pub fn build(self) -> AppState {
        AppState {
            registry: self.registry.expect("registry is required"),
            orchestrator: self.orchestrator.expect("orchestrator is required"),
            playback: self.playback.expect("playback is required"),
            config: self
                .config
                .unwrap_or_else(|| Arc::new(RwLock::new(Config::default()))),
        }
    }
}

impl AppState {
    /// Creates a new builder for constructing an `AppState`.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }
}

async fn find_available_port(
    start: u16,
    end: u16,
) -> Result<(u16, tokio::net::TcpListener), ServerError> {
    for port in start..=end {
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
        match tokio::net::TcpListener::bind(&addr).await {
            Ok(listener) => return Ok((port, listener)),
            Err(_) => continue,
        }
    }
    Err(ServerError::NoAvailablePort { start, end })
}

/// Binds the configured port, or the first free port in the default range.
pub async fn bind_listener(
    preferred_port: u16,
) -> Result<(u16, tokio::net::TcpListener), ServerError> {
    if preferred_port > 0 {
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], preferred_port));
        return Ok((preferred_port, tokio::net::TcpListener::bind(&addr).await?));
    }
    find_available_port(PORT_RANGE.0, PORT_RANGE.1).await
}

/// Starts the HTTP server on the configured or auto-discovered port.
///
/// Runs until the server stops; spawn it to keep serving in the background.
pub async fn start_server(state: AppState) -> Result<(), ServerError> {
    let preferred_port = state.config.read().preferred_port;
    let (port, listener) = bind_listener(preferred_port).await?;

    log::info!("Server listening on http://0.0.0.0:{}", port);
    let app = http::create_router(state);
    axum::serve(listener, app).await?;
    Ok(())
}
