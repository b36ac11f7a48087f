//! Application bootstrap and dependency wiring.
//!
//! This module contains the composition root: the single place where all
//! services are instantiated and wired together around one controller client.
//!
//! The host application owns the controller connection. A raw callback-style
//! client is typically wrapped first so every round trip gets the configured
//! timeout:
//!
//! ```ignore
//! let controller = Arc::new(CallbackController::new(
//!     raw,
//!     Duration::from_millis(config.browse.call_timeout_ms),
//! ));
//! let services = bootstrap_services(&config, controller)?;
//! tokio::spawn(start_server(services.app_state()));
//! ```

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api::AppState;
use crate::browse::{
    BrowseSerializer, BrowseSession, Navigate, PathNavigator, PlayAlbumOrchestrator,
};
use crate::controller::{BrowseService, Controller, ImageService, TransportControl};
use crate::error::{SpindleError, SpindleResult};
use crate::services::{PlaybackService, ZoneEventProcessor, ZoneRegistry};
use crate::state::Config;

/// Container for all bootstrapped services.
///
/// Consumed by [`AppState`] to build the HTTP layer's state.
pub struct BootstrappedServices {
    /// Zone cache fed by the controller subscription.
    pub registry: Arc<ZoneRegistry>,
    /// Browse lock shared by every cursor-moving request.
    pub serializer: Arc<BrowseSerializer>,
    /// Play strategies and raw browse.
    pub orchestrator: Arc<PlayAlbumOrchestrator>,
    /// Direct transport operations.
    pub playback: Arc<PlaybackService>,
    /// Configuration the services were built from.
    pub config: Arc<RwLock<Config>>,
    /// Cancellation token for graceful shutdown.
    pub cancel_token: CancellationToken,
    zone_task: Mutex<Option<JoinHandle<()>>>,
}

impl BootstrappedServices {
    /// Builds the HTTP layer's state from the wired services.
    pub fn app_state(&self) -> AppState {
        AppState::builder()
            .registry(Arc::clone(&self.registry))
            .orchestrator(Arc::clone(&self.orchestrator))
            .playback(Arc::clone(&self.playback))
            .config(Arc::clone(&self.config))
            .build()
    }

    /// Initiates graceful shutdown of all services.
    ///
    /// Stops the zone event loop and waits for it to exit. Requests already
    /// holding the browse lock finish on their own budget.
    pub async fn shutdown(&self) {
        log::info!("[Bootstrap] Beginning graceful shutdown...");

        self.cancel_token.cancel();

        let handle = self.zone_task.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                log::warn!("[Bootstrap] Zone event loop ended abnormally: {}", e);
            }
        }

        log::info!("[Bootstrap] Shutdown complete");
    }
}

/// Bootstraps all services around a single controller client.
///
/// Services are created in dependency order:
///
/// 1. Zone registry and the event loop feeding it from `subscribe_zones`
/// 2. Browse session, path navigator and the browse lock
/// 3. Play orchestrator (depends on registry, lock, navigator)
/// 4. Playback service (depends on registry and the transport side)
///
/// Must be called from within a Tokio runtime, since the zone event loop is
/// spawned immediately.
///
/// # Errors
///
/// Returns [`SpindleError::Configuration`] if the browse settings are invalid.
pub fn bootstrap_services<C>(
    config: &Config,
    controller: Arc<C>,
) -> SpindleResult<BootstrappedServices>
where
    C: Controller + 'static,
{
    config
        .browse
        .validate()
        .map_err(SpindleError::Configuration)?;

    let cancel_token = CancellationToken::new();

    // Zone state: subscribe before anything can ask for a zone
    let registry = Arc::new(ZoneRegistry::new());
    let events = controller.subscribe_zones();
    let zone_task = ZoneEventProcessor::new(Arc::clone(&registry)).spawn(events, cancel_token.clone());

    // Browse core
    let session = BrowseSession::from_config(&config.browse);
    let navigator = Arc::new(PathNavigator::new(
        Arc::clone(&controller) as Arc<dyn BrowseService>,
        session,
    ));
    let serializer = Arc::new(BrowseSerializer::new());
    let orchestrator = Arc::new(PlayAlbumOrchestrator::new(
        Arc::clone(&registry),
        Arc::clone(&serializer),
        navigator as Arc<dyn Navigate>,
        config.browse.library_path.clone(),
        Duration::from_millis(config.browse.play_budget_ms),
    ));

    // Transport
    let playback = Arc::new(PlaybackService::new(
        Arc::clone(&registry),
        Arc::clone(&controller) as Arc<dyn TransportControl>,
        controller as Arc<dyn ImageService>,
    ));

    log::info!(
        "[Bootstrap] Services ready (hierarchy={}, page_size={}, budget={}ms)",
        config.browse.hierarchy,
        config.browse.page_size,
        config.browse.play_budget_ms
    );

    Ok(BootstrappedServices {
        registry,
        serializer,
        orchestrator,
        playback,
        config: Arc::new(RwLock::new(config.clone())),
        cancel_token,
        zone_task: Mutex::new(Some(zone_task)),
    })
}
