//! Zone event processing service.
//!
//! Drains the controller's zone subscription into the [`ZoneRegistry`]. This
//! is the registry's only writer; HTTP handlers only read from it.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::controller::ZoneEvent;
use crate::services::zone_registry::ZoneRegistry;

/// Applies zone events to the registry.
pub struct ZoneEventProcessor {
    registry: Arc<ZoneRegistry>,
}

impl ZoneEventProcessor {
    pub fn new(registry: Arc<ZoneRegistry>) -> Self {
        Self { registry }
    }

    /// Applies a single event.
    pub fn process_event(&self, event: ZoneEvent) {
        tracing::debug!(?event, "zone_event");
        match event {
            ZoneEvent::Subscribed { zones } => self.registry.apply_subscribed(zones),
            ZoneEvent::Changed {
                added,
                changed,
                removed,
            } => self.registry.apply_changed(added, changed, removed),
            ZoneEvent::SeekChanged {
                zone_id,
                seek_position,
            } => self.registry.apply_seek(&zone_id, seek_position),
            ZoneEvent::Disconnected => self.registry.clear_disconnected(),
        }
    }

    /// Spawns the loop draining `events` until the channel closes or `cancel` fires.
    ///
    /// A closed channel means the controller dropped the subscription, so the
    /// registry is cleared the same way as on an explicit disconnect.
    pub fn spawn(
        self,
        mut events: mpsc::UnboundedReceiver<ZoneEvent>,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        log::debug!("[ZoneEventProcessor] Cancelled");
                        break;
                    }
                    event = events.recv() => match event {
                        Some(event) => self.process_event(event),
                        None => {
                            log::warn!("[ZoneEventProcessor] Zone feed closed");
                            self.registry.clear_disconnected();
                            break;
                        }
                    },
                }
            }
        })
    }
}
