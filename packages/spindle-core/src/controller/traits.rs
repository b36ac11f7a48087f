//! Trait abstractions for controller operations.
//!
//! Services depend on these traits rather than a concrete client, so tests can
//! substitute in-memory fakes and the host application can plug in whatever
//! transport it uses.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::types::{
    BrowseOpts, BrowseResult, Control, Image, ImageOpts, LoadOpts, LoadResult, SeekMode,
    VolumeChange, ZoneEvent,
};
use super::ControllerResult;

/// Source of zone push updates.
///
/// Used by `ZoneEventProcessor`, the only writer of the zone registry.
pub trait ZoneFeed: Send + Sync {
    /// Subscribes to zone updates.
    ///
    /// The first event delivered on a fresh connection is expected to be
    /// [`ZoneEvent::Subscribed`]. The channel closes when the client shuts down.
    fn subscribe_zones(&self) -> mpsc::UnboundedReceiver<ZoneEvent>;
}

/// The controller's hierarchical browse service.
///
/// There is one cursor per session: every call moves or reads the same
/// position, so callers must serialize whole traversals (see `BrowseSerializer`).
#[async_trait]
pub trait BrowseService: Send + Sync {
    /// Performs a browse step: reset to root, descend into an item, or trigger an action.
    async fn browse(&self, opts: BrowseOpts) -> ControllerResult<BrowseResult>;

    /// Loads a page of the list the cursor currently points at.
    async fn load(&self, opts: LoadOpts) -> ControllerResult<LoadResult>;
}

/// Direct per-zone transport operations. These never touch the browse cursor.
#[async_trait]
pub trait TransportControl: Send + Sync {
    /// Sends a transport verb to a zone or output.
    async fn control(&self, zone_or_output_id: &str, control: Control) -> ControllerResult<()>;

    /// Seeks within the current track.
    ///
    /// # Arguments
    /// * `zone_or_output_id` - Zone or output to seek
    /// * `how` - Whether `seconds` is absolute or relative to the current position
    /// * `seconds` - Target position or offset
    async fn seek(&self, zone_or_output_id: &str, how: SeekMode, seconds: i64)
        -> ControllerResult<()>;

    /// Changes the volume of a single output.
    async fn change_volume(
        &self,
        output_id: &str,
        how: VolumeChange,
        value: i32,
    ) -> ControllerResult<()>;
}

/// Album art and other images served by the controller.
#[async_trait]
pub trait ImageService: Send + Sync {
    async fn get_image(&self, image_key: &str, opts: ImageOpts) -> ControllerResult<Image>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Combined Trait (for trait objects)
// ─────────────────────────────────────────────────────────────────────────────

/// Combined trait for everything the core needs from the controller.
///
/// Used by `bootstrap_services` to wire a single client into every service.
pub trait Controller: ZoneFeed + BrowseService + TransportControl + ImageService {}

/// Blanket implementation for any type implementing all traits.
impl<T: ZoneFeed + BrowseService + TransportControl + ImageService> Controller for T {}
