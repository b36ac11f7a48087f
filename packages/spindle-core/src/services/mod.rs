//! Application services layer.
//!
//! This module contains the services that sit between the API layer and the
//! controller boundary (controller/) or the browse core (browse/).

pub mod playback;
pub mod zone_event_processor;
pub mod zone_registry;

pub use playback::{ControlOutcome, PlaybackService, VolumeOutcome};
pub use zone_event_processor::ZoneEventProcessor;
pub use zone_registry::{NowPlaying, NowPlayingStatus, ZoneRegistry};
