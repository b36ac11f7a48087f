//! Boundary to the networked audio-system controller.
//!
//! The wire protocol (discovery, pairing, encoding) is provided by an external
//! client. This module defines what the core needs from it:
//!
//! - `types` - Zones, browse items, transport verbs, images
//! - `traits` - Async service traits the core depends on
//! - `callback` - Adapter turning a callback-style client into the async traits

pub mod callback;
pub mod traits;
pub mod types;

#[cfg(test)]
pub(crate) mod test_fixtures;

use std::time::Duration;

use thiserror::Error;

pub use callback::{Callback, CallbackController, RawController, ZoneCallback};
pub use traits::{BrowseService, Controller, ImageService, TransportControl, ZoneFeed};
pub use types::{
    BrowseAction, BrowseItem, BrowseList, BrowseOpts, BrowseResult, Control, DisplayLines, Image,
    ImageOpts, ImageScale, ItemKind, LoadOpts, LoadResult, NowPlayingInfo, Output, PlaybackState,
    SeekMode, VolumeChange, Zone, ZoneEvent,
};

/// Errors surfaced by the controller boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// No paired session with the controller.
    #[error("Not connected to the controller")]
    NotConnected,

    /// The controller did not answer within the transport timeout.
    #[error("{operation} timed out after {}ms", .after.as_millis())]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// The client dropped the request without answering.
    #[error("{operation} was cancelled before the controller answered")]
    Cancelled { operation: &'static str },

    /// The controller answered with an error.
    #[error("Controller error: {0}")]
    Remote(String),
}

impl ControllerError {
    /// Returns true if retrying the same request might succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Cancelled { .. })
    }
}

/// Convenient Result alias for controller round trips.
pub type ControllerResult<T> = Result<T, ControllerError>;
