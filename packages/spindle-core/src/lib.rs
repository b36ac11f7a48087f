//! Spindle Core - playback orchestration for a networked audio controller.
//!
//! This crate turns catalog requests ("play this album by this artist in the
//! kitchen") into the browse traversals a Roon-style controller understands,
//! and exposes them together with direct transport control over HTTP.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`controller`]: Boundary traits and types for the external controller client
//! - [`browse`]: Name variants, path navigation, action resolution and the
//!   play strategies, all serialized over the controller's single browse cursor
//! - [`services`]: Zone registry, zone event loop and transport operations
//! - [`api`]: HTTP routes and server startup
//! - [`state`]: Configuration
//! - [`error`]: Centralized error types
//!
//! # Abstraction Traits
//!
//! The core never speaks the controller's wire protocol. The host application
//! supplies a client implementing [`Controller`] (or a callback-style
//! [`RawController`] wrapped in [`CallbackController`]) and hands it to
//! [`bootstrap_services`].

#![warn(clippy::all)]

pub mod api;
pub mod bootstrap;
pub mod browse;
pub mod controller;
pub mod error;
pub mod protocol_constants;
pub mod services;
pub mod state;

// Re-export commonly used types at the crate root
pub use error::{ErrorCode, SpindleError, SpindleResult};
pub use state::{BrowseConfig, Config};

// Re-export controller boundary
pub use controller::{
    BrowseService, CallbackController, Controller, ControllerError, ImageService, RawController,
    TransportControl, Zone, ZoneEvent, ZoneFeed,
};

// Re-export browse core
pub use browse::{
    album_variants, artist_variants, ActionResolver, BrowseSerializer, BrowseSession,
    PathNavigator, PlayAlbumOrchestrator, PlayMatch,
};

// Re-export service types
pub use services::{NowPlaying, NowPlayingStatus, PlaybackService, ZoneRegistry};

// Re-export bootstrap types
pub use bootstrap::{bootstrap_services, BootstrappedServices};

// Re-export API types
pub use api::{start_server, AppState, AppStateBuilder, ServerError};
