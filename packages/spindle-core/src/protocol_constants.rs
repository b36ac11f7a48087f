//! Fixed constants describing the controller's browse conventions.
//!
//! Tunable values (page size, timeouts, budgets) live in [`crate::state::BrowseConfig`];
//! the entries here are titles and names the controller itself defines.

// ─────────────────────────────────────────────────────────────────────────────
// Browse Hierarchy
// ─────────────────────────────────────────────────────────────────────────────

/// Hierarchy exposing the full library tree.
pub const BROWSE_HIERARCHY: &str = "browse";

/// Top-level entry under which the library lives.
pub const LIBRARY_TITLE: &str = "Library";

/// Library list grouping albums by artist.
pub const ARTISTS_TITLE: &str = "Artists";

/// Flat library list of all albums.
pub const ALBUMS_TITLE: &str = "Albums";

/// Flat library list of all tracks.
pub const TRACKS_TITLE: &str = "Tracks";

// ─────────────────────────────────────────────────────────────────────────────
// Actions
// ─────────────────────────────────────────────────────────────────────────────

/// Action that replaces the queue and starts playback immediately.
pub const PLAY_NOW: &str = "Play Now";

/// Action that appends to the zone's queue.
pub const QUEUE: &str = "Queue";

/// Actions tried, in order, when no specific action was requested.
pub const DEFAULT_ACTION_PRIORITY: [&str; 4] = [PLAY_NOW, "Play Album", "Play", "Play from Here"];

// ─────────────────────────────────────────────────────────────────────────────
// Defaults
// ─────────────────────────────────────────────────────────────────────────────

/// Items requested per load call while scanning a level.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Timeout for a single controller round trip (milliseconds).
pub const DEFAULT_CALL_TIMEOUT_MS: u64 = 5_000;

/// End-to-end budget for one play request (milliseconds).
///
/// Must cover 6-10 sequential round trips at 150-300ms each, per variant tried.
pub const DEFAULT_PLAY_BUDGET_MS: u64 = 15_000;

/// Port range scanned when no preferred port is configured.
pub const PORT_RANGE: (u16, u16) = (49500, 49510);

/// Placeholder for now-playing fields the controller did not supply.
pub const UNKNOWN_PLACEHOLDER: &str = "Unknown";

/// Service identifier reported by the health endpoint.
pub const SERVICE_ID: &str = "spindle";
