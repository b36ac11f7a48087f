//! Domain types exchanged with the audio-system controller.
//!
//! These mirror the controller's transport, browse, and image services closely
//! enough that a concrete client can map its wire format onto them without
//! loss, while staying independent of any particular encoding.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::SpindleError;

// ─────────────────────────────────────────────────────────────────────────────
// Zones
// ─────────────────────────────────────────────────────────────────────────────

/// Playback state reported for a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
    Loading,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A single audio output belonging to a zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub output_id: String,
    pub display_name: String,
}

/// Display lines the controller provides for the current track.
///
/// `line1` is the title, `line2` the artist, `line3` the album. Any of them may
/// be missing (radio streams often only populate the first line).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayLines {
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub line3: Option<String>,
}

/// Raw now-playing data attached to a zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NowPlayingInfo {
    pub three_line: DisplayLines,
    /// Track length in seconds.
    pub length: Option<u32>,
    /// Seek position in seconds.
    pub seek_position: Option<i64>,
    /// Opaque image reference, usable with [`ImageService`](super::ImageService).
    pub image_key: Option<String>,
}

/// A logical playback endpoint (room or grouped outputs).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub zone_id: String,
    pub display_name: String,
    pub state: PlaybackState,
    pub outputs: Vec<Output>,
    pub now_playing: Option<NowPlayingInfo>,
    pub is_play_allowed: bool,
    pub is_pause_allowed: bool,
    pub is_seek_allowed: bool,
    pub is_next_allowed: bool,
    pub is_previous_allowed: bool,
}

impl Zone {
    /// Returns true if one of this zone's outputs has the given id.
    pub fn has_output(&self, output_id: &str) -> bool {
        self.outputs.iter().any(|o| o.output_id == output_id)
    }
}

/// Push notifications from the controller's zone subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneEvent {
    /// Initial subscription snapshot. Replaces everything known so far.
    Subscribed { zones: Vec<Zone> },
    /// Incremental update. Each zone in `added`/`changed` replaces its entry wholesale.
    Changed {
        added: Vec<Zone>,
        changed: Vec<Zone>,
        removed: Vec<String>,
    },
    /// Periodic seek position tick for a playing zone.
    SeekChanged { zone_id: String, seek_position: i64 },
    /// The connection to the controller was lost.
    Disconnected,
}

// ─────────────────────────────────────────────────────────────────────────────
// Transport
// ─────────────────────────────────────────────────────────────────────────────

/// Transport control verbs accepted by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Control {
    Play,
    Pause,
    PlayPause,
    Stop,
    Previous,
    Next,
}

impl Control {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Pause => "pause",
            Self::PlayPause => "playpause",
            Self::Stop => "stop",
            Self::Previous => "previous",
            Self::Next => "next",
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Control {
    type Err = SpindleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "play" => Ok(Self::Play),
            "pause" => Ok(Self::Pause),
            "playpause" => Ok(Self::PlayPause),
            "stop" => Ok(Self::Stop),
            "previous" | "prev" => Ok(Self::Previous),
            "next" => Ok(Self::Next),
            other => Err(SpindleError::InvalidControl(other.to_string())),
        }
    }
}

/// How a seek value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeekMode {
    #[default]
    Absolute,
    Relative,
}

/// How a volume value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeChange {
    #[default]
    Absolute,
    Relative,
    RelativeStep,
}

// ─────────────────────────────────────────────────────────────────────────────
// Browse
// ─────────────────────────────────────────────────────────────────────────────

/// Options for a browse step (navigating the cursor).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BrowseOpts {
    pub hierarchy: String,
    pub multi_session_key: Option<String>,
    pub item_key: Option<String>,
    pub zone_or_output_id: Option<String>,
    pub input: Option<String>,
    /// Reset the cursor to the hierarchy root.
    pub pop_all: bool,
    pub pop_levels: Option<u32>,
    pub refresh_list: bool,
}

/// What the controller did in response to a browse step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowseAction {
    /// The cursor moved into a new list; load it to see the items.
    List,
    /// An action ran and produced a message for the user.
    Message,
    /// An action ran with nothing further to show.
    None,
    ReplaceItem,
    RemoveItem,
}

/// Header of the list the cursor currently points at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseList {
    pub title: String,
    pub count: usize,
    pub level: u32,
    pub subtitle: Option<String>,
    pub hint: Option<ItemKind>,
}

/// Response to a browse step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseResult {
    pub action: BrowseAction,
    pub list: Option<BrowseList>,
    pub message: Option<String>,
    pub is_error: bool,
}

impl BrowseResult {
    pub fn list(list: BrowseList) -> Self {
        Self {
            action: BrowseAction::List,
            list: Some(list),
            message: None,
            is_error: false,
        }
    }

    pub fn message(message: impl Into<String>, is_error: bool) -> Self {
        Self {
            action: BrowseAction::Message,
            list: None,
            message: Some(message.into()),
            is_error,
        }
    }

    pub fn none() -> Self {
        Self {
            action: BrowseAction::None,
            list: None,
            message: None,
            is_error: false,
        }
    }

    /// True when the step opened a further list rather than running an action.
    pub fn is_list(&self) -> bool {
        self.action == BrowseAction::List
    }

    /// True when an action completed: a non-error message or no further state.
    pub fn is_completed_action(&self) -> bool {
        match self.action {
            BrowseAction::Message => !self.is_error,
            BrowseAction::None | BrowseAction::ReplaceItem | BrowseAction::RemoveItem => true,
            BrowseAction::List => false,
        }
    }
}

/// Options for loading a page of the current list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadOpts {
    pub hierarchy: String,
    pub multi_session_key: Option<String>,
    pub level: Option<u32>,
    pub offset: usize,
    pub count: usize,
}

/// Kind of a browse entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// A plain entry, usually navigable.
    Item,
    /// An entry that opens a sub-list.
    List,
    /// An entry that triggers a playback side effect.
    Action,
    /// An entry that opens a list of actions.
    ActionList,
    /// A non-interactive header.
    Header,
}

/// One entry of a loaded page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseItem {
    pub title: String,
    pub subtitle: Option<String>,
    pub item_key: Option<String>,
    pub kind: ItemKind,
}

impl BrowseItem {
    /// Case-insensitive title comparison used for all path and action matching.
    pub fn title_matches(&self, wanted: &str) -> bool {
        self.title.trim().to_lowercase() == wanted.trim().to_lowercase()
    }

    /// Headers and key-less entries cannot be browsed into.
    pub fn is_selectable(&self) -> bool {
        self.kind != ItemKind::Header && self.item_key.is_some()
    }
}

/// A page of items plus the list it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadResult {
    pub items: Vec<BrowseItem>,
    pub offset: usize,
    pub list: BrowseList,
}

// ─────────────────────────────────────────────────────────────────────────────
// Images
// ─────────────────────────────────────────────────────────────────────────────

/// Scaling applied by the controller when rendering an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageScale {
    Fit,
    Fill,
    Stretch,
}

/// Image request options. Width and height are only honoured with a scale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ImageOpts {
    pub scale: Option<ImageScale>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Image bytes returned by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub content_type: String,
    pub data: Bytes,
}
