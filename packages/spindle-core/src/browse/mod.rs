//! Navigation of the controller's browse hierarchy.
//!
//! # Module Structure
//!
//! - `variants` - Fuzzy artist/album name variants
//! - `resolver` - Finds and triggers the playback action at the end of a path
//! - `navigator` - Walks a sequence of titles from the hierarchy root
//! - `serializer` - Process-wide FIFO lock around whole traversals
//! - `orchestrator` - Fallback strategies over variant cross products
//!
//! The controller keeps a single browse cursor per session. Every traversal
//! starts with a root reset and must hold the [`BrowseSerializer`] for its
//! whole duration, otherwise concurrent traversals move each other's cursor.

pub mod navigator;
pub mod orchestrator;
pub mod resolver;
pub mod serializer;
pub mod variants;

pub use navigator::{Navigate, NavigationOutcome, PathNavigator};
pub use orchestrator::{
    BrowseOutcome, MatchAttempt, PlayAlbumOrchestrator, PlayMatch, Strategy, StrategyLevel,
    ALBUM_QUEUE_STRATEGIES, PLAY_ALBUM_STRATEGIES,
};
pub use resolver::{ActionResolver, Resolution};
pub use serializer::{BrowseGuard, BrowseSerializer};
pub use variants::{album_variants, artist_variants};

use crate::controller::{BrowseOpts, LoadOpts};
use crate::state::BrowseConfig;

/// Parameters shared by every browse and load call of this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseSession {
    pub hierarchy: String,
    pub session_key: Option<String>,
    pub page_size: usize,
}

impl BrowseSession {
    /// Builds the session from configuration, generating a session key if none is set.
    pub fn from_config(config: &BrowseConfig) -> Self {
        let session_key = config
            .session_key
            .clone()
            .unwrap_or_else(|| format!("spindle-{}", uuid::Uuid::new_v4()));
        Self {
            hierarchy: config.hierarchy.clone(),
            session_key: Some(session_key),
            page_size: config.page_size,
        }
    }

    /// Options resetting the cursor to the hierarchy root, scoped to a zone.
    pub fn root_opts(&self, zone_or_output_id: &str) -> BrowseOpts {
        BrowseOpts {
            hierarchy: self.hierarchy.clone(),
            multi_session_key: self.session_key.clone(),
            zone_or_output_id: Some(zone_or_output_id.to_string()),
            pop_all: true,
            ..Default::default()
        }
    }

    /// Options descending into (or triggering) an item of the current level.
    pub fn item_opts(&self, zone_or_output_id: &str, item_key: &str) -> BrowseOpts {
        BrowseOpts {
            hierarchy: self.hierarchy.clone(),
            multi_session_key: self.session_key.clone(),
            zone_or_output_id: Some(zone_or_output_id.to_string()),
            item_key: Some(item_key.to_string()),
            ..Default::default()
        }
    }

    /// Options loading one page of the current level.
    pub fn page_opts(&self, offset: usize) -> LoadOpts {
        LoadOpts {
            hierarchy: self.hierarchy.clone(),
            multi_session_key: self.session_key.clone(),
            level: None,
            offset,
            count: self.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_session_key_is_kept() {
        let config = BrowseConfig {
            session_key: Some("fixed".into()),
            ..Default::default()
        };
        let session = BrowseSession::from_config(&config);
        assert_eq!(session.session_key.as_deref(), Some("fixed"));
        assert_eq!(session.page_opts(200).offset, 200);
        assert_eq!(session.page_opts(0).count, config.page_size);
    }

    #[test]
    fn generated_session_key_is_stable_per_session() {
        let session = BrowseSession::from_config(&BrowseConfig::default());
        let root = session.root_opts("zone-1");
        let item = session.item_opts("zone-1", "k1");
        assert!(root.pop_all);
        assert_eq!(root.multi_session_key, item.multi_session_key);
        assert!(root
            .multi_session_key
            .as_deref()
            .unwrap()
            .starts_with("spindle-"));
    }
}
