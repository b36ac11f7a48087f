//! Cache of the controller's zones, fed by the zone subscription.
//!
//! Responsibilities:
//! - Applying subscription snapshots and per-zone deltas
//! - Resolving zone references (id, output id or display name)
//! - Answering now-playing queries
//!
//! Reads never block on the network; they see the latest applied snapshot.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use serde::Serialize;

use crate::controller::{PlaybackState, Zone};
use crate::error::{SpindleError, SpindleResult};
use crate::protocol_constants::UNKNOWN_PLACEHOLDER;

/// Track currently playing in a zone, with missing fields filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NowPlaying {
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Track length in seconds.
    pub length: Option<u32>,
    /// Seek position in seconds.
    pub seek_position: Option<i64>,
    pub image_key: Option<String>,
}

impl NowPlaying {
    /// Derives the now-playing fields from a zone's display lines.
    ///
    /// Returns `None` if the zone carries no now-playing data.
    pub fn from_zone(zone: &Zone) -> Option<Self> {
        let info = zone.now_playing.as_ref()?;
        let line = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(UNKNOWN_PLACEHOLDER)
                .to_string()
        };
        Some(Self {
            title: line(&info.three_line.line1),
            artist: line(&info.three_line.line2),
            album: line(&info.three_line.line3),
            length: info.length,
            seek_position: info.seek_position,
            image_key: info.image_key.clone(),
        })
    }
}

/// Answer to a now-playing query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NowPlayingStatus {
    Playing {
        zone_id: String,
        zone_name: String,
        now_playing: NowPlaying,
    },
    /// No zone is playing. Serialized as `{"playing": false}`.
    Idle,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NowPlayingWire<'a> {
    playing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    zone_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    zone_name: Option<&'a str>,
    #[serde(flatten)]
    now_playing: Option<&'a NowPlaying>,
}

impl Serialize for NowPlayingStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self {
            Self::Playing {
                zone_id,
                zone_name,
                now_playing,
            } => NowPlayingWire {
                playing: true,
                zone_id: Some(zone_id.as_str()),
                zone_name: Some(zone_name.as_str()),
                now_playing: Some(now_playing),
            },
            Self::Idle => NowPlayingWire {
                playing: false,
                zone_id: None,
                zone_name: None,
                now_playing: None,
            },
        };
        wire.serialize(serializer)
    }
}

/// Current zone state, keyed by zone id.
///
/// Single writer (the zone event processor), many readers. Each zone entry is
/// replaced wholesale, never patched field by field, except for seek ticks.
#[derive(Default)]
pub struct ZoneRegistry {
    zones: DashMap<String, Zone>,
    connected: AtomicBool,
}

impl ZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces everything known with a fresh subscription snapshot.
    ///
    /// Zones present in both snapshots are replaced in place, so readers never
    /// observe them missing while the snapshot is applied.
    pub fn apply_subscribed(&self, zones: Vec<Zone>) {
        let ids: HashSet<String> = zones.iter().map(|z| z.zone_id.clone()).collect();
        for zone in zones {
            self.zones.insert(zone.zone_id.clone(), zone);
        }
        self.zones.retain(|zone_id, _| ids.contains(zone_id));
        self.connected.store(true, Ordering::SeqCst);
        log::info!(
            "[ZoneRegistry] Subscribed with {} zone(s)",
            self.zones.len()
        );
    }

    /// Applies an incremental update.
    pub fn apply_changed(&self, added: Vec<Zone>, changed: Vec<Zone>, removed: Vec<String>) {
        for zone_id in &removed {
            if self.zones.remove(zone_id).is_some() {
                log::info!("[ZoneRegistry] Zone removed: {}", zone_id);
            }
        }
        for zone in added {
            log::info!(
                "[ZoneRegistry] Zone added: {} ({})",
                zone.display_name,
                zone.zone_id
            );
            self.zones.insert(zone.zone_id.clone(), zone);
        }
        for zone in changed {
            log::debug!(
                "[ZoneRegistry] Zone changed: {} -> {:?}",
                zone.zone_id,
                zone.state
            );
            self.zones.insert(zone.zone_id.clone(), zone);
        }
    }

    /// Updates the seek position of a zone's current track.
    pub fn apply_seek(&self, zone_id: &str, seek_position: i64) {
        if let Some(mut zone) = self.zones.get_mut(zone_id) {
            if let Some(now_playing) = zone.now_playing.as_mut() {
                now_playing.seek_position = Some(seek_position);
            }
        }
    }

    /// Forgets every zone after the controller connection dropped.
    pub fn clear_disconnected(&self) {
        self.connected.store(false, Ordering::SeqCst);
        let count = self.zones.len();
        self.zones.clear();
        log::warn!(
            "[ZoneRegistry] Controller disconnected, cleared {} zone(s)",
            count
        );
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Returns a snapshot of a zone by id.
    pub fn get(&self, zone_id: &str) -> Option<Zone> {
        self.zones.get(zone_id).map(|z| z.value().clone())
    }

    /// All zones, sorted by display name.
    pub fn list(&self) -> Vec<Zone> {
        let mut zones: Vec<Zone> = self.zones.iter().map(|z| z.value().clone()).collect();
        zones.sort_by(|a, b| {
            a.display_name
                .to_lowercase()
                .cmp(&b.display_name.to_lowercase())
                .then_with(|| a.zone_id.cmp(&b.zone_id))
        });
        zones
    }

    /// Resolves a zone reference to a zone snapshot.
    ///
    /// The reference is tried as a zone id, then as an output id, then as a
    /// case-insensitive display name. Without a reference, the first zone in
    /// display-name order is used.
    ///
    /// # Errors
    ///
    /// Returns [`SpindleError::ZoneNotFound`] if nothing matches or no zones exist.
    pub fn resolve(&self, reference: Option<&str>) -> SpindleResult<Zone> {
        let reference = reference.map(str::trim).filter(|r| !r.is_empty());

        let Some(reference) = reference else {
            return self
                .list()
                .into_iter()
                .next()
                .ok_or_else(|| SpindleError::ZoneNotFound("no zones available".into()));
        };

        if let Some(zone) = self.get(reference) {
            return Ok(zone);
        }

        let zones = self.list();
        if let Some(zone) = zones.iter().find(|z| z.has_output(reference)) {
            return Ok(zone.clone());
        }

        let wanted = reference.to_lowercase();
        zones
            .into_iter()
            .find(|z| z.display_name.trim().to_lowercase() == wanted)
            .ok_or_else(|| SpindleError::ZoneNotFound(reference.to_string()))
    }

    /// First zone (in display-name order) that is playing and has track data.
    pub fn now_playing(&self) -> NowPlayingStatus {
        self.list()
            .into_iter()
            .filter(|z| z.state == PlaybackState::Playing)
            .find_map(|z| {
                NowPlaying::from_zone(&z).map(|now_playing| NowPlayingStatus::Playing {
                    zone_id: z.zone_id.clone(),
                    zone_name: z.display_name.clone(),
                    now_playing,
                })
            })
            .unwrap_or(NowPlayingStatus::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::test_fixtures::{playing_zone, zone};

    fn registry_with(zones: Vec<Zone>) -> ZoneRegistry {
        let registry = ZoneRegistry::new();
        registry.apply_subscribed(zones);
        registry
    }

    #[test]
    fn subscribed_replaces_everything_and_connects() {
        let registry = registry_with(vec![zone("z1", "Kitchen", PlaybackState::Stopped)]);
        registry.apply_subscribed(vec![zone("z2", "Office", PlaybackState::Stopped)]);

        assert!(registry.is_connected());
        assert!(registry.get("z1").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn resubscribe_never_hides_surviving_zones() {
        let registry = registry_with(vec![
            zone("z1", "Kitchen", PlaybackState::Stopped),
            zone("z2", "Office", PlaybackState::Stopped),
        ]);

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for i in 0..2_000 {
                    let state = if i % 2 == 0 {
                        PlaybackState::Playing
                    } else {
                        PlaybackState::Paused
                    };
                    registry.apply_subscribed(vec![
                        zone("z1", "Kitchen", state),
                        zone("z2", "Office", PlaybackState::Stopped),
                    ]);
                }
            });
            scope.spawn(|| {
                for _ in 0..2_000 {
                    assert_eq!(registry.resolve(Some("Kitchen")).unwrap().zone_id, "z1");
                }
            });
        });

        registry.apply_subscribed(vec![zone("z1", "Kitchen", PlaybackState::Stopped)]);
        assert!(registry.get("z2").is_none());
    }

    #[test]
    fn changed_applies_added_changed_removed() {
        let registry = registry_with(vec![
            zone("z1", "Kitchen", PlaybackState::Stopped),
            zone("z2", "Office", PlaybackState::Stopped),
        ]);

        registry.apply_changed(
            vec![zone("z3", "Den", PlaybackState::Stopped)],
            vec![zone("z1", "Kitchen", PlaybackState::Playing)],
            vec!["z2".into()],
        );

        let names: Vec<String> = registry.list().into_iter().map(|z| z.display_name).collect();
        assert_eq!(names, vec!["Den", "Kitchen"]);
        assert_eq!(registry.get("z1").unwrap().state, PlaybackState::Playing);
    }

    #[test]
    fn disconnect_clears_registry() {
        let registry = registry_with(vec![zone("z1", "Kitchen", PlaybackState::Playing)]);
        registry.clear_disconnected();

        assert!(!registry.is_connected());
        assert!(registry.is_empty());
        assert_eq!(registry.now_playing(), NowPlayingStatus::Idle);
    }

    #[test]
    fn resolves_by_id_output_and_name() {
        let registry = registry_with(vec![
            zone("z1", "Living Room", PlaybackState::Stopped),
            zone("z2", "Office", PlaybackState::Stopped),
        ]);

        assert_eq!(registry.resolve(Some("z2")).unwrap().zone_id, "z2");
        assert_eq!(registry.resolve(Some("z1-out")).unwrap().zone_id, "z1");
        assert_eq!(registry.resolve(Some("living room")).unwrap().zone_id, "z1");
        assert_eq!(
            registry.resolve(Some("Garage")).unwrap_err(),
            SpindleError::ZoneNotFound("Garage".into())
        );
    }

    #[test]
    fn missing_reference_falls_back_to_first_zone() {
        let registry = registry_with(vec![
            zone("z2", "Office", PlaybackState::Stopped),
            zone("z1", "Kitchen", PlaybackState::Stopped),
        ]);
        assert_eq!(registry.resolve(None).unwrap().zone_id, "z1");
        assert_eq!(registry.resolve(Some("  ")).unwrap().zone_id, "z1");

        let empty = ZoneRegistry::new();
        assert!(matches!(
            empty.resolve(None),
            Err(SpindleError::ZoneNotFound(_))
        ));
    }

    #[test]
    fn nothing_playing_when_no_zone_is_playing() {
        let mut paused = playing_zone("z1", "Kitchen", [Some("Dreams"), None, None]);
        paused.state = PlaybackState::Paused;
        let registry = registry_with(vec![paused, zone("z2", "Office", PlaybackState::Stopped)]);

        assert_eq!(registry.now_playing(), NowPlayingStatus::Idle);
        assert_eq!(
            serde_json::to_value(registry.now_playing()).unwrap(),
            serde_json::json!({ "playing": false })
        );
    }

    #[test]
    fn missing_lines_degrade_to_unknown() {
        let registry = registry_with(vec![playing_zone(
            "z1",
            "Kitchen",
            [Some("Dreams"), Some("  "), None],
        )]);

        let NowPlayingStatus::Playing { now_playing, .. } = registry.now_playing() else {
            panic!("expected a playing zone");
        };
        assert_eq!(now_playing.title, "Dreams");
        assert_eq!(now_playing.artist, "Unknown");
        assert_eq!(now_playing.album, "Unknown");

        let json = serde_json::to_value(registry.now_playing()).unwrap();
        assert_eq!(json["playing"], true);
        assert_eq!(json["zoneName"], "Kitchen");
        assert_eq!(json["artist"], "Unknown");
        assert_eq!(json["seekPosition"], 12);
    }

    #[test]
    fn playing_zone_without_track_data_is_skipped() {
        let registry = registry_with(vec![
            zone("z1", "Attic", PlaybackState::Playing),
            playing_zone("z2", "Kitchen", [Some("Dreams"), Some("Fleetwood Mac"), Some("Rumours")]),
        ]);

        match registry.now_playing() {
            NowPlayingStatus::Playing { zone_id, .. } => assert_eq!(zone_id, "z2"),
            NowPlayingStatus::Idle => panic!("expected a playing zone"),
        }
    }

    #[test]
    fn seek_ticks_update_position() {
        let registry = registry_with(vec![playing_zone(
            "z1",
            "Kitchen",
            [Some("Dreams"), None, None],
        )]);
        registry.apply_seek("z1", 99);
        registry.apply_seek("ghost", 1);

        let zone = registry.get("z1").unwrap();
        assert_eq!(zone.now_playing.unwrap().seek_position, Some(99));
    }
}
