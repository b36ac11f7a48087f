//! Shared test fixtures: an in-memory controller with a single browse cursor.
//!
//! [`FakeController`] behaves like a real controller session: one cursor for
//! the whole client, item keys that are only valid at the level they were
//! loaded from, and actions that record a play. It also flags any two browse
//! or load calls that overlap in time, which is exactly what an unserialized
//! pair of traversals produces.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::traits::{BrowseService, ImageService, TransportControl, ZoneFeed};
use super::types::*;
use super::{ControllerError, ControllerResult};

/// Actions offered under every playable entry.
const ENTRY_ACTIONS: [&str; 4] = ["Play Now", "Add Next", "Queue", "Start Radio"];

/// A node in the fake browse tree.
#[derive(Debug, Clone)]
pub(crate) struct CatalogNode {
    pub title: String,
    pub kind: ItemKind,
    pub children: Vec<CatalogNode>,
}

pub(crate) fn list(title: &str, children: Vec<CatalogNode>) -> CatalogNode {
    CatalogNode {
        title: title.to_string(),
        kind: ItemKind::List,
        children,
    }
}

pub(crate) fn action(title: &str) -> CatalogNode {
    CatalogNode {
        title: title.to_string(),
        kind: ItemKind::Action,
        children: vec![],
    }
}

pub(crate) fn action_list(title: &str) -> CatalogNode {
    CatalogNode {
        title: title.to_string(),
        kind: ItemKind::ActionList,
        children: ENTRY_ACTIONS.iter().map(|a| action(a)).collect(),
    }
}

/// An album page: "Play Album" action list followed by its tracks.
pub(crate) fn album(title: &str, tracks: &[&str]) -> CatalogNode {
    let mut children = vec![action_list("Play Album")];
    children.extend(tracks.iter().map(|t| action_list(t)));
    list(title, children)
}

/// Root of a typical library: Library → {Artists, Albums, Tracks}.
pub(crate) fn library(
    artists: Vec<(&str, Vec<CatalogNode>)>,
    albums: Vec<CatalogNode>,
    tracks: &[&str],
) -> CatalogNode {
    let artists = artists
        .into_iter()
        .map(|(name, albums)| list(name, albums))
        .collect();
    list(
        "",
        vec![
            list(
                "Library",
                vec![
                    list("Artists", artists),
                    list("Albums", albums),
                    list("Tracks", tracks.iter().map(|t| action_list(t)).collect()),
                ],
            ),
            list("Playlists", vec![]),
            list("Settings", vec![]),
        ],
    )
}

#[derive(Debug)]
struct FlatNode {
    title: String,
    kind: ItemKind,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// A play (or other action) recorded by the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Triggered {
    pub zone: Option<String>,
    /// Titles from the first level below root down to the action itself.
    pub path: Vec<String>,
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// In-memory controller backed by a [`CatalogNode`] tree.
pub(crate) struct FakeController {
    nodes: Vec<FlatNode>,
    cursor: Mutex<Vec<usize>>,
    zone: Mutex<Option<String>>,
    latency: Duration,
    stall_on: Option<String>,
    in_flight: AtomicUsize,
    overlaps: AtomicUsize,
    root_resets: AtomicUsize,
    browse_calls: Mutex<Vec<Option<String>>>,
    triggered: Mutex<Vec<Triggered>>,
    controls: Mutex<Vec<(String, Control)>>,
    seeks: Mutex<Vec<(String, SeekMode, i64)>>,
    volumes: Mutex<Vec<(String, VolumeChange, i32)>>,
    zone_tx: Mutex<Option<mpsc::UnboundedSender<ZoneEvent>>>,
}

impl FakeController {
    pub fn new(root: CatalogNode) -> Self {
        let mut nodes = Vec::new();
        flatten(&root, None, &mut nodes);
        Self {
            nodes,
            cursor: Mutex::new(vec![0]),
            zone: Mutex::new(None),
            latency: Duration::from_millis(2),
            stall_on: None,
            in_flight: AtomicUsize::new(0),
            overlaps: AtomicUsize::new(0),
            root_resets: AtomicUsize::new(0),
            browse_calls: Mutex::new(Vec::new()),
            triggered: Mutex::new(Vec::new()),
            controls: Mutex::new(Vec::new()),
            seeks: Mutex::new(Vec::new()),
            volumes: Mutex::new(Vec::new()),
            zone_tx: Mutex::new(None),
        }
    }

    /// Simulated round-trip time for every browse/load call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Browsing into an entry with this title never answers.
    pub fn stalling_on(mut self, title: &str) -> Self {
        self.stall_on = Some(title.to_string());
        self
    }

    /// Number of times two browse/load calls overlapped.
    pub fn overlaps(&self) -> usize {
        self.overlaps.load(Ordering::SeqCst)
    }

    /// Number of root resets (one per navigation attempt).
    pub fn root_resets(&self) -> usize {
        self.root_resets.load(Ordering::SeqCst)
    }

    /// Titles of the entries browsed into, `None` for root resets.
    pub fn browse_calls(&self) -> Vec<Option<String>> {
        self.browse_calls.lock().clone()
    }

    pub fn triggered(&self) -> Vec<Triggered> {
        self.triggered.lock().clone()
    }

    pub fn controls(&self) -> Vec<(String, Control)> {
        self.controls.lock().clone()
    }

    pub fn seeks(&self) -> Vec<(String, SeekMode, i64)> {
        self.seeks.lock().clone()
    }

    pub fn volumes(&self) -> Vec<(String, VolumeChange, i32)> {
        self.volumes.lock().clone()
    }

    /// Pushes a zone event to the current subscriber, if any.
    pub fn push_zone_event(&self, event: ZoneEvent) {
        if let Some(tx) = self.zone_tx.lock().as_ref() {
            let _ = tx.send(event);
        }
    }

    fn key_of(idx: usize) -> String {
        format!("node-{}", idx)
    }

    fn list_header(&self, idx: usize, level: usize) -> BrowseList {
        let node = &self.nodes[idx];
        BrowseList {
            title: node.title.clone(),
            count: node.children.len(),
            level: level as u32,
            subtitle: None,
            hint: (node.kind == ItemKind::ActionList).then_some(ItemKind::ActionList),
        }
    }

    fn path_titles(&self, idx: usize) -> Vec<String> {
        let mut titles = Vec::new();
        let mut current = Some(idx);
        while let Some(i) = current {
            let node = &self.nodes[i];
            if node.parent.is_some() {
                titles.push(node.title.clone());
            }
            current = node.parent;
        }
        titles.reverse();
        titles
    }

    fn enter(&self) -> (InFlight<'_>, bool) {
        let previous = self.in_flight.fetch_add(1, Ordering::SeqCst);
        let guard = InFlight(&self.in_flight);
        if previous > 0 {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
            return (guard, false);
        }
        (guard, true)
    }
}

fn flatten(node: &CatalogNode, parent: Option<usize>, nodes: &mut Vec<FlatNode>) -> usize {
    let idx = nodes.len();
    nodes.push(FlatNode {
        title: node.title.clone(),
        kind: node.kind,
        parent,
        children: Vec::new(),
    });
    for child in &node.children {
        let child_idx = flatten(child, Some(idx), nodes);
        nodes[idx].children.push(child_idx);
    }
    idx
}

impl ZoneFeed for FakeController {
    fn subscribe_zones(&self) -> mpsc::UnboundedReceiver<ZoneEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.zone_tx.lock() = Some(tx);
        rx
    }
}

#[async_trait]
impl BrowseService for FakeController {
    async fn browse(&self, opts: BrowseOpts) -> ControllerResult<BrowseResult> {
        let (_guard, exclusive) = self.enter();
        if !exclusive {
            return Err(ControllerError::Remote(
                "concurrent browse session on a single cursor".into(),
            ));
        }

        if opts.pop_all {
            tokio::time::sleep(self.latency).await;
            self.root_resets.fetch_add(1, Ordering::SeqCst);
            self.browse_calls.lock().push(None);
            *self.zone.lock() = opts.zone_or_output_id.clone();
            *self.cursor.lock() = vec![0];
            return Ok(BrowseResult::list(self.list_header(0, 0)));
        }

        let idx = opts
            .item_key
            .as_deref()
            .and_then(|k| k.strip_prefix("node-"))
            .and_then(|k| k.parse::<usize>().ok())
            .filter(|i| *i < self.nodes.len())
            .ok_or_else(|| ControllerError::Remote("unknown item key".into()))?;
        let node = &self.nodes[idx];
        self.browse_calls.lock().push(Some(node.title.clone()));

        if self.stall_on.as_deref() == Some(node.title.as_str()) {
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(self.latency).await;

        let top = self.cursor.lock().last().copied().unwrap_or(0);
        if node.parent != Some(top) {
            return Err(ControllerError::Remote(format!(
                "item key {} is not valid at the current level",
                Self::key_of(idx)
            )));
        }

        // Lists open a level even when empty; anything else is an action.
        if !matches!(node.kind, ItemKind::List | ItemKind::ActionList) {
            self.triggered.lock().push(Triggered {
                zone: self.zone.lock().clone(),
                path: self.path_titles(idx),
            });
            return Ok(BrowseResult::none());
        }

        let mut cursor = self.cursor.lock();
        cursor.push(idx);
        Ok(BrowseResult::list(self.list_header(idx, cursor.len() - 1)))
    }

    async fn load(&self, opts: LoadOpts) -> ControllerResult<LoadResult> {
        let (_guard, exclusive) = self.enter();
        if !exclusive {
            return Err(ControllerError::Remote(
                "concurrent browse session on a single cursor".into(),
            ));
        }
        tokio::time::sleep(self.latency).await;

        let (top, level) = {
            let cursor = self.cursor.lock();
            (cursor.last().copied().unwrap_or(0), cursor.len() - 1)
        };
        let children = &self.nodes[top].children;
        let items = children
            .iter()
            .skip(opts.offset)
            .take(opts.count)
            .map(|&child| {
                let node = &self.nodes[child];
                BrowseItem {
                    title: node.title.clone(),
                    subtitle: None,
                    item_key: Some(Self::key_of(child)),
                    kind: node.kind,
                }
            })
            .collect();

        Ok(LoadResult {
            items,
            offset: opts.offset,
            list: self.list_header(top, level),
        })
    }
}

#[async_trait]
impl TransportControl for FakeController {
    async fn control(&self, zone_or_output_id: &str, control: Control) -> ControllerResult<()> {
        self.controls
            .lock()
            .push((zone_or_output_id.to_string(), control));
        Ok(())
    }

    async fn seek(
        &self,
        zone_or_output_id: &str,
        how: SeekMode,
        seconds: i64,
    ) -> ControllerResult<()> {
        self.seeks
            .lock()
            .push((zone_or_output_id.to_string(), how, seconds));
        Ok(())
    }

    async fn change_volume(
        &self,
        output_id: &str,
        how: VolumeChange,
        value: i32,
    ) -> ControllerResult<()> {
        self.volumes.lock().push((output_id.to_string(), how, value));
        Ok(())
    }
}

#[async_trait]
impl ImageService for FakeController {
    async fn get_image(&self, image_key: &str, _opts: ImageOpts) -> ControllerResult<Image> {
        if image_key == "missing" {
            return Err(ControllerError::Remote("NotFound".into()));
        }
        Ok(Image {
            content_type: "image/png".into(),
            data: Bytes::from(format!("image:{}", image_key)),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Zone Builders
// ─────────────────────────────────────────────────────────────────────────────

/// A zone with a single output named after it.
pub(crate) fn zone(id: &str, name: &str, state: PlaybackState) -> Zone {
    Zone {
        zone_id: id.to_string(),
        display_name: name.to_string(),
        state,
        outputs: vec![Output {
            output_id: format!("{}-out", id),
            display_name: name.to_string(),
        }],
        now_playing: None,
        is_play_allowed: true,
        is_pause_allowed: true,
        is_seek_allowed: true,
        is_next_allowed: true,
        is_previous_allowed: true,
    }
}

/// A zone currently playing the given track.
pub(crate) fn playing_zone(id: &str, name: &str, lines: [Option<&str>; 3]) -> Zone {
    let mut zone = zone(id, name, PlaybackState::Playing);
    zone.now_playing = Some(NowPlayingInfo {
        three_line: DisplayLines {
            line1: lines[0].map(String::from),
            line2: lines[1].map(String::from),
            line3: lines[2].map(String::from),
        },
        length: Some(245),
        seek_position: Some(12),
        image_key: Some("img-1".into()),
    });
    zone
}
