//! Direct transport operations: control verbs, seek, volume and artwork.
//!
//! These act on a single zone or output and never touch the browse cursor,
//! so they run concurrently with any traversal holding the browse lock.

use std::sync::Arc;

use serde::Serialize;

use crate::controller::{
    Control, Image, ImageOpts, ImageService, PlaybackState, SeekMode, TransportControl,
    VolumeChange, Zone,
};
use crate::error::{SpindleError, SpindleResult};
use crate::services::zone_registry::ZoneRegistry;

/// Result of a transport control request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlOutcome {
    pub success: bool,
    pub zone_id: String,
    pub control: Control,
    /// Zone state as last reported; push updates reflect the new state shortly after.
    pub state: PlaybackState,
}

/// Result of a volume request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeOutcome {
    pub success: bool,
    pub output_ids: Vec<String>,
}

/// Transport service over the controller.
pub struct PlaybackService {
    registry: Arc<ZoneRegistry>,
    transport: Arc<dyn TransportControl>,
    images: Arc<dyn ImageService>,
}

impl PlaybackService {
    pub fn new(
        registry: Arc<ZoneRegistry>,
        transport: Arc<dyn TransportControl>,
        images: Arc<dyn ImageService>,
    ) -> Self {
        Self {
            registry,
            transport,
            images,
        }
    }

    fn connected_zone(&self, zone_ref: Option<&str>) -> SpindleResult<Zone> {
        if !self.registry.is_connected() {
            return Err(SpindleError::NotConnected);
        }
        self.registry.resolve(zone_ref)
    }

    /// Sends a control verb (`play`, `pause`, `playpause`, `stop`, `previous`, `next`).
    ///
    /// # Errors
    ///
    /// Returns [`SpindleError::InvalidControl`] for an unknown verb, before the
    /// zone is resolved.
    pub async fn control(&self, zone_ref: Option<&str>, verb: &str) -> SpindleResult<ControlOutcome> {
        let control: Control = verb.parse()?;
        let zone = self.connected_zone(zone_ref)?;

        log::info!("[Playback] {} -> {}", zone.display_name, control);
        self.transport.control(&zone.zone_id, control).await?;

        let state = self
            .registry
            .get(&zone.zone_id)
            .map(|z| z.state)
            .unwrap_or(zone.state);
        Ok(ControlOutcome {
            success: true,
            zone_id: zone.zone_id,
            control,
            state,
        })
    }

    /// Seeks within the current track.
    pub async fn seek(
        &self,
        zone_ref: Option<&str>,
        mode: SeekMode,
        seconds: i64,
    ) -> SpindleResult<Zone> {
        let zone = self.connected_zone(zone_ref)?;
        if !zone.is_seek_allowed {
            return Err(SpindleError::InvalidRequest(format!(
                "seeking is not allowed in zone {}",
                zone.display_name
            )));
        }
        log::debug!("[Playback] Seek {} {:?} {}", zone.display_name, mode, seconds);
        self.transport.seek(&zone.zone_id, mode, seconds).await?;
        Ok(zone)
    }

    /// Changes volume on one output, or on every output of a zone.
    ///
    /// An output id targets just that output; any other reference is resolved
    /// as a zone and applies the change to all of its outputs.
    pub async fn change_volume(
        &self,
        reference: Option<&str>,
        mode: VolumeChange,
        value: i32,
    ) -> SpindleResult<VolumeOutcome> {
        let zone = self.connected_zone(reference)?;
        let output_ids: Vec<String> = match reference.map(str::trim) {
            Some(r) if zone.has_output(r) => vec![r.to_string()],
            _ => zone.outputs.iter().map(|o| o.output_id.clone()).collect(),
        };
        if output_ids.is_empty() {
            return Err(SpindleError::InvalidRequest(format!(
                "zone {} has no outputs",
                zone.display_name
            )));
        }

        for output_id in &output_ids {
            self.transport.change_volume(output_id, mode, value).await?;
        }
        log::debug!(
            "[Playback] Volume {:?} {} on {} output(s)",
            mode,
            value,
            output_ids.len()
        );
        Ok(VolumeOutcome {
            success: true,
            output_ids,
        })
    }

    /// Fetches artwork bytes for an image key.
    pub async fn image(&self, image_key: &str, opts: ImageOpts) -> SpindleResult<Image> {
        if image_key.trim().is_empty() {
            return Err(SpindleError::InvalidRequest("image key is empty".into()));
        }
        Ok(self.images.get_image(image_key, opts).await?)
    }
}
