//! Adapter from a callback-style controller client to the async traits.
//!
//! Controller client libraries typically expose every request as
//! `method(args, callback)`. [`CallbackController`] parks each request on a
//! oneshot channel, bounds it with the transport timeout, and turns the
//! outcome into a [`ControllerResult`]. Zone push callbacks are forwarded into
//! an unbounded channel so the registry's update loop never blocks the client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use super::traits::{BrowseService, ImageService, TransportControl, ZoneFeed};
use super::types::{
    BrowseOpts, BrowseResult, Control, Image, ImageOpts, LoadOpts, LoadResult, SeekMode,
    VolumeChange, ZoneEvent,
};
use super::{ControllerError, ControllerResult};

/// Completion callback for a single request.
pub type Callback<T> = Box<dyn FnOnce(ControllerResult<T>) + Send + 'static>;

/// Callback invoked for every zone push update.
pub type ZoneCallback = Arc<dyn Fn(ZoneEvent) + Send + Sync + 'static>;

/// A controller client with a callback-based API.
///
/// Implementations must invoke each request callback at most once. Dropping a
/// callback without calling it is reported as [`ControllerError::Cancelled`].
pub trait RawController: Send + Sync {
    fn subscribe_zones(&self, on_event: ZoneCallback);
    fn browse(&self, opts: BrowseOpts, cb: Callback<BrowseResult>);
    fn load(&self, opts: LoadOpts, cb: Callback<LoadResult>);
    fn control(&self, zone_or_output_id: &str, control: Control, cb: Callback<()>);
    fn seek(&self, zone_or_output_id: &str, how: SeekMode, seconds: i64, cb: Callback<()>);
    fn change_volume(&self, output_id: &str, how: VolumeChange, value: i32, cb: Callback<()>);
    fn get_image(&self, image_key: &str, opts: ImageOpts, cb: Callback<Image>);
}

/// Async facade over a [`RawController`].
pub struct CallbackController<R> {
    raw: R,
    call_timeout: Duration,
}

impl<R: RawController> CallbackController<R> {
    /// Wraps `raw`, bounding every request by `call_timeout`.
    pub fn new(raw: R, call_timeout: Duration) -> Self {
        Self { raw, call_timeout }
    }

    /// Returns the wrapped client.
    pub fn inner(&self) -> &R {
        &self.raw
    }

    async fn call<T, F>(&self, operation: &'static str, start: F) -> ControllerResult<T>
    where
        T: Send + 'static,
        F: FnOnce(Callback<T>),
    {
        let (tx, rx) = oneshot::channel();
        start(Box::new(move |result| {
            // Receiver is gone if the caller timed out; nothing to deliver.
            let _ = tx.send(result);
        }));

        match tokio::time::timeout(self.call_timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(ControllerError::Cancelled { operation }),
            Err(_) => {
                log::warn!(
                    "[Controller] {} got no answer within {}ms",
                    operation,
                    self.call_timeout.as_millis()
                );
                Err(ControllerError::Timeout {
                    operation,
                    after: self.call_timeout,
                })
            }
        }
    }
}

impl<R: RawController> ZoneFeed for CallbackController<R> {
    fn subscribe_zones(&self) -> mpsc::UnboundedReceiver<ZoneEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.raw.subscribe_zones(Arc::new(move |event| {
            if tx.send(event).is_err() {
                log::debug!("[Controller] Zone event dropped, subscriber gone");
            }
        }));
        rx
    }
}

#[async_trait]
impl<R: RawController> BrowseService for CallbackController<R> {
    async fn browse(&self, opts: BrowseOpts) -> ControllerResult<BrowseResult> {
        self.call("browse", |cb| self.raw.browse(opts, cb)).await
    }

    async fn load(&self, opts: LoadOpts) -> ControllerResult<LoadResult> {
        self.call("load", |cb| self.raw.load(opts, cb)).await
    }
}

#[async_trait]
impl<R: RawController> TransportControl for CallbackController<R> {
    async fn control(&self, zone_or_output_id: &str, control: Control) -> ControllerResult<()> {
        self.call("control", |cb| self.raw.control(zone_or_output_id, control, cb))
            .await
    }

    async fn seek(
        &self,
        zone_or_output_id: &str,
        how: SeekMode,
        seconds: i64,
    ) -> ControllerResult<()> {
        self.call("seek", |cb| self.raw.seek(zone_or_output_id, how, seconds, cb))
            .await
    }

    async fn change_volume(
        &self,
        output_id: &str,
        how: VolumeChange,
        value: i32,
    ) -> ControllerResult<()> {
        self.call("change_volume", |cb| {
            self.raw.change_volume(output_id, how, value, cb)
        })
        .await
    }
}

#[async_trait]
impl<R: RawController> ImageService for CallbackController<R> {
    async fn get_image(&self, image_key: &str, opts: ImageOpts) -> ControllerResult<Image> {
        self.call("get_image", |cb| self.raw.get_image(image_key, opts, cb))
            .await
    }
}
