//! Process-wide FIFO lock around whole browse traversals.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Mutex, MutexGuard};

/// Serializes browse traversals against the controller's single cursor.
///
/// Backed by [`tokio::sync::Mutex`], which hands the lock to waiters in the
/// order they called `lock()`. Release happens when the guard drops, so an
/// error, a panic or a cancelled future all free the slot for the next caller.
#[derive(Default)]
pub struct BrowseSerializer {
    slot: Mutex<()>,
    waiting: AtomicUsize,
}

/// Exclusive access to the browse cursor, released on drop.
pub struct BrowseGuard<'a> {
    _guard: MutexGuard<'a, ()>,
}

struct WaitingCount<'a>(&'a AtomicUsize);

impl Drop for WaitingCount<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl BrowseSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of callers currently queued for the lock.
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    /// Waits for the lock in FIFO order.
    pub async fn acquire(&self) -> BrowseGuard<'_> {
        let ahead = self.waiting.fetch_add(1, Ordering::SeqCst);
        let _waiting = WaitingCount(&self.waiting);
        if ahead > 0 {
            log::debug!("[BrowseSerializer] Queued behind {} traversal(s)", ahead);
        }
        let guard = self.slot.lock().await;
        BrowseGuard { _guard: guard }
    }

    /// Runs `fut` while holding the lock.
    pub async fn with_lock<F, T>(&self, fut: F) -> T
    where
        F: Future<Output = T>,
    {
        let _guard = self.acquire().await;
        fut.await
    }
}
