//! Fixed-delay reconnection scheduling.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;

#[derive(Debug, Default)]
struct PendingSlot {
    /// Bumped on every schedule/cancel; a timer only fires if it still
    /// owns the current generation.
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

/// Schedules a single reconnection attempt after a fixed delay.
///
/// At most one attempt is pending at any time: scheduling again aborts the
/// previous timer. Once a timer fires it detaches itself from the slot, so
/// an attempt that fails and schedules the next retry does not abort
/// itself.
#[derive(Debug)]
pub struct ReconnectScheduler {
    delay: Duration,
    slot: Arc<Mutex<PendingSlot>>,
    scheduled: AtomicU64,
}

impl ReconnectScheduler {
    /// Create a scheduler with the given retry delay
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            slot: Arc::new(Mutex::new(PendingSlot::default())),
            scheduled: AtomicU64::new(0),
        }
    }

    /// Retry delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `attempt` after the delay, replacing any pending attempt.
    pub fn schedule<F, Fut>(&self, attempt: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let count = self.scheduled.fetch_add(1, Ordering::SeqCst) + 1;
        let delay = self.delay;
        let shared = Arc::clone(&self.slot);

        let mut slot = lock(&self.slot);
        if let Some(previous) = slot.handle.take() {
            previous.abort();
        }
        slot.generation = slot.generation.wrapping_add(1);
        let generation = slot.generation;

        tracing::info!(
            attempt = count,
            delay_ms = delay.as_millis() as u64,
            "Scheduling reconnection attempt"
        );

        slot.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut slot = lock(&shared);
                if slot.generation != generation {
                    return;
                }
                slot.handle = None;
            }
            attempt().await;
        }));
    }

    /// Abort the pending attempt. Returns `true` if one was pending.
    pub fn cancel(&self) -> bool {
        let mut slot = lock(&self.slot);
        slot.generation = slot.generation.wrapping_add(1);
        match slot.handle.take() {
            Some(handle) => {
                let pending = !handle.is_finished();
                handle.abort();
                if pending {
                    tracing::debug!("Pending reconnection attempt cancelled");
                }
                pending
            }
            None => false,
        }
    }

    /// Whether an attempt is waiting for its timer.
    pub fn is_pending(&self) -> bool {
        lock(&self.slot)
            .handle
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Total number of attempts scheduled so far.
    pub fn scheduled_count(&self) -> u64 {
        self.scheduled.load(Ordering::SeqCst)
    }
}

impl Drop for ReconnectScheduler {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.slot).handle.take() {
            handle.abort();
        }
    }
}

fn lock(slot: &Mutex<PendingSlot>) -> MutexGuard<'_, PendingSlot> {
    slot.lock().unwrap_or_else(|e| e.into_inner())
}
