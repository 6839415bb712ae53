// SPDX-License-Identifier: GPL-3.0-or-later

//! Request pacing for the Web API.
//!
//! At most one request is in flight per client (clones share the pacer), and
//! each request starts no earlier than `min_interval` after the previous one
//! finished. A 429 answer pushes the next start out to its `Retry-After`.

use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::{sleep_until, Duration, Instant};
use tracing::{debug, trace};

#[derive(Debug, Clone)]
pub struct RequestPacer {
    next_start: Arc<Mutex<Option<Instant>>>,
    min_interval: Duration,
}

impl RequestPacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            next_start: Arc::new(Mutex::new(None)),
            min_interval,
        }
    }

    /// Wait for the previous request to finish and for the pause after it.
    pub async fn acquire(&self) -> RequestSlot {
        let guard = Arc::clone(&self.next_start).lock_owned().await;

        if let Some(start) = *guard {
            let now = Instant::now();
            if start > now {
                trace!(target: "spotify", wait = ?(start - now), "pacing request");
                sleep_until(start).await;
            }
        }

        RequestSlot {
            guard,
            min_interval: self.min_interval,
            back_off: None,
        }
    }
}

/// Exclusive right to issue one request; dropping it schedules the next one.
pub struct RequestSlot {
    guard: OwnedMutexGuard<Option<Instant>>,
    min_interval: Duration,
    back_off: Option<Duration>,
}

impl RequestSlot {
    /// Delay the next request by at least `delay` from now.
    pub fn back_off(&mut self, delay: Duration) {
        debug!(target: "spotify", ?delay, "backing off");
        self.back_off = Some(self.back_off.map_or(delay, |current| current.max(delay)));
    }
}

impl Drop for RequestSlot {
    fn drop(&mut self) {
        let pause = self
            .back_off
            .map_or(self.min_interval, |delay| delay.max(self.min_interval));
        *self.guard = Some(Instant::now() + pause);
    }
}
