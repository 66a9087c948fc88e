//! One-shot countdown clock backing the round timer.
//!
//! `start` spawns a Tokio task that sleeps for the requested duration and
//! then invokes the fire callback; `stop` cancels the pending task through a
//! oneshot channel. Each arming bumps a generation number which is handed to
//! the callback, so the owner can discard a fire from a superseded arming
//! that slipped past the cancellation.

use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, trace};

#[derive(Debug, Default)]
pub(crate) struct RoundClock {
    cancel: Option<oneshot::Sender<()>>,
    generation: u64,
}

impl RoundClock {
    /// Arms the clock. Any previously armed countdown is cancelled first.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start<F>(&mut self, duration: Duration, on_fire: F)
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.stop();
        self.generation += 1;
        let generation = self.generation;
        let (cancel_tx, mut cancel_rx) = oneshot::channel();
        self.cancel = Some(cancel_tx);
        trace!(generation, ?duration, "arming round clock");
        tokio::spawn(async move {
            tokio::select! {
                _ = &mut cancel_rx => {
                    trace!(generation, "round clock cancelled");
                }
                _ = tokio::time::sleep(duration) => {
                    debug!(generation, "round clock fired");
                    on_fire(generation);
                }
            }
        });
    }

    /// Cancels the pending countdown, if any.
    pub fn stop(&mut self) {
        if let Some(cancel_tx) = self.cancel.take() {
            let _ = cancel_tx.send(());
        }
    }

    /// Generation of the most recent arming. A fire carrying an older
    /// generation is stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn fires_after_the_duration() {
        let fired = Arc::new(AtomicU64::new(0));
        let fired_clone = fired.clone();

        let mut clock = RoundClock::default();
        clock.start(Duration::from_secs(5), move |generation| {
            fired_clone.store(generation, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_prevents_the_fire() {
        let fired = Arc::new(AtomicU64::new(0));
        let fired_clone = fired.clone();

        let mut clock = RoundClock::default();
        clock.start(Duration::from_secs(5), move |generation| {
            fired_clone.store(generation, Ordering::SeqCst);
        });
        clock.stop();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_bumps_the_generation() {
        let fired = Arc::new(AtomicU64::new(0));

        let mut clock = RoundClock::default();
        let fired_clone = fired.clone();
        clock.start(Duration::from_secs(5), move |generation| {
            fired_clone.store(generation, Ordering::SeqCst);
        });
        assert_eq!(clock.generation(), 1);

        // Re-arm before the first countdown elapses.
        let fired_clone = fired.clone();
        clock.start(Duration::from_secs(3), move |generation| {
            fired_clone.store(generation, Ordering::SeqCst);
        });
        assert_eq!(clock.generation(), 2);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }
}
