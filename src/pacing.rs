//! Page quota and request pacing for the search API.
//!
//! The noncommercial terms allow a fixed number of calls per second and per
//! day. [`capped_pages`] enforces the per-run quota; [`Pacer`] holds requests
//! back at every multiple of the per-second cap until one second has passed
//! since its epoch, re-checking the clock every `poll_interval` rather than
//! sleeping for a fixed duration.
//!
//! With [`PacingMode::FixedEpoch`] the epoch is the start of the run and is
//! never moved, so only the first checkpoint inside the first second can ever
//! wait. [`PacingMode::Rolling`] moves the epoch forward after each
//! checkpoint.

use crate::config::{PacingMode, RateLimitConfig};
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// Length of the rate-limit window.
pub const WINDOW: Duration = Duration::from_secs(1);

/// Clamp a requested page count to the per-run quota.
pub fn capped_pages(requested: u32, max_pages_per_run: u32) -> u32 {
    requested.min(max_pages_per_run)
}

/// Blocks search requests to stay inside the per-second cap.
#[derive(Debug)]
pub struct Pacer {
    requests_per_second: u32,
    poll_interval: Duration,
    mode: PacingMode,
    epoch: Instant,
}

impl Pacer {
    /// Start pacing now.
    pub fn start(config: &RateLimitConfig) -> Self {
        Self {
            // A zero cap is rejected by config validation; treat it as 1 here
            // so the modulo below stays defined.
            requests_per_second: config.requests_per_second.max(1),
            poll_interval: config.poll_interval(),
            mode: config.mode,
            epoch: Instant::now(),
        }
    }

    /// Whether request `index` sits on a checkpoint.
    pub fn is_checkpoint(&self, index: u32) -> bool {
        index > 0 && index % self.requests_per_second == 0
    }

    /// Wait, if needed, before issuing request `index`. Returns the time spent
    /// waiting.
    pub async fn pace(&mut self, index: u32) -> Duration {
        if !self.is_checkpoint(index) {
            return Duration::ZERO;
        }

        let mut waited = Duration::ZERO;
        if self.epoch.elapsed() < WINDOW {
            let waited_from = Instant::now();
            while self.epoch.elapsed() < WINDOW {
                sleep(self.poll_interval).await;
            }
            waited = waited_from.elapsed();
        }

        if self.mode == PacingMode::Rolling {
            self.epoch = Instant::now();
        }
        debug!(index, waited_ms = waited.as_millis() as u64, mode = ?self.mode, "Pacing checkpoint");
        waited
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(mode: PacingMode) -> RateLimitConfig {
        RateLimitConfig {
            max_pages_per_run: 100,
            requests_per_second: 5,
            poll_interval_ms: 100,
            mode,
        }
    }

    async fn issue(pacer: &mut Pacer, indices: std::ops::Range<u32>) {
        for index in indices {
            pacer.pace(index).await;
        }
    }

    #[test]
    fn test_capped_pages() {
        assert_eq!(capped_pages(500, 100), 100);
        assert_eq!(capped_pages(3, 100), 3);
        assert_eq!(capped_pages(0, 100), 0);
    }

    #[test]
    fn test_checkpoints_are_nonzero_multiples() {
        let pacer = Pacer {
            requests_per_second: 5,
            poll_interval: Duration::from_millis(100),
            mode: PacingMode::FixedEpoch,
            epoch: Instant::now(),
        };
        let checkpoints: Vec<u32> = (0..16).filter(|i| pacer.is_checkpoint(*i)).collect();
        assert_eq!(checkpoints, vec![5, 10, 15]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_five_requests_never_wait() {
        let start = Instant::now();
        let mut pacer = Pacer::start(&config(PacingMode::FixedEpoch));
        issue(&mut pacer, 0..5).await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_eleven_requests_wait_at_sixth() {
        let start = Instant::now();
        let mut pacer = Pacer::start(&config(PacingMode::FixedEpoch));
        for index in 0..5 {
            assert_eq!(pacer.pace(index).await, Duration::ZERO);
        }
        let waited = pacer.pace(5).await;
        assert!(waited >= Duration::from_millis(900));
        issue(&mut pacer, 6..11).await;
        assert!(start.elapsed() >= WINDOW);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_epoch_does_not_wait_twice() {
        let mut pacer = Pacer::start(&config(PacingMode::FixedEpoch));
        issue(&mut pacer, 0..10).await;
        assert_eq!(pacer.pace(10).await, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rolling_waits_at_every_checkpoint() {
        let start = Instant::now();
        let mut pacer = Pacer::start(&config(PacingMode::Rolling));
        issue(&mut pacer, 0..10).await;
        assert!(pacer.pace(10).await >= Duration::from_millis(900));
        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_checkpoint_does_not_wait() {
        let mut pacer = Pacer::start(&config(PacingMode::FixedEpoch));
        sleep(Duration::from_secs(2)).await;
        assert_eq!(pacer.pace(5).await, Duration::ZERO);
    }
}
