//! Synthetic upload progress
//!
//! The analysis endpoint reports nothing while it works, so progress is
//! time-based: a fixed step every interval, capped below 100 until the
//! response arrives. Observers read the current percentage from a
//! `tokio::sync::watch` channel.

use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Progress ticker settings
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressConfig {
    /// Percentage added per tick
    #[serde(default = "default_step")]
    pub step: u8,

    /// Highest value reached before the response arrives
    #[serde(default = "default_cap")]
    pub cap: u8,

    /// Time between ticks
    #[serde(default = "default_interval")]
    pub interval_ms: u64,
}

fn default_step() -> u8 {
    10
}

fn default_cap() -> u8 {
    90
}

fn default_interval() -> u64 {
    500
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            step: default_step(),
            cap: default_cap(),
            interval_ms: default_interval(),
        }
    }
}

/// Next progress value after one tick
pub fn next_progress(current: u8, step: u8, cap: u8) -> u8 {
    if current >= cap {
        cap
    } else {
        current.saturating_add(step).min(cap)
    }
}

/// Drives a progress channel while a request is in flight
pub struct ProgressTicker {
    tx: Arc<watch::Sender<u8>>,
    handle: JoinHandle<()>,
}

impl ProgressTicker {
    /// Reset the channel to 0 and start ticking
    pub fn start(tx: Arc<watch::Sender<u8>>, config: &ProgressConfig) -> Self {
        tx.send_replace(0);

        let task_tx = Arc::clone(&tx);
        let step = config.step;
        let cap = config.cap.min(100);
        let period = Duration::from_millis(config.interval_ms.max(1));

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // First tick completes immediately
            interval.tick().await;

            loop {
                interval.tick().await;
                let current = *task_tx.borrow();
                let next = next_progress(current, step, cap);
                task_tx.send_replace(next);
                if next >= cap {
                    break;
                }
            }
        });

        Self { tx, handle }
    }

    /// Stop ticking and snap to 100
    pub fn complete(self) -> ProgressDone {
        self.handle.abort();
        self.tx.send_replace(100);
        ProgressDone {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Progress after the response has resolved, waiting to be reset
pub struct ProgressDone {
    tx: Arc<watch::Sender<u8>>,
}

impl ProgressDone {
    /// Return the indicator to 0
    pub fn reset(self) {
        self.tx.send_replace(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_progress() {
        assert_eq!(next_progress(0, 10, 90), 10);
        assert_eq!(next_progress(80, 10, 90), 90);
        assert_eq!(next_progress(90, 10, 90), 90);
        assert_eq!(next_progress(85, 10, 90), 90);
        assert_eq!(next_progress(250, 10, 255), 255);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_up_to_cap() {
        let (tx, rx) = watch::channel(0u8);
        let tx = Arc::new(tx);
        let ticker = ProgressTicker::start(Arc::clone(&tx), &ProgressConfig::default());

        tokio::time::sleep(Duration::from_millis(1_250)).await;
        assert_eq!(*rx.borrow(), 20);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(*rx.borrow(), 90);

        let done = ticker.complete();
        assert_eq!(*rx.borrow(), 100);

        done.reset();
        assert_eq!(*rx.borrow(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_complete_stops_ticking() {
        let (tx, rx) = watch::channel(0u8);
        let tx = Arc::new(tx);
        let ticker = ProgressTicker::start(Arc::clone(&tx), &ProgressConfig::default());

        tokio::time::sleep(Duration::from_millis(750)).await;
        assert_eq!(*rx.borrow(), 10);

        let done = ticker.complete();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(*rx.borrow(), 100);
        done.reset();
    }
}
