//! Animated balance counter.
//!
//! The displayed balance moves linearly from its old value to its new value
//! over a fixed duration. Starting a new animation cancels the running one;
//! the new animation starts from whatever value was on screen at that moment.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, trace};

/// Time between frames, roughly 60 per second
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Value displayed `elapsed` into an animation from `start` to `end`
pub fn frame_value(start: f64, end: f64, elapsed: Duration, duration: Duration) -> i64 {
    let progress = if duration.is_zero() {
        1.0
    } else {
        (elapsed.as_secs_f64() / duration.as_secs_f64()).min(1.0)
    };
    (start + (end - start) * progress).round() as i64
}

/// Cooperative cancellation flag shared between an animation and its owner
#[derive(Debug, Clone)]
pub struct CancelToken {
    sender: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Resolves once `cancel` has been called
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        // The sender lives in self, so the channel cannot close while we wait
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

pub struct CounterAnimator {
    duration: Duration,
    display: Arc<watch::Sender<i64>>,
    current: Option<(CancelToken, JoinHandle<()>)>,
}

impl CounterAnimator {
    pub fn new(initial: f64, duration: Duration) -> Self {
        let (display, _) = watch::channel(initial.round() as i64);
        Self {
            duration,
            display: Arc::new(display),
            current: None,
        }
    }

    /// Receive every displayed frame
    pub fn subscribe(&self) -> watch::Receiver<i64> {
        self.display.subscribe()
    }

    /// Value currently on screen
    pub fn displayed(&self) -> i64 {
        *self.display.borrow()
    }

    pub fn is_animating(&self) -> bool {
        self.current
            .as_ref()
            .map(|(_, handle)| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Animate towards `to`. If another animation is still running it is
    /// cancelled and the new one starts from the value on screen instead of
    /// `from`.
    pub fn animate(&mut self, from: f64, to: f64) {
        let start = match self.current.take() {
            Some((token, handle)) if !handle.is_finished() => {
                token.cancel();
                let on_screen = self.displayed() as f64;
                debug!("Interrupted running animation at {}", on_screen);
                on_screen
            }
            _ => from,
        };

        let token = CancelToken::new();
        let task_token = token.clone();
        let display = Arc::clone(&self.display);
        let duration = self.duration;

        let handle = tokio::spawn(async move {
            let started = Instant::now();
            let mut ticker = time::interval(FRAME_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = task_token.cancelled() => {
                        trace!("Animation cancelled");
                        return;
                    }
                    _ = ticker.tick() => {
                        if task_token.is_cancelled() {
                            return;
                        }
                        let elapsed = started.elapsed();
                        display.send_replace(frame_value(start, to, elapsed, duration));
                        if elapsed >= duration {
                            return;
                        }
                    }
                }
            }
        });

        self.current = Some((token, handle));
    }

    /// Wait for the running animation, if any, to reach its final frame
    pub async fn wait(&mut self) {
        if let Some((_, handle)) = self.current.take() {
            if let Err(e) = handle.await {
                debug!("Animation task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for CounterAnimator {
    fn drop(&mut self) {
        if let Some((token, _)) = self.current.take() {
            token.cancel();
        }
    }
}
