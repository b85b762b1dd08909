//! Received-datagram rate, averaged over short windows.

use std::time::{Duration, Instant};

pub const RATE_WINDOW: Duration = Duration::from_millis(500);

/// Counts arrivals and publishes a new rate once per window. The reported
/// rate holds still between windows so displays don't flicker.
#[derive(Debug, Clone)]
pub struct RateMeter {
    window: Duration,
    window_start: Option<Instant>,
    count: u32,
    hz: f64,
}

impl Default for RateMeter {
    fn default() -> Self {
        Self::new(RATE_WINDOW)
    }
}

impl RateMeter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            window_start: None,
            count: 0,
            hz: 0.0,
        }
    }

    pub fn hz(&self) -> f64 {
        self.hz
    }

    pub fn tick(&mut self, now: Instant) {
        let Some(start) = self.window_start else {
            // the first arrival only opens the window
            self.window_start = Some(now);
            return;
        };
        self.count += 1;
        let elapsed = now.saturating_duration_since(start);
        if elapsed >= self.window {
            self.hz = f64::from(self.count) / elapsed.as_secs_f64();
            self.count = 0;
            self.window_start = Some(now);
        }
    }
}
