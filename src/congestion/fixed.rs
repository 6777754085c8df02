//! A window that never moves. Stop-and-wait uses a window of one; the burst
//! sender uses an unbounded one.

use crate::congestion::CongestionControl;

#[derive(Debug, Clone, Copy)]
pub struct FixedWindow {
    window: Option<u32>,
}

impl FixedWindow {
    pub fn new(window: u32) -> Self {
        Self {
            window: Some(window.max(1)),
        }
    }

    /// A window that admits every segment.
    pub fn unbounded() -> Self {
        Self { window: None }
    }
}

impl CongestionControl for FixedWindow {
    fn on_ack(&mut self) {}

    fn on_timeout(&mut self) {}

    fn congestion_window(&self) -> f64 {
        self.window.map_or(f64::INFINITY, f64::from)
    }

    fn slow_start_threshold(&self) -> u32 {
        self.window.unwrap_or(u32::MAX)
    }

    fn admit_more(&self, outstanding: usize) -> bool {
        match self.window {
            Some(window) => outstanding < window as usize,
            None => true,
        }
    }
}
