//! A loss-driven controller: slow start, congestion avoidance, and a reset to
//! one segment on timeout.
//!
//! 基于丢包的拥塞控制：慢启动、拥塞避免，超时后窗口重置为一个数据段。

use crate::congestion::CongestionControl;
use tracing::{debug, trace};

/// The phase of the congestion controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    SlowStart,
    CongestionAvoidance,
}

#[derive(Debug)]
pub struct Tahoe {
    pub(super) congestion_window: f64,

    pub(super) slow_start_threshold: u32,
}

impl Tahoe {
    /// Starts in slow start with a window of one segment.
    pub fn new(initial_ssthresh: u32) -> Self {
        Self {
            congestion_window: 1.0,
            slow_start_threshold: initial_ssthresh.max(1),
        }
    }

    pub fn phase(&self) -> Phase {
        if self.congestion_window < f64::from(self.slow_start_threshold) {
            Phase::SlowStart
        } else {
            Phase::CongestionAvoidance
        }
    }
}

impl CongestionControl for Tahoe {
    fn on_ack(&mut self) {
        match self.phase() {
            Phase::SlowStart => {
                self.congestion_window += 1.0;
                trace!(cwnd = self.congestion_window, "Slow Start: cwnd increased");
            }
            Phase::CongestionAvoidance => {
                // One segment per window's worth of ACKs.
                self.congestion_window += 1.0 / self.congestion_window;
                trace!(
                    cwnd = self.congestion_window,
                    "Congestion Avoidance: cwnd increased"
                );
            }
        }
    }

    fn on_timeout(&mut self) {
        self.slow_start_threshold = ((self.congestion_window / 2.0).floor() as u32).max(1);
        self.congestion_window = 1.0;
        debug!(
            ssthresh = self.slow_start_threshold,
            "Timeout! cwnd reset to 1"
        );
    }

    fn congestion_window(&self) -> f64 {
        self.congestion_window
    }

    fn slow_start_threshold(&self) -> u32 {
        self.slow_start_threshold
    }
}
