//! Defines the pluggable congestion control interface.
//! 定义了可插拔的拥塞控制接口。

use crate::config::WindowPolicy;

pub mod fixed;
pub mod tahoe;

pub use fixed::FixedWindow;
pub use tahoe::Tahoe;

/// A trait for congestion control algorithms.
///
/// The transmission machine reports two kinds of events: an ACK for the
/// oldest outstanding segment, and the expiry of the retransmission timeout.
/// Timeout backoff is the machine's business, not the controller's.
///
/// 拥塞控制算法的 trait。
pub trait CongestionControl: std::fmt::Debug + Send + Sync + 'static {
    /// Called when the oldest outstanding segment is acknowledged.
    ///
    /// 当最早的未确认数据段被确认时调用。
    fn on_ack(&mut self);

    /// Called when the retransmission timeout expires.
    ///
    /// 当重传超时到期时调用。
    fn on_timeout(&mut self);

    /// Gets the current congestion window in segments. May be fractional.
    ///
    /// 获取当前的拥塞窗口大小（以数据段为单位）。
    fn congestion_window(&self) -> f64;

    /// Gets the current slow start threshold in segments.
    fn slow_start_threshold(&self) -> u32;

    /// Whether another segment may be originated while `outstanding`
    /// segments are unacknowledged.
    fn admit_more(&self, outstanding: usize) -> bool {
        (outstanding as f64) < self.congestion_window().floor()
    }
}

/// Builds the controller that implements `policy`.
pub fn from_policy(policy: &WindowPolicy) -> Box<dyn CongestionControl> {
    match policy {
        WindowPolicy::Adaptive { initial_ssthresh } => Box::new(Tahoe::new(*initial_ssthresh)),
        WindowPolicy::Fixed { window } => Box::new(FixedWindow::new(*window)),
        WindowPolicy::Burst { .. } => Box::new(FixedWindow::unbounded()),
    }
}
