//! An estimator for the round-trip time (RTT).
//! RTT 估算器。

use std::time::Duration;

const ALPHA: f64 = 1.0 / 8.0;
const BETA: f64 = 1.0 / 4.0;

/// Smoothed RTT, RTT deviation and the derived retransmission timeout.
///
/// Every ACK that removes a segment from the ledger yields a sample, including
/// ACKs for retransmitted segments. A sample taken after a resend may time
/// the earlier transmission; no ambiguity correction is applied.
///
/// 平滑RTT、RTT偏差以及推导出的重传超时。
#[derive(Debug, Clone)]
pub struct RttEstimator {
    /// The smoothed round-trip time, in seconds.
    /// 平滑的往返时间（秒）。
    estimated_rtt: f64,
    /// The round-trip time deviation, in seconds.
    /// 往返时间偏差（秒）。
    dev_rtt: f64,
    /// The retransmission timeout, in seconds.
    /// 重传超时时间（秒）。
    timeout: f64,
}

impl RttEstimator {
    /// Creates an estimator seeded from the caller's default timeout: the
    /// smoothed RTT starts at that value and the deviation at zero.
    ///
    /// 使用调用方的默认超时创建估算器。
    pub fn new(initial_timeout: Duration) -> Self {
        let initial = initial_timeout.as_secs_f64();
        Self {
            estimated_rtt: initial,
            dev_rtt: 0.0,
            timeout: initial,
        }
    }

    /// Returns the current retransmission timeout.
    ///
    /// 返回当前的重传超时。
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout).unwrap_or(Duration::MAX)
    }

    pub fn estimated_rtt(&self) -> Duration {
        Duration::try_from_secs_f64(self.estimated_rtt).unwrap_or(Duration::MAX)
    }

    pub fn dev_rtt(&self) -> Duration {
        Duration::try_from_secs_f64(self.dev_rtt).unwrap_or(Duration::MAX)
    }

    /// Updates the estimator with a new sample.
    ///
    /// 使用一个新的样本更新估算器。
    pub fn update(&mut self, sample: Duration) {
        let sample = sample.as_secs_f64();
        // The deviation is measured against the freshly updated estimate.
        self.estimated_rtt = ALPHA * sample + (1.0 - ALPHA) * self.estimated_rtt;
        self.dev_rtt = BETA * (sample - self.estimated_rtt).abs() + (1.0 - BETA) * self.dev_rtt;
        self.timeout = self.estimated_rtt + 4.0 * self.dev_rtt;
    }

    /// Doubles the timeout after an expiry. The estimate itself is untouched,
    /// so the next sample recomputes the timeout from scratch.
    ///
    /// 超时后将超时时间加倍。
    pub fn back_off(&mut self) {
        self.timeout *= 2.0;
    }
}
