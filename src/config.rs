//! 定义了会话和协议的可配置参数。
//! Defines configurable parameters for a sending session.

use std::path::PathBuf;
use std::time::Duration;

/// The marker written in front of every data packet unless overridden.
pub const DEFAULT_MARKER: u32 = 0xBAAD_CAFE;

/// A structure containing all configurable parameters for a session.
///
/// 包含所有会话可配置参数的结构体。
#[derive(Debug, Clone)]
pub struct Config {
    /// The value placed in the marker field of each data packet. Receivers
    /// are free to ignore it.
    /// 每个数据包标记字段中的值，接收方可以忽略它。
    pub marker: u32,

    /// Reliability-related parameters.
    /// 可靠性相关参数。
    pub reliability: ReliabilityConfig,

    /// Congestion control-related parameters.
    /// 拥塞控制相关参数。
    pub congestion_control: CongestionControlConfig,

    /// Channel-related parameters.
    /// 通道相关参数。
    pub connection: ConnectionConfig,

    /// Packet trace parameters.
    /// 数据包跟踪参数。
    pub trace: TraceConfig,
}

/// Reliability-related parameters.
///
/// 可靠性相关参数。
#[derive(Debug, Clone)]
pub struct ReliabilityConfig {
    /// The retransmission timeout used before any RTT sample exists. It also
    /// seeds the smoothed RTT estimate.
    /// 在没有任何RTT样本之前使用的重传超时，同时作为平滑RTT估计的初始值。
    pub initial_timeout: Duration,
}

/// How many segments the sender may keep in flight.
///
/// 发送方可以保持在途的数据段数量策略。
#[derive(Debug, Clone, PartialEq)]
pub enum WindowPolicy {
    /// Slow start followed by congestion avoidance, starting from `cwnd = 1`.
    /// 慢启动加拥塞避免，从 `cwnd = 1` 开始。
    Adaptive { initial_ssthresh: u32 },
    /// A constant window. `window = 1` is stop-and-wait.
    /// 固定窗口。`window = 1` 即停等协议。
    Fixed { window: u32 },
    /// Unbounded window, ACKs are never awaited. `burst_size` segments go out
    /// back-to-back, then the sender sleeps for `gap`.
    /// 无界窗口，从不等待ACK。连续发送 `burst_size` 个数据段后休眠 `gap`。
    Burst { burst_size: u32, gap: Duration },
}

/// Congestion control-related parameters.
///
/// 拥塞控制相关参数。
#[derive(Debug, Clone)]
pub struct CongestionControlConfig {
    pub policy: WindowPolicy,
}

/// Channel-related parameters.
///
/// 通道相关参数。
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Size of the buffer handed to each receive call. ACKs are 8 bytes; any
    /// excess is truncated by the socket.
    /// 每次接收调用使用的缓冲区大小。
    pub recv_buffer_size: usize,
}

/// Packet trace parameters.
#[derive(Debug, Clone, Default)]
pub struct TraceConfig {
    /// Where to write the CSV trace. `None` disables the file trace.
    pub path: Option<PathBuf>,
}

impl Config {
    /// Slow start / congestion avoidance with the given initial threshold.
    pub fn tahoe(initial_ssthresh: u32, initial_timeout: Duration) -> Self {
        Self::with_policy(
            WindowPolicy::Adaptive { initial_ssthresh },
            initial_timeout,
        )
    }

    /// One segment in flight at a time.
    pub fn stop_and_wait(initial_timeout: Duration) -> Self {
        Self::with_policy(WindowPolicy::Fixed { window: 1 }, initial_timeout)
    }

    /// Back-to-back bursts separated by `gap`, without ACK processing.
    pub fn burst(burst_size: u32, gap: Duration) -> Self {
        let mut config = Self::default();
        config.congestion_control.policy = WindowPolicy::Burst {
            burst_size: burst_size.max(1),
            gap,
        };
        config
    }

    fn with_policy(policy: WindowPolicy, initial_timeout: Duration) -> Self {
        let mut config = Self::default();
        config.congestion_control.policy = policy;
        config.reliability.initial_timeout = initial_timeout;
        config
    }

    /// Sets the CSV trace path.
    pub fn with_trace_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.trace.path = Some(path.into());
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER,
            reliability: ReliabilityConfig::default(),
            congestion_control: CongestionControlConfig::default(),
            connection: ConnectionConfig::default(),
            trace: TraceConfig::default(),
        }
    }
}

impl Default for ReliabilityConfig {
    fn default() -> Self {
        Self {
            initial_timeout: Duration::from_millis(1000),
        }
    }
}

impl Default for CongestionControlConfig {
    fn default() -> Self {
        Self {
            policy: WindowPolicy::Adaptive {
                initial_ssthresh: 64,
            },
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            recv_buffer_size: 100,
        }
    }
}
