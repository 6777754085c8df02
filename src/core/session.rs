//! 会话驱动
//! Session Driver
//!
//! Owns the datagram channel, runs the transmission machine to completion and
//! reports what happened.

use crate::{
    config::Config,
    core::machine::{TransmissionStats, Transmitter},
    error::Result,
    socket::{DatagramChannel, UdpChannel},
    source::DataSource,
    trace::{CsvTrace, EventLogger, NullTrace},
};
use std::{fmt, net::SocketAddr, time::Duration};
use tokio::time::Instant;
use tracing::{info, warn};

/// Summary of a finished session.
///
/// 已完成会话的摘要。
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    /// Wall-clock time from session start to termination.
    pub elapsed: Duration,
    pub stats: TransmissionStats,
    /// Sequence number the next new segment would have used.
    pub next_seqno: u32,
    pub final_cwnd: f64,
    pub final_ssthresh: u32,
    pub final_timeout: Duration,
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Finished sending all packets!")?;
        writeln!(f, "Elapsed time: {:.4} s", self.elapsed.as_secs_f64())?;
        write!(
            f,
            "segments={} retransmissions={} timeouts={} acks={} stale_acks={} malformed={} cwnd={:.2} ssthresh={}",
            self.stats.segments_sent,
            self.stats.retransmissions,
            self.stats.timeouts,
            self.stats.acks_received,
            self.stats.stale_acks,
            self.stats.malformed,
            self.final_cwnd,
            self.final_ssthresh,
        )
    }
}

/// A single sending session.
///
/// 单个发送会话。
pub struct Session<C = UdpChannel> {
    config: Config,
    channel: C,
}

impl Session<UdpChannel> {
    /// Opens a UDP channel towards `remote_addr`. A failure to create or bind
    /// the socket is fatal and happens before any state-machine activity.
    ///
    /// 打开通往 `remote_addr` 的UDP通道。
    pub async fn connect(remote_addr: SocketAddr, config: Config) -> Result<Self> {
        let channel = UdpChannel::open(remote_addr).await?;
        Ok(Self::with_channel(config, channel))
    }
}

impl<C: DatagramChannel> Session<C> {
    pub fn with_channel(config: Config, channel: C) -> Self {
        Self { config, channel }
    }

    /// Runs the session, tracing to the configured CSV file if any.
    pub async fn run<S: DataSource>(self, source: S) -> Result<SessionReport> {
        let logger: Box<dyn EventLogger> = match &self.config.trace.path {
            Some(path) => Box::new(CsvTrace::create(path)?),
            None => Box::new(NullTrace),
        };
        self.run_with_logger(source, logger).await
    }

    /// Runs the session with a caller-supplied event logger.
    pub async fn run_with_logger<S, L>(self, source: S, logger: L) -> Result<SessionReport>
    where
        S: DataSource,
        L: EventLogger,
    {
        info!(
            policy = ?self.config.congestion_control.policy,
            timeout = ?self.config.reliability.initial_timeout,
            "Starting session"
        );
        let mut machine = Transmitter::new(&self.config, self.channel, source, logger);
        let result = machine.run().await;
        let report = SessionReport {
            elapsed: Instant::now().duration_since(machine.started_at()),
            stats: machine.stats().clone(),
            next_seqno: machine.session().next_seqno,
            final_cwnd: machine.congestion().congestion_window(),
            final_ssthresh: machine.congestion().slow_start_threshold(),
            final_timeout: machine.rtt().timeout(),
        };

        match result {
            Ok(()) => {
                info!(
                    elapsed = report.elapsed.as_secs_f64(),
                    segments = report.stats.segments_sent,
                    retransmissions = report.stats.retransmissions,
                    "Finished sending all packets"
                );
                Ok(report)
            }
            Err(e) => {
                warn!(error = %e, next_seqno = report.next_seqno, "Session aborted");
                Err(e)
            }
        }
    }
}
