//! 传输状态机
//! Transmission State Machine
//!
//! The single control loop of a sending session. Each state has one handler
//! that performs its I/O and returns the next state, so a session is just
//! `FillWindow -> ... -> Done` driven by [`Transmitter::step`].
//!
//! ```text
//!   FillWindow ──payload──▶ Send ──room──▶ FillWindow
//!       │  ▲                  │
//!       │  │                  └─full──▶ AwaitAck ◀──── Retransmit
//!  exhausted │                             │  │            ▲
//!       │    └────────ACK, room────────────┘  └──timeout───┘
//!       ▼
//!     Done (exhausted and nothing outstanding)
//! ```
//!
//! In burst mode ACKs are never awaited: sent segments are not recorded and
//! a `Gap` state sits between bursts.

use crate::{
    config::{Config, WindowPolicy},
    congestion::{self, CongestionControl},
    core::{
        ledger::{Ledger, Segment},
        rtt::RttEstimator,
    },
    error::Result,
    packet::{AckPacket, encode_data_packet},
    socket::{DatagramChannel, Received, recv_ack_until},
    source::DataSource,
    trace::EventLogger,
};
use bytes::Bytes;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, trace};

/// Used when `now + timeout` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// 状态机的状态
/// The state the machine will handle next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    /// Pull the next payload from the data source.
    FillWindow,
    /// Frame and transmit this payload as `next_seqno`.
    Send(Bytes),
    /// Wait, bounded by the current timeout, for an ACK.
    AwaitAck,
    /// Resend the oldest outstanding segment.
    Retransmit,
    /// Pause between bursts, then send this payload.
    Gap(Bytes),
    /// Data exhausted and nothing outstanding.
    Done,
}

/// Per-session sequencing state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Sequence number of the next newly originated segment.
    pub next_seqno: u32,
    /// The data source has reported end-of-data.
    pub data_exhausted: bool,
}

/// Counters kept by the machine.
///
/// 状态机的统计计数。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransmissionStats {
    /// Newly originated segments.
    pub segments_sent: u64,
    pub retransmissions: u64,
    pub timeouts: u64,
    /// Every well-formed ACK, whatever it acknowledged.
    pub acks_received: u64,
    /// ACKs for the oldest outstanding segment.
    pub acks_matched: u64,
    /// ACKs for nothing in the ledger: duplicates, stale or never sent.
    pub stale_acks: u64,
    /// Datagrams too short to be ACKs.
    pub malformed: u64,
}

#[derive(Debug, Clone, Copy)]
struct BurstPacing {
    burst_size: u32,
    gap: Duration,
}

/// The transmission state machine for one session.
///
/// 单个会话的传输状态机。
pub struct Transmitter<C, S, L> {
    channel: C,
    source: S,
    logger: L,
    ledger: Ledger,
    rtt: RttEstimator,
    congestion: Box<dyn CongestionControl>,
    session: SessionState,
    stats: TransmissionStats,
    marker: u32,
    pacing: Option<BurstPacing>,
    started_at: Instant,
    recv_buf: Vec<u8>,
}

impl<C, S, L> Transmitter<C, S, L>
where
    C: DatagramChannel,
    S: DataSource,
    L: EventLogger,
{
    pub fn new(config: &Config, channel: C, source: S, logger: L) -> Self {
        let policy = &config.congestion_control.policy;
        let pacing = match policy {
            WindowPolicy::Burst { burst_size, gap } => Some(BurstPacing {
                burst_size: (*burst_size).max(1),
                gap: *gap,
            }),
            _ => None,
        };
        Self {
            channel,
            source,
            logger,
            ledger: Ledger::new(),
            rtt: RttEstimator::new(config.reliability.initial_timeout),
            congestion: congestion::from_policy(policy),
            session: SessionState::default(),
            stats: TransmissionStats::default(),
            marker: config.marker,
            pacing,
            started_at: Instant::now(),
            recv_buf: vec![0u8; config.connection.recv_buffer_size.max(1)],
        }
    }

    /// Drives the machine until the session terminates.
    ///
    /// 驱动状态机直到会话结束。
    pub async fn run(&mut self) -> Result<()> {
        let mut state = State::FillWindow;
        while state != State::Done {
            state = self.step(state).await?;
        }
        self.logger.finish()
    }

    /// Handles one state and returns the next.
    pub async fn step(&mut self, state: State) -> Result<State> {
        match state {
            State::FillWindow => self.fill_window().await,
            State::Send(payload) => self.send(payload).await,
            State::AwaitAck => self.await_ack().await,
            State::Retransmit => self.retransmit().await,
            State::Gap(payload) => self.gap(payload).await,
            State::Done => Ok(State::Done),
        }
    }

    /// The oldest outstanding sequence number, or `next_seqno` when nothing
    /// is outstanding.
    pub fn desired_ackno(&self) -> u32 {
        self.ledger.min_key().unwrap_or(self.session.next_seqno)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn rtt(&self) -> &RttEstimator {
        &self.rtt
    }

    pub fn congestion(&self) -> &dyn CongestionControl {
        self.congestion.as_ref()
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn stats(&self) -> &TransmissionStats {
        &self.stats
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    fn elapsed(&self, now: Instant) -> Duration {
        now.duration_since(self.started_at)
    }

    async fn fill_window(&mut self) -> Result<State> {
        if self.session.data_exhausted {
            return Ok(self.wait_or_finish());
        }
        let seqno = self.session.next_seqno;
        match self.source.next_chunk(seqno).await? {
            None => {
                debug!(seqno, outstanding = self.ledger.len(), "Data source exhausted");
                self.session.data_exhausted = true;
                Ok(self.wait_or_finish())
            }
            Some(payload) => match self.pacing {
                Some(pacing) if seqno != 0 && seqno % pacing.burst_size == 0 => {
                    Ok(State::Gap(payload))
                }
                _ => Ok(State::Send(payload)),
            },
        }
    }

    async fn send(&mut self, payload: Bytes) -> Result<State> {
        let seqno = self.session.next_seqno;
        let datagram = encode_data_packet(self.marker, seqno, &payload);
        self.channel.send(&datagram).await?;

        let now = Instant::now();
        if self.pacing.is_none() {
            self.ledger.insert(Segment::new(seqno, datagram, now));
        }
        self.logger.log_send(seqno, self.elapsed(now))?;
        self.session.next_seqno = seqno.wrapping_add(1);
        self.stats.segments_sent += 1;
        trace!(seqno, outstanding = self.ledger.len(), "Sent segment");

        if self.pacing.is_some() || self.congestion.admit_more(self.ledger.len()) {
            Ok(State::FillWindow)
        } else {
            Ok(State::AwaitAck)
        }
    }

    /// Every entry starts a fresh `now + timeout` deadline, so stale ACKs
    /// arriving faster than the timeout postpone the retransmission.
    async fn await_ack(&mut self) -> Result<State> {
        let now = Instant::now();
        let deadline = now
            .checked_add(self.rtt.timeout())
            .unwrap_or(now + FAR_FUTURE);

        loop {
            match recv_ack_until(&self.channel, &mut self.recv_buf, deadline).await? {
                Received::Ack(ack) => return self.on_ack(ack),
                Received::Malformed { .. } => self.stats.malformed += 1,
                Received::Timeout => return Ok(self.on_timeout()),
            }
        }
    }

    fn on_ack(&mut self, ack: AckPacket) -> Result<State> {
        let now = Instant::now();
        self.stats.acks_received += 1;
        self.logger.log_ack(ack.ackno, self.elapsed(now))?;

        let desired = self.desired_ackno();
        let Some(segment) = self.ledger.remove(ack.ackno) else {
            self.stats.stale_acks += 1;
            trace!(ackno = ack.ackno, desired, "Ignoring stale or unknown ACK");
            return Ok(self.next_after_ack());
        };
        self.rtt.update(now.duration_since(segment.sent_at));

        if ack.ackno == desired {
            self.stats.acks_matched += 1;
            self.congestion.on_ack();
            debug!(
                ackno = ack.ackno,
                cwnd = self.congestion.congestion_window(),
                elapsed = self.elapsed(now).as_secs_f64(),
                desired = self.desired_ackno(),
                "Desired ACK received"
            );
        } else {
            trace!(ackno = ack.ackno, desired, "Out-of-order ACK");
        }
        Ok(self.next_after_ack())
    }

    fn on_timeout(&mut self) -> State {
        self.stats.timeouts += 1;
        self.congestion.on_timeout();
        self.rtt.back_off();
        debug!(
            desired = self.desired_ackno(),
            ssthresh = self.congestion.slow_start_threshold(),
            timeout = ?self.rtt.timeout(),
            "Timed out waiting for ACK"
        );
        State::Retransmit
    }

    async fn retransmit(&mut self) -> Result<State> {
        let seqno = self.desired_ackno();
        let now = Instant::now();
        let Some(datagram) = self.ledger.mark_resent(seqno, now) else {
            return Ok(self.next_after_ack());
        };
        self.channel.send(&datagram).await?;
        self.logger.log_send(seqno, self.elapsed(now))?;
        self.stats.retransmissions += 1;
        debug!(seqno, "Retransmitted oldest outstanding segment");
        Ok(State::AwaitAck)
    }

    async fn gap(&mut self, payload: Bytes) -> Result<State> {
        if let Some(pacing) = self.pacing {
            trace!(gap = ?pacing.gap, next = self.session.next_seqno, "Pausing between bursts");
            sleep(pacing.gap).await;
        }
        Ok(State::Send(payload))
    }

    fn wait_or_finish(&self) -> State {
        if self.ledger.is_empty() {
            State::Done
        } else {
            State::AwaitAck
        }
    }

    fn next_after_ack(&self) -> State {
        let exhausted = self.session.data_exhausted;
        if !exhausted && self.congestion.admit_more(self.ledger.len()) {
            State::FillWindow
        } else if !self.ledger.is_empty() {
            State::AwaitAck
        } else if exhausted {
            State::Done
        } else {
            State::FillWindow
        }
    }
}
