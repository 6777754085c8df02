//! 未确认数据段账本
//! Outstanding-Segment Ledger
//!
//! Holds every segment that has been sent but not yet acknowledged, keyed by
//! sequence number. Iteration is always in sequence order, and the smallest
//! key is the oldest outstanding segment.

use bytes::Bytes;
use std::collections::BTreeMap;
use tokio::time::Instant;
use tracing::trace;

/// A segment awaiting acknowledgment.
/// 等待确认的数据段。
#[derive(Debug, Clone)]
pub struct Segment {
    /// 序号
    /// Sequence number
    pub seqno: u32,

    /// The framed datagram as it went on the wire, header included.
    /// 线上发送的完整数据报（含头部）。
    pub datagram: Bytes,

    /// 最后发送时间
    /// Last sent time. Refreshed on retransmission.
    pub sent_at: Instant,

    /// 发送次数
    /// How many times this segment has been transmitted.
    pub transmissions: u32,
}

impl Segment {
    pub fn new(seqno: u32, datagram: Bytes, sent_at: Instant) -> Self {
        Self {
            seqno,
            datagram,
            sent_at,
            transmissions: 1,
        }
    }

    /// The application payload, without the header.
    pub fn payload(&self) -> Bytes {
        self.datagram
            .slice(crate::packet::HEADER_SIZE.min(self.datagram.len())..)
    }
}

/// 未确认数据段存储器
/// Store of outstanding segments
#[derive(Debug, Default)]
pub struct Ledger {
    segments: BTreeMap<u32, Segment>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加数据段
    /// Records a freshly sent segment. Returns the previous entry if the
    /// sequence number was already present.
    pub fn insert(&mut self, segment: Segment) -> Option<Segment> {
        trace!(seqno = segment.seqno, "Adding segment to ledger");
        self.segments.insert(segment.seqno, segment)
    }

    /// 移除数据段
    /// Removes an acknowledged segment. Unknown sequence numbers yield `None`
    /// and leave the ledger untouched.
    pub fn remove(&mut self, seqno: u32) -> Option<Segment> {
        let removed = self.segments.remove(&seqno);
        if removed.is_some() {
            trace!(seqno, "Removed segment from ledger");
        }
        removed
    }

    pub fn get(&self, seqno: u32) -> Option<&Segment> {
        self.segments.get(&seqno)
    }

    pub fn contains(&self, seqno: u32) -> bool {
        self.segments.contains_key(&seqno)
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// The oldest outstanding sequence number.
    /// 最早的未确认序号。
    pub fn min_key(&self) -> Option<u32> {
        self.segments.keys().next().copied()
    }

    /// Outstanding segments in sequence order.
    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.values()
    }

    /// Outstanding sequence numbers in ascending order.
    pub fn seqnos(&self) -> Vec<u32> {
        self.segments.keys().copied().collect()
    }

    /// Stamps a resend of `seqno` and returns the datagram to put on the wire.
    pub fn mark_resent(&mut self, seqno: u32, now: Instant) -> Option<Bytes> {
        let segment = self.segments.get_mut(&seqno)?;
        segment.sent_at = now;
        segment.transmissions += 1;
        trace!(seqno, transmissions = segment.transmissions, "Segment marked for resend");
        Some(segment.datagram.clone())
    }
}
