//! Durable per-packet event log.
//!
//! One record per call, in call order. Times are measured from the start of
//! the session.
//!
//! 每个数据包的事件日志。

use crate::error::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Records send and ACK events.
pub trait EventLogger: Send {
    /// A data packet (new or retransmitted) went out.
    fn log_send(&mut self, seqno: u32, elapsed: Duration) -> Result<()>;

    /// An ACK came in.
    fn log_ack(&mut self, ackno: u32, elapsed: Duration) -> Result<()>;

    /// Flushes anything buffered. Called once when the session ends.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// One logged event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    Sent { seqno: u32, elapsed: Duration },
    Acked { ackno: u32, elapsed: Duration },
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTrace;

impl EventLogger for NullTrace {
    fn log_send(&mut self, _seqno: u32, _elapsed: Duration) -> Result<()> {
        Ok(())
    }

    fn log_ack(&mut self, _ackno: u32, _elapsed: Duration) -> Result<()> {
        Ok(())
    }
}

/// Keeps events in memory. Clones share the same record.
#[derive(Debug, Default, Clone)]
pub struct MemoryTrace {
    events: Arc<Mutex<Vec<TraceEvent>>>,
}

impl MemoryTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Sequence numbers of every send, retransmissions included.
    pub fn sent_seqnos(&self) -> Vec<u32> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                TraceEvent::Sent { seqno, .. } => Some(seqno),
                TraceEvent::Acked { .. } => None,
            })
            .collect()
    }

    pub fn acked_seqnos(&self) -> Vec<u32> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                TraceEvent::Acked { ackno, .. } => Some(ackno),
                TraceEvent::Sent { .. } => None,
            })
            .collect()
    }

    fn push(&self, event: TraceEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl EventLogger for MemoryTrace {
    fn log_send(&mut self, seqno: u32, elapsed: Duration) -> Result<()> {
        self.push(TraceEvent::Sent { seqno, elapsed });
        Ok(())
    }

    fn log_ack(&mut self, ackno: u32, elapsed: Duration) -> Result<()> {
        self.push(TraceEvent::Acked { ackno, elapsed });
        Ok(())
    }
}

/// Writes events as CSV rows: `SeqNo,TimeSent,AckNo,timeACKed`. A send fills
/// the first two columns, an ACK the last two, and the unused pair is zero.
#[derive(Debug)]
pub struct CsvTrace<W: Write + Send> {
    out: W,
}

impl CsvTrace<BufWriter<File>> {
    /// Creates (or truncates) the trace file at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write + Send> CsvTrace<W> {
    pub const COMMENT: &'static str = "Log of all packets sent and ACKs received by client";
    pub const HEADER: &'static str = "SeqNo,TimeSent,AckNo,timeACKed";

    /// Writes the comment and header lines to `out`.
    pub fn new(mut out: W) -> Result<Self> {
        writeln!(out, "# {}", Self::COMMENT)?;
        writeln!(out, "{}", Self::HEADER)?;
        Ok(Self { out })
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> EventLogger for CsvTrace<W> {
    fn log_send(&mut self, seqno: u32, elapsed: Duration) -> Result<()> {
        writeln!(self.out, "{},{:.6},0,0", seqno, elapsed.as_secs_f64())?;
        Ok(())
    }

    fn log_ack(&mut self, ackno: u32, elapsed: Duration) -> Result<()> {
        writeln!(self.out, "0,0,{},{:.6}", ackno, elapsed.as_secs_f64())?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

impl<L: EventLogger + ?Sized> EventLogger for Box<L> {
    fn log_send(&mut self, seqno: u32, elapsed: Duration) -> Result<()> {
        (**self).log_send(seqno, elapsed)
    }

    fn log_ack(&mut self, ackno: u32, elapsed: Duration) -> Result<()> {
        (**self).log_ack(ackno, elapsed)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}
