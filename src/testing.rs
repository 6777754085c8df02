//! 测试辅助工具模块
//! Test utilities module

#![cfg(test)]

use crate::{
    error::Result,
    packet::{AckPacket, DataHeader},
    socket::DatagramChannel,
    source::DataSource,
};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use std::{
    collections::{BTreeMap, HashMap, VecDeque},
    sync::{Arc, Mutex, Once},
    time::Duration,
};
use tokio::time::{Instant, sleep_until};

/// Initializes tracing for tests, ensuring it's only done once.
pub fn init_tracing() {
    static TRACING_INIT: Once = Once::new();
    TRACING_INIT.call_once(|| {
        let filter =
            std::env::var("RUST_LOG").unwrap_or_else(|_| "tahoe_udp=debug".to_string());
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// What the peer does with one arriving data packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerAction {
    Ack,
    /// Swallow the packet (or, equivalently, lose its ACK).
    Drop,
    /// Send the ACK twice.
    Duplicate,
}

type Policy = Box<dyn FnMut(u32, u32) -> PeerAction + Send>;

struct PeerInner {
    ack_delay: Duration,
    policy: Policy,
    attempts: HashMap<u32, u32>,
    arrivals: Vec<(u32, Bytes)>,
    pending: VecDeque<(Instant, Bytes)>,
}

/// An in-process remote endpoint.
///
/// Every data packet handed to [`DatagramChannel::send`] is decoded and shown
/// to the policy as `(seqno, attempt)`, attempt counting from one. ACKs are
/// queued for delivery `ack_delay` later and come out of
/// [`DatagramChannel::recv`] in delivery order, so under paused tokio time a
/// whole session is deterministic.
pub struct ScriptedPeer {
    inner: Mutex<PeerInner>,
}

impl ScriptedPeer {
    /// A peer that acknowledges everything.
    pub fn new(ack_delay: Duration) -> Arc<Self> {
        Self::with_policy(ack_delay, |_, _| PeerAction::Ack)
    }

    pub fn with_policy(
        ack_delay: Duration,
        policy: impl FnMut(u32, u32) -> PeerAction + Send + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(PeerInner {
                ack_delay,
                policy: Box::new(policy),
                attempts: HashMap::new(),
                arrivals: Vec::new(),
                pending: VecDeque::new(),
            }),
        })
    }

    /// Queues a raw datagram for delivery `after` from now.
    pub fn inject(&self, datagram: impl Into<Bytes>, after: Duration) {
        let at = Instant::now() + after;
        self.lock().enqueue(at, datagram.into());
    }

    /// Queues an ACK for `ackno` with an arbitrary marker.
    pub fn inject_ack(&self, ackno: u32, after: Duration) {
        self.inject(encode_ack(0x5EED_0000, ackno), after);
    }

    /// Sequence numbers of every data packet received, in arrival order.
    pub fn received(&self) -> Vec<u32> {
        self.lock().arrivals.iter().map(|(seqno, _)| *seqno).collect()
    }

    /// Every data packet received as `(seqno, payload)`, in arrival order.
    pub fn arrivals(&self) -> Vec<(u32, Bytes)> {
        self.lock().arrivals.clone()
    }

    /// The first payload seen for each sequence number.
    pub fn payloads(&self) -> BTreeMap<u32, Bytes> {
        let mut payloads = BTreeMap::new();
        for (seqno, payload) in self.lock().arrivals.iter() {
            payloads.entry(*seqno).or_insert_with(|| payload.clone());
        }
        payloads
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PeerInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl PeerInner {
    fn enqueue(&mut self, at: Instant, datagram: Bytes) {
        let idx = self.pending.partition_point(|(t, _)| *t <= at);
        self.pending.insert(idx, (at, datagram));
    }
}

fn encode_ack(marker: u32, ackno: u32) -> Bytes {
    let mut buf = BytesMut::new();
    AckPacket { marker, ackno }.encode(&mut buf);
    buf.freeze()
}

#[async_trait]
impl DatagramChannel for ScriptedPeer {
    async fn send(&self, datagram: &[u8]) -> Result<()> {
        let mut cursor = datagram;
        let Some(header) = DataHeader::decode(&mut cursor) else {
            return Ok(());
        };
        let mut inner = self.lock();
        let attempt = {
            let count = inner.attempts.entry(header.seqno).or_insert(0);
            *count += 1;
            *count
        };
        inner
            .arrivals
            .push((header.seqno, Bytes::copy_from_slice(cursor)));

        let at = Instant::now() + inner.ack_delay;
        let ack = encode_ack(header.marker, header.seqno);
        let action = (inner.policy)(header.seqno, attempt);
        match action {
            PeerAction::Ack => inner.enqueue(at, ack),
            PeerAction::Duplicate => {
                inner.enqueue(at, ack.clone());
                inner.enqueue(at, ack);
            }
            PeerAction::Drop => {}
        }
        Ok(())
    }

    async fn recv(&self, buf: &mut [u8]) -> Result<usize> {
        loop {
            let next = self.lock().pending.front().map(|(at, _)| *at);
            match next {
                None => std::future::pending::<()>().await,
                Some(at) if at <= Instant::now() => {
                    if let Some((_, datagram)) = self.lock().pending.pop_front() {
                        let len = datagram.len().min(buf.len());
                        buf[..len].copy_from_slice(&datagram[..len]);
                        return Ok(len);
                    }
                }
                Some(at) => sleep_until(at).await,
            }
        }
    }
}

/// Wraps a [`DataSource`] and records every sequence number it is asked for.
/// Clones of the returned log share the same record.
pub struct RecordingSource<S> {
    inner: S,
    calls: Arc<Mutex<Vec<u32>>>,
}

impl<S: DataSource> RecordingSource<S> {
    pub fn new(inner: S) -> (Self, Arc<Mutex<Vec<u32>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                inner,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl<S: DataSource> DataSource for RecordingSource<S> {
    async fn next_chunk(&mut self, seqno: u32) -> Result<Option<Bytes>> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(seqno);
        }
        self.inner.next_chunk(seqno).await
    }
}
