//! Where application payload comes from.
//!
//! 应用载荷的来源。

use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// Supplies the payload for each sequence number.
///
/// The transmission machine asks for every sequence number exactly once, in
/// ascending order starting at zero, and stops asking after the first
/// `None`. Retransmissions are served from the ledger, never from here.
///
/// 为每个序号提供载荷。
#[async_trait]
pub trait DataSource: Send {
    /// Returns the payload for `seqno`, or `None` once the data is exhausted.
    async fn next_chunk(&mut self, seqno: u32) -> Result<Option<Bytes>>;
}

/// Splits one buffer into fixed-size chunks; chunk `k` is sequence number `k`.
#[derive(Debug, Clone)]
pub struct ChunkedSource {
    data: Bytes,
    chunk_size: usize,
}

impl ChunkedSource {
    pub fn new(data: impl Into<Bytes>, chunk_size: usize) -> Self {
        Self {
            data: data.into(),
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_count(&self) -> usize {
        self.data.len().div_ceil(self.chunk_size)
    }
}

#[async_trait]
impl DataSource for ChunkedSource {
    async fn next_chunk(&mut self, seqno: u32) -> Result<Option<Bytes>> {
        let start = (seqno as usize).saturating_mul(self.chunk_size);
        if start >= self.data.len() {
            return Ok(None);
        }
        let end = (start + self.chunk_size).min(self.data.len());
        Ok(Some(self.data.slice(start..end)))
    }
}

/// `count` chunks of `size` bytes with a content derived from the sequence
/// number, so a receiver can check what it got.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    count: u32,
    size: usize,
}

impl SyntheticSource {
    pub fn new(count: u32, size: usize) -> Self {
        Self { count, size }
    }

    /// The bytes served for `seqno`.
    pub fn chunk(seqno: u32, size: usize) -> Bytes {
        let text = format!("chunk {seqno:08} ");
        text.bytes().cycle().take(size).collect::<Vec<u8>>().into()
    }
}

#[async_trait]
impl DataSource for SyntheticSource {
    async fn next_chunk(&mut self, seqno: u32) -> Result<Option<Bytes>> {
        if seqno >= self.count {
            return Ok(None);
        }
        Ok(Some(Self::chunk(seqno, self.size)))
    }
}
