//! Traits for abstracting over the datagram channel.
use crate::{
    error::{Error, Result},
    packet::{AckPacket, decode_ack},
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::time::{Instant, timeout_at};
use tracing::{trace, warn};

/// An asynchronous, unreliable datagram channel to one remote endpoint.
///
/// This trait allows for abstracting over the underlying UDP socket,
/// enabling in-process peers for testing.
///
/// 异步、不可靠的数据报通道接口。
///
/// 此trait允许对底层UDP套接字进行抽象，从而可以在测试中使用进程内对端。
#[async_trait]
pub trait DatagramChannel: Send + Sync + 'static {
    /// Sends one datagram to the remote endpoint.
    async fn send(&self, datagram: &[u8]) -> Result<()>;

    /// Receives a single datagram into `buf`, returning its length.
    async fn recv(&self, buf: &mut [u8]) -> Result<usize>;
}

#[async_trait]
impl<T: DatagramChannel + ?Sized> DatagramChannel for Arc<T> {
    async fn send(&self, datagram: &[u8]) -> Result<()> {
        (**self).send(datagram).await
    }

    async fn recv(&self, buf: &mut [u8]) -> Result<usize> {
        (**self).recv(buf).await
    }
}

/// The outcome of one bounded receive.
///
/// 一次有界接收的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Received {
    /// A well-formed ACK arrived.
    Ack(AckPacket),
    /// The deadline passed before anything arrived.
    Timeout,
    /// Something arrived, but it was too short to be an ACK.
    Malformed { len: usize },
}

/// Waits for one datagram until `deadline` and classifies it.
///
/// A datagram that is already queued is returned even when the deadline has
/// passed. Channel I/O errors are propagated.
///
/// 等待一个数据报直到 `deadline`，并对其分类。
pub async fn recv_ack_until<C>(channel: &C, buf: &mut [u8], deadline: Instant) -> Result<Received>
where
    C: DatagramChannel + ?Sized,
{
    let len = match timeout_at(deadline, channel.recv(buf)).await {
        Ok(result) => result?,
        Err(_) => return Ok(Received::Timeout),
    };

    match decode_ack(&buf[..len]) {
        Ok(ack) => {
            trace!(ackno = ack.ackno, marker = ack.marker, "Received ACK");
            Ok(Received::Ack(ack))
        }
        Err(Error::MalformedPacket { len }) => {
            warn!(len, "Dropping malformed datagram");
            Ok(Received::Malformed { len })
        }
        Err(e) => Err(e),
    }
}
