//! UDP-based channel implementation.
//!
//! 基于UDP的通道实现。

use super::DatagramChannel;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::UdpSocket;
use tracing::{debug, trace};

/// A UDP socket paired with the remote endpoint it sends to.
///
/// The socket is left unconnected, so ICMP errors from a remote that is not
/// listening yet surface as silence (and therefore timeouts) rather than as
/// receive errors.
///
/// 与远端地址配对的UDP套接字。
#[derive(Debug)]
pub struct UdpChannel {
    socket: UdpSocket,
    remote_addr: SocketAddr,
}

impl UdpChannel {
    /// Binds an ephemeral local port of the remote's address family.
    ///
    /// 绑定与远端地址族相同的临时本地端口。
    pub async fn open(remote_addr: SocketAddr) -> Result<Self> {
        let local_addr: SocketAddr = if remote_addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        Self::bind(local_addr, remote_addr).await
    }

    /// Binds to `local_addr`. Failure is reported as
    /// [`Error::ChannelUnavailable`].
    pub async fn bind(local_addr: SocketAddr, remote_addr: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(local_addr)
            .await
            .map_err(Error::ChannelUnavailable)?;
        debug!(
            local = ?socket.local_addr().ok(),
            remote = %remote_addr,
            "UDP channel opened"
        );
        Ok(Self::from_socket(socket, remote_addr))
    }

    /// Creates a channel from an existing socket.
    ///
    /// 从现有套接字创建通道。
    pub fn from_socket(socket: UdpSocket, remote_addr: SocketAddr) -> Self {
        Self {
            socket,
            remote_addr,
        }
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr().map_err(Into::into)
    }
}

#[async_trait]
impl DatagramChannel for UdpChannel {
    async fn send(&self, datagram: &[u8]) -> Result<()> {
        self.socket.send_to(datagram, self.remote_addr).await?;
        trace!(addr = %self.remote_addr, bytes = datagram.len(), "Sent UDP datagram");
        Ok(())
    }

    async fn recv(&self, buf: &mut [u8]) -> Result<usize> {
        let (len, from) = self.socket.recv_from(buf).await?;
        trace!(addr = %from, bytes = len, "Received UDP datagram");
        Ok(len)
    }
}
