//! The datagram channel the sender talks through, and the bounded wait for
//! an ACK.
//!
//! 发送方使用的数据报通道，以及有界的ACK等待。

pub mod traits;
pub mod udp;

pub use traits::{DatagramChannel, Received, recv_ack_until};
pub use udp::UdpChannel;

#[cfg(test)]
mod tests;
