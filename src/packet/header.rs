//! 定义数据包头与ACK包。
//! Defines the data packet header and the ACK packet.

use crate::error::{Error, Result};
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Size of the header prepended to every payload, and the size of an ACK.
pub const HEADER_SIZE: usize = 8;

/// The header in front of every data payload.
/// 每个数据载荷前的头部。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataHeader {
    /// An informational value. Never used for correctness.
    /// 信息性字段，从不用于正确性判断。
    pub marker: u32,
    /// The sequence number of the segment.
    /// 数据段序号。
    pub seqno: u32,
}

impl DataHeader {
    /// 将头部编码到缓冲区。
    /// Encodes the header into a buffer.
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32(self.marker);
        buf.put_u32(self.seqno);
    }

    /// 从缓冲区解码头部。
    /// Decodes a header from a buffer, leaving the payload in `buf`.
    pub fn decode<B: Buf>(buf: &mut B) -> Option<Self> {
        if buf.remaining() < HEADER_SIZE {
            return None;
        }
        Some(DataHeader {
            marker: buf.get_u32(),
            seqno: buf.get_u32(),
        })
    }
}

/// An acknowledgment from the remote endpoint.
/// 来自远端的确认包。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AckPacket {
    /// Whatever marker the receiver chose. Not validated.
    pub marker: u32,
    /// The sequence number being acknowledged.
    pub ackno: u32,
}

impl AckPacket {
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32(self.marker);
        buf.put_u32(self.ackno);
    }

    /// Decodes an ACK. Bytes past the first eight are ignored.
    pub fn decode(mut datagram: &[u8]) -> Result<Self> {
        if datagram.len() < HEADER_SIZE {
            return Err(Error::MalformedPacket {
                len: datagram.len(),
            });
        }
        Ok(AckPacket {
            marker: datagram.get_u32(),
            ackno: datagram.get_u32(),
        })
    }
}

/// Builds a data packet: `8 + payload.len()` bytes.
pub fn encode_data_packet(marker: u32, seqno: u32, payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    DataHeader { marker, seqno }.encode(&mut buf);
    buf.put_slice(payload);
    buf.freeze()
}

/// Decodes an ACK datagram.
pub fn decode_ack(datagram: &[u8]) -> Result<AckPacket> {
    AckPacket::decode(datagram)
}
