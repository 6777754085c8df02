//! The packet module: the framing codec for data packets and ACKs.
//! packet 模块：数据包与ACK的编解码。
//!
//! All integers are big-endian.
//!
//! ```text
//! data packet:  marker:u32 | seqno:u32 | payload...
//! ack packet:   marker:u32 | ackno:u32 [| ignored trailing bytes]
//! ```

pub mod header;

pub use header::{AckPacket, DataHeader, HEADER_SIZE, decode_ack, encode_data_packet};
