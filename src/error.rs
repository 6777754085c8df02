//! 定义了库中所有可能的错误类型。
//! Defines all possible error types in the library.

use thiserror::Error;

/// The primary error type for the transport engine.
/// 传输引擎的主要错误类型。
#[derive(Debug, Error)]
pub enum Error {
    /// An underlying I/O error occurred after the channel was opened.
    /// 通道打开后发生了底层的I/O错误。
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The remote host name did not resolve to any socket address.
    /// 远端主机名无法解析为任何套接字地址。
    #[error("could not resolve {0}")]
    AddressResolution(String),

    /// A received datagram was too short to carry a header.
    /// 接收到的数据报太短，无法包含头部。
    #[error("malformed packet: {len} bytes is shorter than the header")]
    MalformedPacket { len: usize },

    /// The datagram channel could not be created or bound.
    /// 无法创建或绑定数据报通道。
    #[error("datagram channel unavailable: {0}")]
    ChannelUnavailable(#[source] std::io::Error),

    /// The data source failed to produce the next chunk.
    /// 数据源未能产生下一个数据块。
    #[error("data source failed: {0}")]
    DataSource(String),
}

/// A specialized `Result` type for this library.
/// 本库专用的 `Result` 类型。
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        use std::io::ErrorKind;
        match err {
            Error::Io(e) => e,
            Error::ChannelUnavailable(e) => e,
            Error::AddressResolution(host) => {
                std::io::Error::new(ErrorKind::NotFound, format!("could not resolve {host}"))
            }
            Error::MalformedPacket { .. } => ErrorKind::InvalidData.into(),
            Error::DataSource(msg) => std::io::Error::other(msg),
        }
    }
}
