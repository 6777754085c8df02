#![deny(clippy::expect_used, clippy::unwrap_used)]

//! A reliable sender over UDP: sequenced datagrams, ACK matching,
//! timeout-driven single-segment retransmission and a congestion window.
//! 基于UDP的可靠发送端。

pub mod cli;
pub mod config;
pub mod congestion;
pub mod core;
pub mod error;
pub mod packet;
pub mod socket;
pub mod source;
pub mod trace;

#[cfg(test)]
mod testing;

pub use crate::config::{Config, WindowPolicy};
pub use crate::core::{
    machine::{State, Transmitter},
    session::{Session, SessionReport},
};
pub use crate::error::{Error, Result};
