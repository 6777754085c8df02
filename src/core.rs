//! The sending core: ledger, RTT estimation, the transmission state machine
//! and the session driver that runs it.
//! 发送核心。

pub mod ledger;
pub mod machine;
pub mod rtt;
pub mod session;
