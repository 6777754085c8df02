//! Stop-and-wait sender.

use std::process::ExitCode;
use tahoe_udp::cli::{self, Variant};

#[tokio::main]
async fn main() -> ExitCode {
    cli::main(Variant::StopAndWait).await
}
