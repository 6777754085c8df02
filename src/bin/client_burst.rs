//! Burst sender: fixed-size bursts with a pause between them.

use std::process::ExitCode;
use tahoe_udp::cli::{self, Variant};

#[tokio::main]
async fn main() -> ExitCode {
    cli::main(Variant::Burst).await
}
