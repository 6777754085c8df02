//! 命令行入口
//! Command-line glue shared by the three client binaries.
//!
//! Every binary takes the same positional arguments,
//! `<host> <port> [<size> <seconds>]`, and reads them according to its
//! [`Variant`].

use crate::{
    config::Config,
    core::session::{Session, SessionReport},
    error::{Error, Result},
    source::SyntheticSource,
};
use clap::{CommandFactory, FromArgMatches, Parser, error::ErrorKind};
use std::{ffi::OsString, net::SocketAddr, process::ExitCode, time::Duration};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Chunks sent by every binary.
pub const CHUNK_COUNT: u32 = 1000;
/// Payload bytes per chunk.
pub const CHUNK_SIZE: usize = 1000;

/// Which sender a binary runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Slow start and congestion avoidance with timeout recovery.
    Tahoe,
    /// One segment in flight at a time.
    StopAndWait,
    /// Fixed-size bursts separated by a pause, ACKs ignored.
    Burst,
}

impl Variant {
    pub fn program(self) -> &'static str {
        match self {
            Variant::Tahoe => "client_tahoe",
            Variant::StopAndWait => "client_saw",
            Variant::Burst => "client_burst",
        }
    }

    /// CSV packet trace written in the working directory.
    pub fn trace_file(self) -> String {
        format!("{}_packets.csv", self.program())
    }

    pub fn usage(self) -> String {
        let example = match self {
            Variant::Tahoe => "1.2.3.4 6000 64 1.0",
            Variant::StopAndWait => "1.2.3.4 6000",
            Variant::Burst => "1.2.3.4 6000 50 0.120",
        };
        format!(
            "To send data to server 1.2.3.4 port 6000, try running:\n   {} {example}",
            self.program()
        )
    }
}

/// Positional arguments common to all variants.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(about = "Sends sequenced datagrams to a UDP receiver", allow_negative_numbers = true)]
pub struct Args {
    /// Receiver host name or address.
    pub host: String,
    /// Receiver UDP port.
    pub port: u16,
    /// Initial ssthresh (tahoe) or burst size (burst). Ignored by stop-and-wait.
    pub size: Option<u32>,
    /// Initial timeout (tahoe, stop-and-wait) or gap between bursts (burst), in seconds.
    pub seconds: Option<f64>,
}

/// A fully parsed command line, ready to run.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub host: String,
    pub port: u16,
    pub config: Config,
}

/// Parses `argv` for `variant`.
///
/// Returns `Ok(None)` when a required argument is missing; the caller prints
/// [`Variant::usage`] and exits successfully.
pub fn parse<I, T>(variant: Variant, argv: I) -> std::result::Result<Option<Invocation>, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = match Args::command().name(variant.program()).try_get_matches_from(argv) {
        Ok(matches) => matches,
        Err(e) if is_missing_argument(e.kind()) => return Ok(None),
        Err(e) => return Err(e),
    };
    let args = Args::from_arg_matches(&matches)?;

    let config = match variant {
        Variant::Tahoe => {
            let (Some(ssthresh), Some(timeout)) = (args.size, args.seconds) else {
                return Ok(None);
            };
            Config::tahoe(ssthresh, seconds(timeout)?)
        }
        Variant::StopAndWait => {
            let timeout = match args.seconds {
                Some(timeout) => seconds(timeout)?,
                None => Config::default().reliability.initial_timeout,
            };
            Config::stop_and_wait(timeout)
        }
        Variant::Burst => {
            let (Some(burst_size), Some(gap)) = (args.size, args.seconds) else {
                return Ok(None);
            };
            Config::burst(burst_size, seconds(gap)?)
        }
    };

    Ok(Some(Invocation {
        host: args.host,
        port: args.port,
        config: config.with_trace_path(variant.trace_file()),
    }))
}

fn is_missing_argument(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::MissingRequiredArgument | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    )
}

fn seconds(value: f64) -> std::result::Result<Duration, clap::Error> {
    Duration::try_from_secs_f64(value).map_err(|_| {
        clap::Error::raw(
            ErrorKind::InvalidValue,
            format!("'{value}' is not a valid number of seconds\n"),
        )
    })
}

/// Resolves `host:port`, taking the first address returned.
pub async fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    let mut addrs = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| Error::AddressResolution(format!("{host}:{port}: {e}")))?;
    addrs
        .next()
        .ok_or_else(|| Error::AddressResolution(format!("{host}:{port}: no addresses")))
}

/// Resolves the receiver and runs one session over UDP.
pub async fn run(invocation: Invocation) -> Result<SessionReport> {
    let remote = resolve(&invocation.host, invocation.port).await?;
    info!(
        %remote,
        policy = ?invocation.config.congestion_control.policy,
        timeout = ?invocation.config.reliability.initial_timeout,
        "Sending UDP packets"
    );
    let session = Session::connect(remote, invocation.config).await?;
    session
        .run(SyntheticSource::new(CHUNK_COUNT, CHUNK_SIZE))
        .await
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tahoe_udp=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Process entry point for a client binary.
///
/// 客户端二进制的进程入口。
pub async fn main(variant: Variant) -> ExitCode {
    let invocation = match parse(variant, std::env::args_os()) {
        Ok(Some(invocation)) => invocation,
        Ok(None) => {
            println!("{}", variant.usage());
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_tracing();
    match run(invocation).await {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Session failed");
            eprintln!("{}: {e}", variant.program());
            ExitCode::FAILURE
        }
    }
}
