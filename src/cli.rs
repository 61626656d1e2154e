use crate::estimate::Direction;
use crate::settings::Settings;
use crate::units::SizeUnit;
use clap::builder::RangedU64ValueParser;
use clap::{value_parser, ArgAction, Parser};
use std::time::Duration;

/// Longest accepted per-connection jitter timeout, in seconds.
const MAX_JITTER_TIMEOUT_SECS: f64 = 3600.0;

/// Run an internet speed test and optionally estimate transfer time
#[derive(Parser, Debug, Clone)]
#[command(name = "netestimate", version, about, long_about = None)]
pub struct Cli {
    /// Run a simulated test (no network)
    #[arg(long)]
    pub simulate: bool,

    /// File size to estimate (numeric)
    #[arg(long)]
    pub size: Option<f64>,

    /// Unit for --size
    #[arg(long, value_enum, ignore_case = true, default_value_t = SizeUnit::Gb)]
    pub unit: SizeUnit,

    /// Estimate direction
    #[arg(long, value_enum, default_value_t = Direction::Both)]
    pub direction: Direction,

    /// TCP connection attempts used to sample jitter
    #[arg(
        long,
        env = "NETESTIMATE_JITTER_COUNT",
        default_value_t = 10,
        value_parser = RangedU64ValueParser::<usize>::new().range(0..=1000)
    )]
    pub jitter_count: usize,

    /// Per-connection timeout for jitter sampling (in seconds)
    #[arg(
        long,
        env = "NETESTIMATE_JITTER_TIMEOUT",
        default_value = "2",
        value_parser = parse_timeout
    )]
    pub jitter_timeout: Duration,

    /// Latency probes sent to the test server
    #[arg(
        long,
        env = "NETESTIMATE_PING_COUNT",
        default_value_t = 10,
        value_parser = RangedU64ValueParser::<usize>::new().range(0..=1000)
    )]
    pub ping_count: usize,

    /// Payload fetched by the download test (in MB)
    #[arg(
        long,
        env = "NETESTIMATE_DOWNLOAD_SIZE_MB",
        default_value_t = 25,
        value_parser = value_parser!(u64).range(1..=10_000)
    )]
    pub download_size_mb: u64,

    /// Payload sent by the upload test (in MB)
    #[arg(
        long,
        env = "NETESTIMATE_UPLOAD_SIZE_MB",
        default_value_t = 10,
        value_parser = value_parser!(u64).range(1..=10_000)
    )]
    pub upload_size_mb: u64,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn settings(&self) -> Settings {
        Settings {
            simulate: self.simulate,
            ping_count: self.ping_count,
            jitter_count: self.jitter_count,
            jitter_timeout: self.jitter_timeout,
            download_size_mb: self.download_size_mb,
            upload_size_mb: self.upload_size_mb,
        }
    }

    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        }
    }
}

/// Parse a timeout in (fractional) seconds, rejecting negative, non-finite
/// and oversized values.
fn parse_timeout(arg: &str) -> Result<Duration, String> {
    let secs: f64 = arg
        .trim()
        .parse()
        .map_err(|_| format!("`{arg}` is not a number of seconds"))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(format!("timeout must be a finite, non-negative number of seconds, got `{arg}`"));
    }
    if secs > MAX_JITTER_TIMEOUT_SECS {
        return Err(format!("timeout must be at most {MAX_JITTER_TIMEOUT_SECS} seconds, got `{arg}`"));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| e.to_string())
}
