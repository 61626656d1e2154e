//! Projection of transfer duration from a measured throughput.

use clap::ValueEnum;
use std::fmt;

/// Share of throughput left after framing and protocol overhead.
pub const PROTOCOL_OVERHEAD: f64 = 0.98;

/// Jitter never removes more than this share of effective throughput.
pub const MAX_JITTER_RATIO: f64 = 0.5;

const EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Direction {
    Download,
    Upload,
    Both,
}

impl Direction {
    pub fn includes_download(self) -> bool {
        matches!(self, Direction::Download | Direction::Both)
    }

    pub fn includes_upload(self) -> bool {
        matches!(self, Direction::Upload | Direction::Both)
    }

    pub fn parse(direction: &str) -> Option<Self> {
        match direction.trim().to_ascii_lowercase().as_str() {
            "download" => Some(Direction::Download),
            "upload" => Some(Direction::Upload),
            "both" => Some(Direction::Both),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Download => "download",
            Direction::Upload => "upload",
            Direction::Both => "both",
        })
    }
}

/// Payload the user wants an estimate for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferRequest {
    pub size_bytes: f64,
    pub direction: Direction,
}

/// Fraction of throughput attributed to jitter, capped at [`MAX_JITTER_RATIO`].
///
/// Zero when both inputs are zero.
pub fn jitter_ratio(ping_ms: f64, jitter_ms: f64) -> f64 {
    if ping_ms + jitter_ms <= 0.0 {
        return 0.0;
    }
    (jitter_ms / (ping_ms + jitter_ms + EPSILON)).min(MAX_JITTER_RATIO)
}

/// Throughput used for estimation after the jitter and overhead corrections.
pub fn effective_mbps(speed_mbps: f64, ping_ms: f64, jitter_ms: f64) -> f64 {
    speed_mbps * (1.0 - jitter_ratio(ping_ms, jitter_ms)) * PROTOCOL_OVERHEAD
}

/// Expected seconds to move `size_bytes` at `speed_mbps` (decimal megabits).
///
/// Returns `f64::INFINITY` when the throughput is not positive.
pub fn estimate_time_seconds(size_bytes: f64, speed_mbps: f64, ping_ms: f64, jitter_ms: f64) -> f64 {
    if speed_mbps <= 0.0 {
        return f64::INFINITY;
    }
    let bytes_per_sec = effective_mbps(speed_mbps, ping_ms, jitter_ms) * 1_000_000.0 / 8.0;
    size_bytes / bytes_per_sec
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_bytes_take_no_time() {
        assert_eq!(estimate_time_seconds(0.0, 100.0, 10.0, 2.0), 0.0);
    }

    #[test]
    fn non_positive_speed_is_unbounded() {
        assert_eq!(estimate_time_seconds(1.0, 0.0, 10.0, 2.0), f64::INFINITY);
        assert_eq!(estimate_time_seconds(1e9, -5.0, 0.0, 0.0), f64::INFINITY);
    }

    #[test]
    fn no_latency_means_no_jitter_correction() {
        assert_eq!(jitter_ratio(0.0, 0.0), 0.0);
        let secs = estimate_time_seconds(12_250_000.0, 100.0, 0.0, 0.0);
        assert!((secs - 1.0).abs() < 1e-9, "got {secs}");
    }

    #[test]
    fn jitter_dominating_ping_hits_the_cap() {
        assert_eq!(jitter_ratio(0.0, 50.0), MAX_JITTER_RATIO);
        assert_eq!(jitter_ratio(1.0, 1_000.0), MAX_JITTER_RATIO);
        assert_eq!(effective_mbps(100.0, 0.0, 50.0), 100.0 * 0.5 * PROTOCOL_OVERHEAD);
    }

    #[test]
    fn one_gibibyte_over_hundred_megabit_link() {
        let size = 1_073_741_824.0;
        let ratio = jitter_ratio(10.0, 2.0);
        assert!((ratio - 2.0 / 12.0).abs() < 1e-6);

        let secs = estimate_time_seconds(size, 100.0, 10.0, 2.0);
        assert!((secs - 105.18).abs() < 0.05, "got {secs}");
        assert_eq!(secs.round(), 105.0);
    }

    #[test]
    fn direction_parsing() {
        assert_eq!(Direction::parse(" Upload "), Some(Direction::Upload));
        assert_eq!(Direction::parse("BOTH"), Some(Direction::Both));
        assert_eq!(Direction::parse("down"), None);
        assert!(Direction::Both.includes_download() && Direction::Both.includes_upload());
        assert!(!Direction::Upload.includes_download());
    }

    proptest! {
        #[test]
        fn ratio_never_exceeds_cap(ping in 0.0f64..1_000.0, jitter in 0.0f64..10_000.0) {
            let ratio = jitter_ratio(ping, jitter);
            prop_assert!(ratio >= 0.0);
            prop_assert!(ratio <= MAX_JITTER_RATIO);
        }

        #[test]
        fn more_jitter_never_speeds_up_transfer(
            ping in 0.0f64..500.0,
            jitter in 0.0f64..500.0,
            extra in 0.0f64..500.0,
        ) {
            let calm = estimate_time_seconds(1e8, 50.0, ping, jitter);
            let noisy = estimate_time_seconds(1e8, 50.0, ping, jitter + extra);
            prop_assert!(noisy >= calm - 1e-9);
        }

        #[test]
        fn capped_jitter_stops_changing_estimate(jitter in 1.0f64..10_000.0, extra in 0.0f64..10_000.0) {
            let at_cap = estimate_time_seconds(1e8, 50.0, 0.0, jitter);
            let beyond = estimate_time_seconds(1e8, 50.0, 0.0, jitter + extra);
            prop_assert_eq!(at_cap, beyond);
        }
    }
}
