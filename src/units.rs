use clap::ValueEnum;
use std::fmt;

const KIB: f64 = 1024.0;
const MIB: f64 = KIB * 1024.0;
const GIB: f64 = MIB * 1024.0;

/// Binary size units accepted for a transfer estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SizeUnit {
    #[value(name = "GB")]
    Gb,
    #[value(name = "MB")]
    Mb,
    #[value(name = "KB")]
    Kb,
}

impl SizeUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            SizeUnit::Gb => "GB",
            SizeUnit::Mb => "MB",
            SizeUnit::Kb => "KB",
        }
    }

    /// Strict lookup used by the prompt; unlike [`bytes_from_unit`] it
    /// reports unknown units as `None`.
    pub fn parse(unit: &str) -> Option<Self> {
        match unit.trim().to_ascii_uppercase().as_str() {
            "GB" => Some(SizeUnit::Gb),
            "MB" => Some(SizeUnit::Mb),
            "KB" => Some(SizeUnit::Kb),
            _ => None,
        }
    }
}

impl fmt::Display for SizeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert `size` expressed in `unit` into raw bytes.
///
/// Matching is case-insensitive and accepts short (`g`, `m`, `k`) and long
/// (`gb`, `mb`, `kb`) forms. Anything else, including the empty string, is
/// taken to already be bytes.
pub fn bytes_from_unit(size: f64, unit: &str) -> f64 {
    match unit.trim().to_ascii_lowercase().as_str() {
        "gb" | "g" => size * GIB,
        "mb" | "m" => size * MIB,
        "kb" | "k" => size * KIB,
        _ => size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_multipliers() {
        assert_eq!(bytes_from_unit(1.0, "GB"), 1024f64.powi(3));
        assert_eq!(bytes_from_unit(1.0, "MB"), 1024f64.powi(2));
        assert_eq!(bytes_from_unit(2.0, "KB"), 2048.0);
    }

    #[test]
    fn short_and_mixed_case_forms() {
        assert_eq!(bytes_from_unit(1.0, "g"), 1_073_741_824.0);
        assert_eq!(bytes_from_unit(1.0, "Mb"), 1_048_576.0);
        assert_eq!(bytes_from_unit(3.0, "k"), 3072.0);
        assert_eq!(bytes_from_unit(0.5, "gB"), 536_870_912.0);
    }

    #[test]
    fn unknown_or_empty_unit_is_identity() {
        assert_eq!(bytes_from_unit(5.0, ""), 5.0);
        assert_eq!(bytes_from_unit(5.0, "bytes"), 5.0);
        assert_eq!(bytes_from_unit(7.25, "TB"), 7.25);
    }

    #[test]
    fn strict_parse_rejects_short_forms() {
        assert_eq!(SizeUnit::parse("mb"), Some(SizeUnit::Mb));
        assert_eq!(SizeUnit::parse(" KB "), Some(SizeUnit::Kb));
        assert_eq!(SizeUnit::parse("g"), None);
        assert_eq!(SizeUnit::parse(""), None);
    }
}
