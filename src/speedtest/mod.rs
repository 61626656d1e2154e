pub mod cloudflare;
pub mod download;
pub mod jitter;
pub mod ping;
pub mod simulated;
pub mod upload;

use crate::error::SpeedTestError;
use crate::settings::Settings;
use anyhow::Result;
use async_trait::async_trait;
use std::fmt;

pub use cloudflare::CloudflareService;
pub use simulated::SimulatedService;

/// Port assumed when a server host carries none.
pub const DEFAULT_PORT: u16 = 80;

/// Figures gathered by one run, handed to the estimator.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeasurementSnapshot {
    pub download_mbps: f64,
    pub upload_mbps: f64,
    pub ping_ms: f64,
    pub jitter_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestPhase {
    Jitter,
    Download,
    Upload,
}

impl TestPhase {
    pub fn label(self) -> &'static str {
        match self {
            TestPhase::Jitter => "Measuring jitter",
            TestPhase::Download => "Testing download speed",
            TestPhase::Upload => "Testing upload speed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientInfo {
    pub isp: String,
    pub ip: String,
}

/// The server the test runs against.
#[derive(Debug, Clone, PartialEq)]
pub struct Server {
    pub sponsor: String,
    pub name: String,
    pub country: String,
    pub distance_km: Option<f64>,
    /// `host[:port]`; empty when there is nothing to dial.
    pub host: String,
    pub latency_ms: f64,
}

impl Server {
    /// Split `host` into an address and port, defaulting to port 80.
    ///
    /// Returns `Ok(None)` when there is no host to dial.
    pub fn endpoint(&self) -> Result<Option<(String, u16)>, SpeedTestError> {
        let host = self.host.trim();
        if host.is_empty() {
            return Ok(None);
        }
        match host.rsplit_once(':') {
            Some((addr, _)) if addr.is_empty() => {
                Err(SpeedTestError::malformed_host(host, "missing address"))
            }
            Some((addr, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|e| SpeedTestError::malformed_host(host, format!("bad port: {e}")))?;
                let addr = addr.trim_start_matches('[').trim_end_matches(']');
                Ok(Some((addr.to_string(), port)))
            }
            None => Ok(Some((host.to_string(), DEFAULT_PORT))),
        }
    }
}

impl fmt::Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({}, {})", self.sponsor, self.name, self.country)?;
        if let Some(distance) = self.distance_km {
            write!(f, " [{distance} km]")?;
        }
        Ok(())
    }
}

/// Source of bandwidth and latency figures.
///
/// Throughput is reported in bits per second, latencies in milliseconds.
#[async_trait]
pub trait SpeedService: Send + Sync {
    fn banner(&self) -> &'static str;

    async fn client_info(&self) -> Result<ClientInfo>;

    async fn best_server(&self) -> Result<Server>;

    async fn jitter(&self, server: &Server) -> Result<f64>;

    async fn download(&self) -> Result<f64>;

    async fn upload(&self) -> Result<f64>;

    async fn ping(&self) -> Result<f64>;
}

pub fn select_service(settings: &Settings) -> Result<Box<dyn SpeedService>> {
    if settings.simulate {
        Ok(Box::new(SimulatedService::default()))
    } else {
        Ok(Box::new(CloudflareService::new(settings.clone())?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(host: &str) -> Server {
        Server {
            sponsor: "Sponsor".into(),
            name: "City".into(),
            country: "Land".into(),
            distance_km: None,
            host: host.into(),
            latency_ms: 0.0,
        }
    }

    #[test]
    fn endpoint_with_port() {
        assert_eq!(
            server("speed.example.net:8080").endpoint().unwrap(),
            Some(("speed.example.net".to_string(), 8080))
        );
    }

    #[test]
    fn bracketed_ipv6_endpoint() {
        assert_eq!(
            server("[::1]:8080").endpoint().unwrap(),
            Some(("::1".to_string(), 8080))
        );
    }

    #[test]
    fn endpoint_defaults_to_port_80() {
        assert_eq!(
            server("speed.example.net").endpoint().unwrap(),
            Some(("speed.example.net".to_string(), 80))
        );
    }

    #[test]
    fn empty_host_has_no_endpoint() {
        assert_eq!(server("").endpoint().unwrap(), None);
        assert_eq!(server("  ").endpoint().unwrap(), None);
    }

    #[test]
    fn malformed_ports_are_rejected() {
        for host in ["example.net:http", "example.net:70000", ":443", "example.net:"] {
            let err = server(host).endpoint().unwrap_err();
            assert!(matches!(err, SpeedTestError::MalformedHost { .. }), "{host}");
        }
    }

    #[test]
    fn display_includes_known_distance() {
        let mut s = server("");
        assert_eq!(s.to_string(), "Sponsor (City, Land)");
        s.distance_km = Some(5.0);
        assert_eq!(s.to_string(), "Sponsor (City, Land) [5 km]");
    }

    #[test]
    fn simulate_flag_selects_simulated_service() {
        let settings = Settings {
            simulate: true,
            ..Settings::default()
        };
        let service = select_service(&settings).unwrap();
        assert_eq!(service.banner(), "Running in simulate mode (no network)");
    }
}
