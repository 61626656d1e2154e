use super::{ClientInfo, Server, SpeedService};
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Fixed figures for running without a network.
#[derive(Debug, Clone)]
pub struct SimulatedService {
    pub download_mbps: f64,
    pub upload_mbps: f64,
    pub ping_ms: f64,
    pub jitter_ms: f64,
    /// Pause per throughput phase so the spinner is visible.
    pub phase_delay: Duration,
}

impl Default for SimulatedService {
    fn default() -> Self {
        Self {
            download_mbps: 100.0,
            upload_mbps: 20.0,
            ping_ms: 10.0,
            jitter_ms: 2.0,
            phase_delay: Duration::from_millis(300),
        }
    }
}

#[async_trait]
impl SpeedService for SimulatedService {
    fn banner(&self) -> &'static str {
        "Running in simulate mode (no network)"
    }

    async fn client_info(&self) -> Result<ClientInfo> {
        Ok(ClientInfo {
            isp: "Simulated ISP".to_string(),
            ip: "0.0.0.0".to_string(),
        })
    }

    async fn best_server(&self) -> Result<Server> {
        Ok(Server {
            sponsor: "SimHost".to_string(),
            name: "SimCity".to_string(),
            country: "SimLand".to_string(),
            distance_km: Some(5.0),
            host: String::new(),
            latency_ms: self.ping_ms,
        })
    }

    async fn jitter(&self, _server: &Server) -> Result<f64> {
        Ok(self.jitter_ms)
    }

    async fn download(&self) -> Result<f64> {
        tokio::time::sleep(self.phase_delay).await;
        Ok(self.download_mbps * 1_000_000.0)
    }

    async fn upload(&self) -> Result<f64> {
        tokio::time::sleep(self.phase_delay).await;
        Ok(self.upload_mbps * 1_000_000.0)
    }

    async fn ping(&self) -> Result<f64> {
        Ok(self.ping_ms)
    }
}
