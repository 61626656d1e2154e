use super::download::DownloadTest;
use super::jitter::measure_jitter;
use super::ping::PingTest;
use super::upload::UploadTest;
use super::{ClientInfo, Server, SpeedService};
use crate::error::SpeedTestError;
use crate::settings::Settings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::info;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::OnceCell;

const META_URL: &str = "https://speed.cloudflare.com/meta";
const EDGE_HOST: &str = "speed.cloudflare.com:443";
const LATENCY_PROBES: usize = 3;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EdgeMeta {
    client_ip: Option<String>,
    as_organization: Option<String>,
    colo: Option<Value>,
    city: Option<String>,
    country: Option<String>,
}

impl EdgeMeta {
    fn client_info(&self) -> ClientInfo {
        ClientInfo {
            isp: self.as_organization.clone().unwrap_or_else(|| "Unknown ISP".to_string()),
            ip: self.client_ip.clone().unwrap_or_else(|| "unknown".to_string()),
        }
    }

    /// The edge serving this client, described as a test server.
    ///
    /// `colo` is either a bare IATA code or an object carrying `iata`,
    /// `city` and `cca2`.
    fn edge_server(&self, latency_ms: f64) -> Result<Server, SpeedTestError> {
        let colo = self.colo.as_ref().ok_or(SpeedTestError::MissingMeta("colo"))?;
        let (name, country) = match colo {
            Value::String(iata) => (iata.clone(), self.country.clone()),
            Value::Object(fields) => {
                let iata = fields
                    .get("iata")
                    .and_then(Value::as_str)
                    .ok_or(SpeedTestError::MissingMeta("colo.iata"))?;
                let name = match fields.get("city").and_then(Value::as_str) {
                    Some(city) => format!("{city} {iata}"),
                    None => iata.to_string(),
                };
                let country = fields
                    .get("cca2")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .or_else(|| self.country.clone());
                (name, country)
            }
            _ => return Err(SpeedTestError::MissingMeta("colo")),
        };

        Ok(Server {
            sponsor: "Cloudflare".to_string(),
            name,
            country: country.unwrap_or_else(|| "??".to_string()),
            distance_km: None,
            host: EDGE_HOST.to_string(),
            latency_ms,
        })
    }
}

/// Measures against the Cloudflare speed test edge.
pub struct CloudflareService {
    settings: Settings,
    client: reqwest::Client,
    meta: OnceCell<EdgeMeta>,
}

impl CloudflareService {
    pub fn new(settings: Settings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            settings,
            client,
            meta: OnceCell::new(),
        })
    }

    async fn fetch_meta(&self) -> Result<EdgeMeta> {
        let response = self.client.get(META_URL).send().await?;
        if !response.status().is_success() {
            return Err(SpeedTestError::Status {
                endpoint: "meta",
                status: response.status(),
            }
            .into());
        }
        let meta: EdgeMeta = response.json().await?;
        if let Some(city) = &meta.city {
            info!("Client located near {}", city);
        }
        Ok(meta)
    }

    async fn meta(&self) -> Result<&EdgeMeta> {
        self.meta
            .get_or_try_init(|| self.fetch_meta())
            .await
            .context("failed to retrieve speed test configuration")
    }
}

#[async_trait]
impl SpeedService for CloudflareService {
    fn banner(&self) -> &'static str {
        "Retrieving speed test configuration..."
    }

    async fn client_info(&self) -> Result<ClientInfo> {
        Ok(self.meta().await?.client_info())
    }

    async fn best_server(&self) -> Result<Server> {
        let meta = self.meta().await?;
        let latency = PingTest::new(LATENCY_PROBES)
            .with_pause(Duration::from_millis(50))
            .run()
            .await?;
        let server = meta.edge_server(latency.min_ms)?;
        info!("Selected server {} ({})", server, server.host);
        Ok(server)
    }

    async fn jitter(&self, server: &Server) -> Result<f64> {
        let Some((host, port)) = server.endpoint()? else {
            return Ok(0.0);
        };
        info!("Sampling jitter against {}:{}", host, port);
        Ok(measure_jitter(
            &host,
            port,
            self.settings.jitter_count,
            self.settings.jitter_timeout,
        )
        .await)
    }

    async fn download(&self) -> Result<f64> {
        let result = DownloadTest::new(self.settings.download_size_bytes())
            .run()
            .await
            .context("download test failed")?;
        Ok(result.bits_per_sec)
    }

    async fn upload(&self) -> Result<f64> {
        let result = UploadTest::new(self.settings.upload_size_bytes())
            .run()
            .await
            .context("upload test failed")?;
        Ok(result.bits_per_sec)
    }

    async fn ping(&self) -> Result<f64> {
        let result = PingTest::new(self.settings.ping_count).run().await?;
        Ok(result.avg_ms)
    }
}
