use crate::error::SpeedTestError;
use anyhow::Result;
use futures::StreamExt;
use log::debug;
use std::time::{Duration, Instant};

const DOWNLOAD_URL: &str = "https://speed.cloudflare.com/__down";

pub struct DownloadTest {
    download_size: u64,
}

impl DownloadTest {
    pub fn new(download_size: u64) -> Self {
        Self { download_size }
    }

    pub async fn run(&self) -> Result<DownloadResult> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let url = format!("{}?bytes={}", DOWNLOAD_URL, self.download_size);
        let response = client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(SpeedTestError::Status {
                endpoint: "download",
                status: response.status(),
            }
            .into());
        }
        let mut stream = response.bytes_stream();

        let start = Instant::now();
        let mut downloaded: u64 = 0;
        let mut last_update = Instant::now();
        let mut last_downloaded: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            downloaded += chunk.len() as u64;

            let now = Instant::now();
            let interval = now.duration_since(last_update);

            if interval >= Duration::from_millis(500) {
                let bytes_delta = downloaded - last_downloaded;
                let mbps = (bytes_delta as f64 * 8.0) / interval.as_secs_f64() / 1_000_000.0;
                debug!("download {} bytes so far, {:.2} Mbit/s", downloaded, mbps);

                last_update = now;
                last_downloaded = downloaded;
            }
        }

        Ok(DownloadResult {
            bits_per_sec: bits_per_sec(downloaded, start.elapsed()),
        })
    }
}

pub(crate) fn bits_per_sec(bytes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0.0;
    }
    bytes as f64 * 8.0 / secs
}

#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub bits_per_sec: f64,
}
