use super::download::bits_per_sec;
use crate::error::SpeedTestError;
use anyhow::Result;
use log::debug;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};

const UPLOAD_URL: &str = "https://speed.cloudflare.com/__up";
const CHUNK_SIZE: usize = 1_000_000; // 1MB chunks

pub struct UploadTest {
    data: Vec<u8>,
}

impl UploadTest {
    pub fn new(upload_size: usize) -> Self {
        let mut rng = rand::rngs::StdRng::from_entropy();
        let data: Vec<u8> = (0..upload_size).map(|_| rng.gen()).collect();
        Self { data }
    }

    pub async fn run(&self) -> Result<UploadResult> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let start = Instant::now();
        let mut uploaded: usize = 0;

        for chunk in self.data.chunks(CHUNK_SIZE) {
            let response = client.post(UPLOAD_URL).body(chunk.to_vec()).send().await?;
            if !response.status().is_success() {
                return Err(SpeedTestError::Status {
                    endpoint: "upload",
                    status: response.status(),
                }
                .into());
            }
            uploaded += chunk.len();
            debug!("uploaded {}/{} bytes", uploaded, self.data.len());
        }

        Ok(UploadResult {
            bits_per_sec: bits_per_sec(uploaded as u64, start.elapsed()),
        })
    }
}

#[derive(Debug, Clone)]
pub struct UploadResult {
    pub bits_per_sec: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_matches_requested_size() {
        assert_eq!(UploadTest::new(2_500_000).data.len(), 2_500_000);
        assert_eq!(UploadTest::new(2_500_000).data.chunks(CHUNK_SIZE).count(), 3);
    }
}
