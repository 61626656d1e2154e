use anyhow::Result;
use log::debug;
use std::time::{Duration, Instant};

const PING_URL: &str = "https://speed.cloudflare.com/__down?bytes=0";

pub struct PingTest {
    samples: Vec<f64>,
    ping_count: usize,
    pause: Duration,
}

impl PingTest {
    pub fn new(ping_count: usize) -> Self {
        Self {
            samples: Vec::new(),
            ping_count,
            pause: Duration::from_millis(200),
        }
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub async fn run(&mut self) -> Result<PingResult> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;

        self.samples.clear();

        for seq in 0..self.ping_count {
            let start = Instant::now();
            match client.get(PING_URL).send().await {
                Ok(_) => {
                    let elapsed = start.elapsed().as_secs_f64() * 1000.0;
                    debug!("latency probe seq={} time={:.2} ms", seq + 1, elapsed);
                    self.samples.push(elapsed);
                }
                Err(e) => debug!("latency probe seq={} failed: {}", seq + 1, e),
            }

            if seq + 1 < self.ping_count {
                tokio::time::sleep(self.pause).await;
            }
        }

        Ok(self.calculate_result())
    }

    fn calculate_result(&self) -> PingResult {
        summarize(&self.samples)
    }
}

fn summarize(samples: &[f64]) -> PingResult {
    if samples.is_empty() {
        return PingResult { avg_ms: 0.0, min_ms: 0.0 };
    }

    let avg = samples.iter().sum::<f64>() / samples.len() as f64;
    let min = samples.iter().copied().fold(f64::INFINITY, f64::min);

    PingResult { avg_ms: avg, min_ms: min }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PingResult {
    pub avg_ms: f64,
    pub min_ms: f64,
}
