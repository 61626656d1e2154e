use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Settings {
    pub simulate: bool,
    pub ping_count: usize,
    pub jitter_count: usize,
    pub jitter_timeout: Duration,
    pub download_size_mb: u64,
    pub upload_size_mb: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            simulate: false,
            ping_count: 10,
            jitter_count: 10,
            jitter_timeout: Duration::from_secs(2),
            download_size_mb: 25,
            upload_size_mb: 10,
        }
    }
}

impl Settings {
    pub fn download_size_bytes(&self) -> u64 {
        self.download_size_mb.saturating_mul(1_000_000)
    }

    pub fn upload_size_bytes(&self) -> usize {
        usize::try_from(self.upload_size_mb.saturating_mul(1_000_000)).unwrap_or(usize::MAX)
    }
}
