//! Jitter from repeated TCP connection setup times.
//!
//! Each sample is the time taken to establish a connection, a stand-in for
//! round-trip time rather than a payload-level measurement. Attempts run
//! strictly one after another so successive variation stays meaningful.
//!
//! A failed or timed-out attempt records the full timeout as its sample.
//! With partial loss those penalty samples dominate the mean, so a lossy
//! path reports very large jitter.

use log::debug;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;

/// Pause between connection attempts.
pub const ATTEMPT_PAUSE: Duration = Duration::from_millis(100);

/// Mean absolute difference between consecutive samples, 0.0 for fewer than two.
pub fn mean_successive_difference(samples: &[f64]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let total: f64 = samples.windows(2).map(|pair| (pair[1] - pair[0]).abs()).sum();
    total / (samples.len() - 1) as f64
}

/// Time one connection to `host:port`, returning milliseconds.
///
/// Any failure yields the timeout itself.
async fn connect_sample(host: &str, port: u16, timeout: Duration) -> f64 {
    let start = Instant::now();
    match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(stream)) => {
            let elapsed = start.elapsed();
            drop(stream);
            elapsed.as_secs_f64() * 1000.0
        }
        Ok(Err(e)) => {
            debug!("connect to {host}:{port} failed: {e}");
            timeout.as_secs_f64() * 1000.0
        }
        Err(_) => {
            debug!("connect to {host}:{port} timed out after {timeout:?}");
            timeout.as_secs_f64() * 1000.0
        }
    }
}

/// Open `count` sequential connections to `host:port` and return the jitter in ms.
pub async fn measure_jitter(host: &str, port: u16, count: usize, timeout: Duration) -> f64 {
    let mut samples = Vec::with_capacity(count);

    for attempt in 0..count {
        if attempt > 0 {
            tokio::time::sleep(ATTEMPT_PAUSE).await;
        }
        let sample = connect_sample(host, port, timeout).await;
        debug!("jitter sample {}/{}: {:.2} ms", attempt + 1, count, sample);
        samples.push(sample);
    }

    mean_successive_difference(&samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    async fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }

    #[test]
    fn fewer_than_two_samples_is_zero() {
        assert_eq!(mean_successive_difference(&[]), 0.0);
        assert_eq!(mean_successive_difference(&[42.0]), 0.0);
    }

    #[test]
    fn mean_of_absolute_successive_differences() {
        assert_eq!(mean_successive_difference(&[10.0, 12.0, 9.0, 9.0]), (2.0 + 3.0 + 0.0) / 3.0);
    }

    #[test]
    fn single_penalty_sample_dominates() {
        let jitter = mean_successive_difference(&[10.0, 2000.0, 10.0]);
        assert_eq!(jitter, 1990.0);
    }

    #[tokio::test]
    async fn zero_or_one_attempt_yields_zero() {
        let port = closed_port().await;
        let timeout = Duration::from_millis(200);
        assert_eq!(measure_jitter("127.0.0.1", port, 0, timeout).await, 0.0);
        assert_eq!(measure_jitter("127.0.0.1", port, 1, timeout).await, 0.0);
    }

    #[tokio::test]
    async fn uniform_failure_yields_zero_jitter() {
        let port = closed_port().await;
        let jitter = measure_jitter("127.0.0.1", port, 3, Duration::from_millis(250)).await;
        assert_eq!(jitter, 0.0);
    }

    #[tokio::test]
    async fn attempts_are_spaced_by_the_pause() {
        let port = closed_port().await;
        let start = Instant::now();
        measure_jitter("127.0.0.1", port, 4, Duration::from_millis(250)).await;
        assert!(
            start.elapsed() >= 3 * ATTEMPT_PAUSE,
            "four attempts finished in {:?}",
            start.elapsed()
        );
    }

    #[tokio::test]
    async fn partial_failure_is_dominated_by_penalty_samples() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        // Accept the first connection, then stop listening so later attempts are refused.
        let serve_once = tokio::spawn(async move {
            let _ = listener.accept().await;
        });

        let timeout = Duration::from_millis(500);
        let jitter = measure_jitter("127.0.0.1", port, 3, timeout).await;
        let _ = serve_once.await;

        // Samples are [fast, 500, 500]: one jump of nearly 500 ms over two pairs.
        let penalty_ms = timeout.as_secs_f64() * 1000.0;
        assert!(jitter <= penalty_ms / 2.0, "jitter {jitter}");
        assert!(jitter > penalty_ms * 0.4, "jitter {jitter}");
    }

    #[tokio::test]
    async fn reachable_host_yields_small_finite_jitter() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let accept = tokio::spawn(async move {
            loop {
                if listener.accept().await.is_err() {
                    break;
                }
            }
        });

        let jitter = measure_jitter("127.0.0.1", port, 4, Duration::from_secs(2)).await;
        accept.abort();

        assert!(jitter.is_finite());
        assert!(jitter >= 0.0);
        assert!(jitter < 2000.0, "loopback connects should not hit the penalty: {jitter}");
    }
}
