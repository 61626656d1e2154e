use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpeedTestError {
    #[error("malformed server host `{host}`: {reason}")]
    MalformedHost { host: String, reason: String },

    #[error("{endpoint} answered with HTTP {status}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("edge metadata is missing `{0}`")]
    MissingMeta(&'static str),
}

impl SpeedTestError {
    pub fn malformed_host<S: Into<String>>(host: &str, reason: S) -> Self {
        Self::MalformedHost {
            host: host.to_string(),
            reason: reason.into(),
        }
    }
}
