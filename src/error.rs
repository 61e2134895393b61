use resource_service::StatusError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single backend call
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("kube error")]
    Kube(#[from] kube::Error),
    #[error("http error")]
    Http(#[from] reqwest::Error),
    #[error("api error {status}: {message}")]
    Status { status: u16, message: String },
    #[error("json error")]
    Json(#[from] serde_json::Error),
}

impl StatusError for BackendError {
    fn status(&self) -> Option<u16> {
        match self {
            Self::Kube(kube::Error::Api(response)) => Some(response.code),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ServiceError = resource_service::Error<BackendError>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("failed to read {0}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("invalid config {0}")]
    Config(PathBuf, #[source] serde_yaml_with_quirks::Error),
    #[error("invalid state file {0}")]
    State(PathBuf, #[source] serde_json::Error),
    #[error("invalid entry {0:?}, expected KEY=VALUE")]
    InvalidEntry(String),
    #[error("bad url")]
    Url(#[from] url::ParseError),
    #[error("no filtered label at index {0}")]
    NoSuchLabel(usize),
    #[error("edge agent checkin interval must be one of 5, 10 or 30 seconds, got {0}")]
    InvalidCheckinInterval(u32),
}
pub type Result<T> = std::result::Result<T, Error>;
