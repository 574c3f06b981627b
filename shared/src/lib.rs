// shared/src/lib.rs

use std::time::Duration;

/// Input-shape violations. Always caused by the caller, never retried.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("content cannot be empty")]
    EmptyContent,
    #[error("lifetime must be a positive number of seconds, got {0}")]
    NonPositiveLifetime(i64),
    #[error("paste id is missing")]
    MissingId,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),
    #[error("not found")]
    NotFound,
    #[error("backend: {0}")]
    Backend(String),
    #[error("serialization: {0}")]
    Serialization(String),
    #[error("config: {0}")]
    Config(String),
}

impl Error {
    /// Outcomes a caller can fix by changing its request.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::NotFound)
    }

    /// Server-side faults. Safe to retry at the caller's discretion.
    pub fn is_backend_fault(&self) -> bool {
        matches!(self, Error::Backend(_) | Error::Serialization(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Time-to-live in whole seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct TtlSecs(pub u64);

impl TtlSecs {
    pub fn as_duration(self) -> Duration {
        Duration::from_secs(self.0)
    }
}

impl TryFrom<i64> for TtlSecs {
    type Error = ValidationError;

    fn try_from(secs: i64) -> std::result::Result<Self, Self::Error> {
        if secs <= 0 {
            return Err(ValidationError::NonPositiveLifetime(secs));
        }
        Ok(TtlSecs(secs as u64))
    }
}

pub mod config;
