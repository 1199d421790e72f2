// File: ./src/error.rs
// Error taxonomy shared by the composition core and its collaborators.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    /// A data source was unreachable or rejected the request.
    #[error("UPSTREAM: {service}: {message}")]
    Upstream { service: String, message: String },
    /// Credentials are missing, invalid or could not be refreshed.
    #[error("AUTH: {service}: {message}")]
    Auth { service: String, message: String },
    /// An internal layout invariant was violated (e.g. a duplicate bookmark).
    #[error("LAYOUT: {0}")]
    Layout(String),
    #[error("IO_FAILURE: {0}")]
    Io(String),
    #[error("SYNC: {0}")]
    Sync(String),
    #[error("CONFIG: {0}")]
    Config(String),
}

impl PlannerError {
    pub fn upstream(service: &str, message: impl Into<String>) -> Self {
        Self::Upstream {
            service: service.to_string(),
            message: message.into(),
        }
    }

    pub fn auth(service: &str, message: impl Into<String>) -> Self {
        Self::Auth {
            service: service.to_string(),
            message: message.into(),
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }
}

impl From<std::io::Error> for PlannerError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<serde_json::Error> for PlannerError {
    fn from(value: serde_json::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<anyhow::Error> for PlannerError {
    fn from(value: anyhow::Error) -> Self {
        Self::Io(value.to_string())
    }
}

pub type PlannerResult<T> = Result<T, PlannerError>;
