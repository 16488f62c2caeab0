// Gateway trait for remote launch data access
use crate::domain::launch::LaunchRecord;
use crate::domain::window::{DateWindow, WindowError};
use async_trait::async_trait;
use thiserror::Error;

/// One page of normalized launches plus the total the source reports
/// for the whole window.
#[derive(Debug, Clone, Default)]
pub struct LaunchPage {
    pub records: Vec<LaunchRecord>,
    pub total_count: usize,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("could not build launch query: {0}")]
    Query(#[from] WindowError),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to launch API failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("launch API responded with status {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("launch API body is not valid JSON: {0}")]
    MalformedBody(#[from] serde_json::Error),
    #[error("missing field `{field}` in {location}")]
    MissingField { location: String, field: String },
    #[error("invalid field `{field}` in {location}: {reason}")]
    InvalidField {
        location: String,
        field: String,
        reason: String,
    },
    #[error("page at offset {offset} returned {returned} launches but the reported total is {count}")]
    PageOverrun {
        offset: usize,
        returned: usize,
        count: usize,
    },
}

impl FetchError {
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport(_))
    }

    pub fn is_format(&self) -> bool {
        matches!(self, FetchError::Format(_))
    }
}

#[async_trait]
pub trait LaunchGateway: Send + Sync {
    /// Fetch the launches of `window` starting at `offset`.
    async fn fetch_page(&self, window: &DateWindow, offset: usize) -> Result<LaunchPage, FetchError>;
}
