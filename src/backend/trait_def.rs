use crate::models::{Credential, Handle, Period, StatsResult, VisitEvent};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("invalid backend URL '{0}'")]
    InvalidUrl(String),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type BackendResult<T> = Result<T, BackendError>;

/// The two Backend API calls the analytics core depends on
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// Submit one visit event; the response body is ignored
    async fn record_visit(&self, event: &VisitEvent) -> BackendResult<()>;

    /// Fetch the aggregated statistics for a handle and period
    async fn fetch_stats(
        &self,
        handle: &Handle,
        period: Period,
        credential: Option<&Credential>,
    ) -> BackendResult<StatsResult>;
}
