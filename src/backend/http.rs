use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Url};
use serde::Serialize;
use tracing::{debug, warn};

use crate::backend::{BackendApi, BackendError, BackendResult};
use crate::config::BackendConfig;
use crate::models::{Credential, Handle, Period, StatsResult, VisitEvent};

/// Backend API client over HTTP
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    retries: u32,
    retry_delay: Duration,
}

#[derive(Debug, Serialize)]
struct VisitPayload<'a> {
    referrer: Option<&'a str>,
}

impl HttpBackend {
    pub fn from_config(config: &BackendConfig) -> BackendResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|_| BackendError::InvalidUrl(config.base_url.clone()))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::InvalidUrl(config.base_url.clone()));
        }

        let client = Client::builder()
            .user_agent(concat!("linkstats/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| BackendError::Transport {
                url: config.base_url.clone(),
                source,
            })?;

        Ok(Self {
            client,
            base_url,
            retries: config.retries,
            retry_delay: config.retry_delay(),
        })
    }

    /// `{base}/profile/{handle}/{action}` with the handle as one encoded segment
    fn profile_url(&self, handle: &Handle, action: &str) -> BackendResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["profile", handle.as_str(), action]);
        Ok(url)
    }

    fn stats_url(&self, handle: &Handle, period: Period) -> BackendResult<Url> {
        let mut url = self.profile_url(handle, "stats")?;
        url.query_pairs_mut().append_pair("period", period.as_str());
        Ok(url)
    }

    async fn send(request: RequestBuilder, url: &Url) -> BackendResult<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(|source| BackendError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                url: url.to_string(),
                status,
            });
        }

        Ok(response)
    }

    async fn fetch_stats_once(
        &self,
        url: &Url,
        credential: Option<&Credential>,
    ) -> BackendResult<StatsResult> {
        let request = with_credential(self.client.get(url.clone()), credential);
        let response = Self::send(request, url).await?;

        let body = response
            .bytes()
            .await
            .map_err(|source| BackendError::Transport {
                url: url.to_string(),
                source,
            })?;

        serde_json::from_slice(&body).map_err(|source| BackendError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

fn with_credential(request: RequestBuilder, credential: Option<&Credential>) -> RequestBuilder {
    match credential {
        Some(credential) => request.header(header::AUTHORIZATION, credential.bearer_value()),
        None => request,
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn record_visit(&self, event: &VisitEvent) -> BackendResult<()> {
        let url = self.profile_url(&event.handle, "visit")?;
        let payload = VisitPayload {
            referrer: event.referrer.as_deref(),
        };

        let request = with_credential(
            self.client.post(url.clone()).json(&payload),
            event.credential.as_ref(),
        );
        Self::send(request, &url).await?;

        Ok(())
    }

    async fn fetch_stats(
        &self,
        handle: &Handle,
        period: Period,
        credential: Option<&Credential>,
    ) -> BackendResult<StatsResult> {
        let url = self.stats_url(handle, period)?;

        let mut attempt = 0;
        loop {
            match self.fetch_stats_once(&url, credential).await {
                Ok(stats) => return Ok(stats),
                Err(err) if attempt < self.retries => {
                    attempt += 1;
                    debug!(
                        handle = %handle,
                        period = %period,
                        attempt,
                        error = %err,
                        "stats request failed, retrying"
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(err) => {
                    warn!(handle = %handle, period = %period, error = %err, "stats request failed");
                    return Err(err);
                }
            }
        }
    }
}
