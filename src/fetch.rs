use std::{future::Future, num::NonZeroU32, sync::Arc};

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::{
    config::FetchConfig,
    error::{AppError, AppResult},
};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with {status}")]
    Status { url: String, status: StatusCode },
}

impl FetchError {
    /// Transport failures, timeouts, 408, 429 and 5xx are worth another attempt.
    /// Any other status means the request itself is wrong.
    pub fn is_retriable(&self) -> bool {
        match self {
            FetchError::Transport { source, .. } => !source.is_builder(),
            FetchError::Status { status, .. } => {
                status.is_server_error()
                    || *status == StatusCode::REQUEST_TIMEOUT
                    || *status == StatusCode::TOO_MANY_REQUESTS
            },
        }
    }
}

/// Runs `op` until it succeeds, fails with a non-retriable error, or
/// `max_attempts` is used up. The last error is returned unchanged.
pub async fn retry<T, F, Fut>(config: &FetchConfig, url: &str, mut op: F) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        let err = match op().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if attempt >= max_attempts || !err.is_retriable() {
            return Err(err);
        }

        let delay = config.backoff_for(attempt - 1);
        warn!(
            attempt = attempt,
            delay_ms = delay.as_millis() as u64,
            url = %url,
            error = %err,
            "catalog request failed, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}

pub struct RetryingFetcher {
    client: reqwest::Client,
    access_token: String,
    config: FetchConfig,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl RetryingFetcher {
    pub fn new(
        client: reqwest::Client,
        access_token: String,
        config: FetchConfig,
        rps: u32,
    ) -> Self {
        if access_token.trim().is_empty() {
            warn!("no TMDB_ACCESS_TOKEN provided, catalog requests will be unauthenticated");
        }

        let quota = Quota::per_second(NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN));
        let limiter = Arc::new(RateLimiter::direct(quota));
        Self { client, access_token, config, limiter }
    }

    pub async fn fetch(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        retry(&self.config, url, move || async move {
            self.limiter.until_ready().await;

            let resp = self
                .client
                .get(url)
                .bearer_auth(&self.access_token)
                .timeout(self.config.timeout())
                .send()
                .await
                .map_err(|source| FetchError::Transport { url: url.to_string(), source })?;

            let status = resp.status();
            if !status.is_success() {
                return Err(FetchError::Status { url: url.to_string(), status });
            }
            Ok(resp)
        })
        .await
    }

    /// Fetches and decodes a JSON body. Decoding is not retried.
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> AppResult<T> {
        let resp = self.fetch(url).await?;
        resp.json()
            .await
            .map_err(|source| AppError::MalformedResponse { url: url.to_string(), source })
    }
}
