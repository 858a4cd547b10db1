//! Single-attempt page fetching.
//!
//! [`PageFetcher`] owns one `reqwest::Client` configured with a browser
//! user-agent and a request timeout. Each call performs exactly one GET;
//! there is no retry policy.

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

use crate::config::FetchConfig;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

#[derive(Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        Self::with_timeout(&config.user_agent, Duration::from_secs(config.timeout_secs))
    }

    pub fn with_timeout(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }

    /// GETs `url` and returns the body text of a 2xx response.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self.checked(self.client.get(url), url).await?;
        response.text().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })
    }

    /// POSTs `body` as JSON and decodes a JSON response.
    pub async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, FetchError>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.checked(self.client.post(url).json(body), url).await?;
        response.json().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })
    }

    async fn checked(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<reqwest::Response, FetchError> {
        let response = request
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(response)
    }
}
