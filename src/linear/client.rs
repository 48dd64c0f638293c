use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub const DEFAULT_ENDPOINT: &str = "https://api.linear.app/graphql";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A Linear API client bound to one endpoint and API key.
pub struct LinearClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl LinearClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("linctl/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST a GraphQL payload and decode the JSON body.
    ///
    /// Linear reports GraphQL-level failures (bad filter, rate limit) as
    /// HTTP 400 with an `errors` array, so such bodies are decoded and left
    /// to the caller. Any other non-success status is an error.
    pub async fn graphql<P, R>(&self, payload: &P) -> Result<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .http
            .post(&self.endpoint)
            .header(AUTHORIZATION, self.api_key.as_str())
            .json(payload)
            .send()
            .await
            .with_context(|| format!("sending GraphQL request to {}", self.endpoint))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("reading GraphQL response body")?;
        tracing::debug!("graphql: HTTP {status}, {} bytes", body.len());

        if !status.is_success() && status != StatusCode::BAD_REQUEST {
            bail!(
                "Linear API request failed with HTTP status code: {}",
                status.as_u16()
            );
        }

        serde_json::from_str(&body).with_context(|| {
            format!(
                "decoding GraphQL response (HTTP status code: {})",
                status.as_u16()
            )
        })
    }
}
