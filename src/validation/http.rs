//! HTTP 기반 API 키 검증
//!
//! - OpenRouter: `GET /api/v1/auth/key` (Bearer), 200이면 유효
//! - ScrapeOwl: `GET /v1/usage?api_key=...`, 2xx이면 유효

use futures::future::BoxFuture;
use reqwest::{Client, StatusCode};
use url::Url;

use super::{KeyValidator, ValidationError};

pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai";
pub const SCRAPEOWL_BASE_URL: &str = "https://api.scrapeowl.com";

fn endpoint(base: &Url, path: &str) -> String {
    format!("{}/{}", base.as_str().trim_end_matches('/'), path)
}

fn map_transport_error(err: reqwest::Error) -> ValidationError {
    if err.is_connect() || err.is_timeout() {
        ValidationError::Unreachable
    } else {
        ValidationError::Network(err.to_string())
    }
}

/// OpenRouter API 키 검증
#[derive(Debug, Clone)]
pub struct OpenRouterValidator {
    client: Client,
    base_url: Url,
}

impl OpenRouterValidator {
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    async fn check(&self, api_key: &str) -> Result<bool, ValidationError> {
        let resp = self
            .client
            .get(endpoint(&self.base_url, "api/v1/auth/key"))
            .bearer_auth(api_key)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = resp.status();
        tracing::debug!(target: "OpenRouterValidator", %status, "key check finished");
        Ok(status == StatusCode::OK)
    }
}

impl KeyValidator for OpenRouterValidator {
    fn validate<'a>(&'a self, api_key: &'a str) -> BoxFuture<'a, Result<bool, ValidationError>> {
        Box::pin(self.check(api_key))
    }
}

/// ScrapeOwl API 키 검증
#[derive(Debug, Clone)]
pub struct ScrapeOwlValidator {
    client: Client,
    base_url: Url,
}

impl ScrapeOwlValidator {
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    async fn check(&self, api_key: &str) -> Result<bool, ValidationError> {
        let resp = self
            .client
            .get(endpoint(&self.base_url, "v1/usage"))
            .query(&[("api_key", api_key)])
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = resp.status();
        tracing::debug!(target: "ScrapeOwlValidator", %status, "key check finished");
        Ok(status.is_success())
    }
}

impl KeyValidator for ScrapeOwlValidator {
    fn validate<'a>(&'a self, api_key: &'a str) -> BoxFuture<'a, Result<bool, ValidationError>> {
        Box::pin(self.check(api_key))
    }
}
