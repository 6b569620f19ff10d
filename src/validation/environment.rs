//! 네트워크 환경별 검증 전략

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::Client;
use url::Url;

use super::format::FormatValidator;
use super::http::{OpenRouterValidator, ScrapeOwlValidator};
use super::{KeyValidator, NetworkEnvironment, ValidationError};
use crate::models::SecretKind;

/// 온라인: 실제 API 호출로 검증
pub struct OnlineEnvironment {
    openrouter: Arc<dyn KeyValidator>,
    scrapeowl: Arc<dyn KeyValidator>,
}

impl OnlineEnvironment {
    pub fn new(
        openrouter_base: Url,
        scrapeowl_base: Url,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            openrouter: Arc::new(OpenRouterValidator::new(client.clone(), openrouter_base)),
            scrapeowl: Arc::new(ScrapeOwlValidator::new(client, scrapeowl_base)),
        })
    }
}

impl NetworkEnvironment for OnlineEnvironment {
    fn validator_for(&self, name: &str) -> Option<Arc<dyn KeyValidator>> {
        match SecretKind::from_name(name)? {
            SecretKind::OpenRouter => Some(self.openrouter.clone()),
            SecretKind::ScrapeOwl => Some(self.scrapeowl.clone()),
        }
    }
}

/// 오프라인일 때 형식 검사로 대체할지 여부
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatFallback {
    /// 검증 불가로 처리 (기본값)
    #[default]
    Deny,
    /// 형식만 맞으면 유효로 처리 (보안 보장이 약해짐)
    Allow,
}

/// 오프라인: 원격 검사를 할 수 없음
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineEnvironment {
    fallback: FormatFallback,
}

impl OfflineEnvironment {
    pub fn new(fallback: FormatFallback) -> Self {
        Self { fallback }
    }
}

struct UnreachableValidator;

impl KeyValidator for UnreachableValidator {
    fn validate<'a>(&'a self, _api_key: &'a str) -> BoxFuture<'a, Result<bool, ValidationError>> {
        Box::pin(async { Err(ValidationError::Unreachable) })
    }
}

struct FallbackValidator(FormatValidator);

impl KeyValidator for FallbackValidator {
    fn validate<'a>(&'a self, api_key: &'a str) -> BoxFuture<'a, Result<bool, ValidationError>> {
        tracing::warn!(
            target: "OfflineEnvironment",
            "network unavailable, accepting API key by format only"
        );
        self.0.validate(api_key)
    }
}

impl NetworkEnvironment for OfflineEnvironment {
    fn validator_for(&self, name: &str) -> Option<Arc<dyn KeyValidator>> {
        let kind = SecretKind::from_name(name)?;
        match self.fallback {
            FormatFallback::Deny => Some(Arc::new(UnreachableValidator)),
            FormatFallback::Allow => Some(Arc::new(FallbackValidator(FormatValidator::new(kind)))),
        }
    }
}
