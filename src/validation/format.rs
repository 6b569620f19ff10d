//! 형식 기반 API 키 검사 (네트워크 없이)
//!
//! 키가 "그럴듯한 모양"인지만 확인하므로 실제 유효성을 보장하지 않습니다.
//! [`super::FormatFallback::Allow`]로 명시적으로 켠 경우에만 사용됩니다.

use futures::future::BoxFuture;

use super::{KeyValidator, ValidationError};
use crate::models::SecretKind;

const OPENROUTER_PREFIX: &str = "sk-or-v1-";
const OPENROUTER_MIN_BODY_LEN: usize = 20;
const SCRAPEOWL_MIN_LEN: usize = 16;

#[derive(Debug, Clone, Copy)]
pub struct FormatValidator {
    kind: SecretKind,
}

impl FormatValidator {
    pub fn new(kind: SecretKind) -> Self {
        Self { kind }
    }

    pub fn matches(&self, api_key: &str) -> bool {
        let api_key = api_key.trim();
        match self.kind {
            SecretKind::OpenRouter => api_key.strip_prefix(OPENROUTER_PREFIX).is_some_and(|body| {
                body.len() >= OPENROUTER_MIN_BODY_LEN
                    && body
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            }),
            SecretKind::ScrapeOwl => {
                api_key.len() >= SCRAPEOWL_MIN_LEN
                    && api_key.chars().all(|c| c.is_ascii_alphanumeric())
            }
        }
    }
}

impl KeyValidator for FormatValidator {
    fn validate<'a>(&'a self, api_key: &'a str) -> BoxFuture<'a, Result<bool, ValidationError>> {
        let matches = self.matches(api_key);
        Box::pin(async move { Ok(matches) })
    }
}
