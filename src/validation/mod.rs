//! API 키 유효성 검증 모듈
//!
//! - [`KeyValidator`]: 키 하나가 지금 살아있는지 확인하는 비동기 검사
//! - [`NetworkEnvironment`]: 시크릿 이름별로 어떤 검사를 쓸지 결정하는 전략
//!
//! 온라인이면 실제 API를 호출하고([`http`]), 오프라인이면 정책에 따라
//! 형식 검사로 대체하거나([`format`]) 검증 불가로 처리합니다.

pub mod environment;
pub mod format;
pub mod http;

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

pub use environment::{FormatFallback, OfflineEnvironment, OnlineEnvironment};
pub use format::FormatValidator;
pub use http::{OpenRouterValidator, ScrapeOwlValidator};

/// 검증 오류 (네트워크 문제 등, "키가 틀렸다"와는 구분)
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Validation service unreachable")]
    Unreachable,
}

/// 원격 유효성 검사
///
/// `Ok(false)`는 키가 거부된 경우, `Err`는 확인 자체를 못한 경우입니다.
/// Credential Store는 둘 다 "검증 안 됨"으로 기록하지만 저장된 키는 지우지 않습니다.
pub trait KeyValidator: Send + Sync {
    fn validate<'a>(&'a self, api_key: &'a str) -> BoxFuture<'a, Result<bool, ValidationError>>;
}

/// 클로저를 [`KeyValidator`]로 감싸기
pub struct FnValidator<F>(pub F);

impl<F, Fut> KeyValidator for FnValidator<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<bool, ValidationError>> + Send + 'static,
{
    fn validate<'a>(&'a self, api_key: &'a str) -> BoxFuture<'a, Result<bool, ValidationError>> {
        Box::pin((self.0)(api_key.to_string()))
    }
}

/// 시크릿 이름 → 검사 전략
pub trait NetworkEnvironment: Send + Sync {
    /// 해당 이름에 쓸 검사가 없으면 `None`
    fn validator_for(&self, name: &str) -> Option<Arc<dyn KeyValidator>>;
}
