//! Hypewave Data Models
//!
//! 프론트엔드 타입과 매핑되는 Rust 데이터 모델

use serde::{Deserialize, Serialize};

/// 앱이 사용하는 API 키 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretKind {
    /// AI 텍스트 생성 (OpenRouter)
    OpenRouter,
    /// Reddit 페이지 스크래핑 (ScrapeOwl)
    ScrapeOwl,
}

impl SecretKind {
    pub const ALL: [SecretKind; 2] = [SecretKind::OpenRouter, SecretKind::ScrapeOwl];

    pub fn as_str(&self) -> &'static str {
        match self {
            SecretKind::OpenRouter => "openrouter",
            SecretKind::ScrapeOwl => "scrapeowl",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

/// 시크릿별 마지막 검증 기록 (`<name>_validated`)
///
/// JSON: `{"timestamp": <epoch millis>, "validated": <bool>}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRecord {
    pub timestamp: i64,
    pub validated: bool,
}

impl ValidationRecord {
    /// 검증 성공 기록이고, 기록 시점이 `now` 기준 `ttl_millis` 이내인지
    ///
    /// 미래 시각으로 찍힌 기록은 신뢰하지 않음
    pub fn is_fresh(&self, now_millis: i64, ttl_millis: i64) -> bool {
        self.validated && now_millis >= self.timestamp && now_millis - self.timestamp < ttl_millis
    }
}
