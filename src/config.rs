//! Configuration
//!
//! `.env.local` / `.env`를 로드한 뒤 `HYPEWAVE_*` 환경 변수에서 설정을 읽습니다.
//! 값이 없으면 기본값을 쓰고, 형식이 잘못된 값은 [`ConfigError`]로 거부합니다.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::secrets::kdf::{DEFAULT_PBKDF2_ITERATIONS, MIN_PBKDF2_ITERATIONS};
use crate::validation::http::{OPENROUTER_BASE_URL, SCRAPEOWL_BASE_URL};
use crate::validation::FormatFallback;

pub const ENV_DB_PATH: &str = "HYPEWAVE_DB_PATH";
pub const ENV_KDF_ITERATIONS: &str = "HYPEWAVE_KDF_ITERATIONS";
pub const ENV_VALIDATION_TTL_HOURS: &str = "HYPEWAVE_VALIDATION_TTL_HOURS";
pub const ENV_OPENROUTER_BASE_URL: &str = "HYPEWAVE_OPENROUTER_BASE_URL";
pub const ENV_SCRAPEOWL_BASE_URL: &str = "HYPEWAVE_SCRAPEOWL_BASE_URL";
pub const ENV_VALIDATION_TIMEOUT_SECS: &str = "HYPEWAVE_VALIDATION_TIMEOUT_SECS";
pub const ENV_OFFLINE: &str = "HYPEWAVE_OFFLINE";
pub const ENV_FORMAT_FALLBACK: &str = "HYPEWAVE_FORMAT_FALLBACK";

/// 검증 기록 유효 기간 기본값 (24시간)
pub const DEFAULT_VALIDATION_TTL_HOURS: u32 = 24;
pub const DEFAULT_VALIDATION_TIMEOUT_SECS: u64 = 10;

/// 설정 오류
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}: invalid value '{value}' ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Credential 서브시스템 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialConfig {
    /// 영구 저장 영역 SQLite 파일 경로
    pub db_path: PathBuf,
    pub kdf_iterations: u32,
    pub validation_ttl: Duration,
    /// http(s) URL 문자열 ([`CredentialConfig::validate`]에서 검사)
    pub openrouter_base_url: String,
    pub scrapeowl_base_url: String,
    pub validation_timeout: Duration,
    pub offline: bool,
    pub format_fallback: FormatFallback,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("hypewave.db"),
            kdf_iterations: DEFAULT_PBKDF2_ITERATIONS,
            validation_ttl: Duration::from_secs(u64::from(DEFAULT_VALIDATION_TTL_HOURS) * 3600),
            openrouter_base_url: OPENROUTER_BASE_URL.to_string(),
            scrapeowl_base_url: SCRAPEOWL_BASE_URL.to_string(),
            validation_timeout: Duration::from_secs(DEFAULT_VALIDATION_TIMEOUT_SECS),
            offline: false,
            format_fallback: FormatFallback::Deny,
        }
    }
}

impl CredentialConfig {
    /// `.env` 파일 로드 후 프로세스 환경 변수에서 설정 구성
    pub fn load() -> Result<Self, ConfigError> {
        load_env_files();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 주어진 lookup 함수로 설정 구성 (테스트에서 환경 변수를 건드리지 않기 위함)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = get(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }

        if let Some(raw) = get(ENV_KDF_ITERATIONS) {
            config.kdf_iterations = parse_number(ENV_KDF_ITERATIONS, &raw)?;
        }

        if let Some(raw) = get(ENV_VALIDATION_TTL_HOURS) {
            let hours: u32 = parse_number(ENV_VALIDATION_TTL_HOURS, &raw)?;
            if hours == 0 {
                return Err(invalid(ENV_VALIDATION_TTL_HOURS, &raw, "must be at least 1"));
            }
            config.validation_ttl = Duration::from_secs(u64::from(hours) * 3600);
        }

        if let Some(raw) = get(ENV_OPENROUTER_BASE_URL) {
            config.openrouter_base_url = parse_url(ENV_OPENROUTER_BASE_URL, &raw)?.to_string();
        }

        if let Some(raw) = get(ENV_SCRAPEOWL_BASE_URL) {
            config.scrapeowl_base_url = parse_url(ENV_SCRAPEOWL_BASE_URL, &raw)?.to_string();
        }

        if let Some(raw) = get(ENV_VALIDATION_TIMEOUT_SECS) {
            let secs: u64 = parse_number(ENV_VALIDATION_TIMEOUT_SECS, &raw)?;
            config.validation_timeout = Duration::from_secs(secs.max(1));
        }

        if let Some(raw) = get(ENV_OFFLINE) {
            config.offline = parse_bool(ENV_OFFLINE, &raw)?;
        }

        if let Some(raw) = get(ENV_FORMAT_FALLBACK) {
            config.format_fallback = if parse_bool(ENV_FORMAT_FALLBACK, &raw)? {
                FormatFallback::Allow
            } else {
                FormatFallback::Deny
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// 직접 구성한 설정도 같은 규칙으로 검사
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.kdf_iterations < MIN_PBKDF2_ITERATIONS {
            return Err(invalid(
                ENV_KDF_ITERATIONS,
                &self.kdf_iterations.to_string(),
                format!("must be at least {}", MIN_PBKDF2_ITERATIONS),
            ));
        }
        if self.validation_ttl.is_zero() {
            return Err(invalid(ENV_VALIDATION_TTL_HOURS, "0", "must be at least 1"));
        }
        self.openrouter_url()?;
        self.scrapeowl_url()?;
        Ok(())
    }

    pub fn openrouter_url(&self) -> Result<Url, ConfigError> {
        parse_url(ENV_OPENROUTER_BASE_URL, &self.openrouter_base_url)
    }

    pub fn scrapeowl_url(&self) -> Result<Url, ConfigError> {
        parse_url(ENV_SCRAPEOWL_BASE_URL, &self.scrapeowl_base_url)
    }
}

fn invalid(key: &'static str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse_number<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| invalid(key, raw, e.to_string()))
}

fn parse_url(key: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| invalid(key, raw, e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(key, raw, "scheme must be http or https"));
    }
    Ok(url)
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, raw, "expected true/false")),
    }
}

fn find_upwards(start: PathBuf, filename: &str, max_hops: usize) -> Option<PathBuf> {
    let mut cur = start;
    for _ in 0..=max_hops {
        let candidate = cur.join(filename);
        if candidate.exists() {
            return Some(candidate);
        }
        if !cur.pop() {
            break;
        }
    }
    None
}

/// `.env.local` → `.env` 순서로 로드
///
/// CWD가 프로젝트 루트가 아닐 수 있으니 상위로 올라가며 탐색합니다.
/// 파일이 없거나 파싱에 실패해도 무시합니다 (이미 설정된 환경 변수는 덮어쓰지 않음).
fn load_env_files() {
    let Ok(cwd) = std::env::current_dir() else {
        return;
    };

    for filename in [".env.local", ".env"] {
        if let Some(path) = find_upwards(cwd.clone(), filename, 6) {
            match dotenvy::from_path(&path) {
                Ok(()) => tracing::debug!(target: "config", path = %path.display(), "env file loaded"),
                Err(e) => tracing::warn!(target: "config", path = %path.display(), error = %e, "env file ignored"),
            }
        }
    }
}
