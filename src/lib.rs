//! Hypewave - Credential 백엔드 라이브러리
//!
//! OpenRouter / ScrapeOwl API 키를 로컬에 암호화해 보관하고,
//! 원격 검증 결과를 일정 시간 캐시합니다.

pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod secrets;
pub mod storage;
pub mod utils;
pub mod validation;

use std::sync::Arc;

use config::CredentialConfig;
use error::AppError;
use secrets::CredentialStore;
use storage::{SessionStorage, SqliteStorage, StorageArea};
use validation::{NetworkEnvironment, OfflineEnvironment, OnlineEnvironment};

/// 설정에 따라 저장 영역과 네트워크 환경을 구성해 CredentialStore 생성
///
/// 세션 저장 영역은 프로세스 메모리에만 존재하므로, 이 함수를 다시 호출하면
/// 새 세션이 시작되고 이전 세션에서 저장한 시크릿은 읽을 수 없습니다.
pub fn open_store(config: &CredentialConfig) -> Result<CredentialStore, AppError> {
    config.validate()?;

    let durable: Arc<dyn StorageArea> = Arc::new(SqliteStorage::open(&config.db_path)?);
    let session: Arc<dyn StorageArea> = Arc::new(SessionStorage::new());

    let environment: Arc<dyn NetworkEnvironment> = if config.offline {
        tracing::info!(target: "hypewave", fallback = ?config.format_fallback, "offline mode");
        Arc::new(OfflineEnvironment::new(config.format_fallback))
    } else {
        Arc::new(OnlineEnvironment::new(
            config.openrouter_url()?,
            config.scrapeowl_url()?,
            config.validation_timeout,
        )?)
    };

    tracing::info!(
        target: "hypewave",
        db_path = %config.db_path.display(),
        "credential store opened"
    );

    Ok(CredentialStore::new(session, durable, environment, config)?)
}
