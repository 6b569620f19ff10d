//! Storage Area 모듈
//!
//! 브라우저의 `sessionStorage` / `localStorage`에 해당하는 두 저장 영역을 추상화합니다.
//!
//! - 세션 영역: 프로세스 메모리 ([`SessionStorage`]), 세션 종료 시 사라짐
//! - 영구 영역: SQLite 파일 ([`crate::db::SqliteStorage`])
//!
//! 각 키는 소유 컴포넌트(Master-Key Provider, Credential Store)만 읽고 씁니다.

pub mod session;

pub use crate::db::SqliteStorage;
pub use session::SessionStorage;

/// Storage 오류
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// 문자열 키-값 저장 영역 (`getItem` / `setItem` / `removeItem`)
pub trait StorageArea: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// 없는 키를 지우는 것은 오류가 아님
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// 저장된 모든 키 (순서 보장 없음)
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}
