//! Database Module
//!
//! 영구 저장 영역 (SQLite 기반 키-값 테이블)

mod schema;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension};

use crate::storage::{StorageArea, StorageError};

/// SQLite 기반 영구 저장 영역
///
/// 앱 재시작 후에도 유지되는 값(브라우저 식별자, 암호화된 API 키, 검증 기록)을 보관합니다.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// 파일 기반 데이터베이스 연결 생성 (스키마 초기화 포함)
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        // DB 디렉토리 생성
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.initialize()?;
        Ok(storage)
    }

    /// 메모리 데이터베이스 (테스트/임시 세션용)
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let storage = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        storage.initialize()?;
        Ok(storage)
    }

    /// 데이터베이스 스키마 초기화
    fn initialize(&self) -> Result<(), StorageError> {
        self.lock()?.execute_batch(schema::CREATE_SCHEMA)?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Unavailable("database lock poisoned".to_string()))
    }
}

impl StorageArea for SqliteStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.lock()?;
        let value = conn
            .query_row("SELECT value FROM kv_store WHERE key = ?1", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)",
            (key, value, chrono::Utc::now().timestamp_millis()),
        )?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM kv_store WHERE key = ?1", [key])?;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT key FROM kv_store ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}
