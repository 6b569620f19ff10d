//! 세션 범위 저장 영역 (메모리)

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{StorageArea, StorageError};

/// 프로세스 메모리에만 존재하는 저장 영역
///
/// 값은 디스크에 기록되지 않으며, 인스턴스가 drop되거나 `end_session()`이 호출되면 사라집니다.
#[derive(Debug, Default)]
pub struct SessionStorage {
    items: Mutex<HashMap<String, String>>,
}

impl SessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 세션 종료 (모든 값 삭제)
    pub fn end_session(&self) {
        if let Ok(mut items) = self.lock() {
            items.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.lock().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.items
            .lock()
            .map_err(|_| StorageError::Unavailable("session storage lock poisoned".to_string()))
    }
}

impl StorageArea for SessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}
