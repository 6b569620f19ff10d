//! Master-Key Provider
//!
//! 마스터키 재료 = 세션 식별자 + 브라우저 식별자 (둘 다 UUID v4)
//!
//! - 세션 식별자: 세션 영역에 저장, 세션이 끝나면 사라짐
//! - 브라우저 식별자: 영구 영역에 저장, `clear()` 전까지 유지
//!
//! 둘 중 하나라도 없으면 두 값을 모두 새로 만듭니다. 이전 세션에서 암호화한 값은
//! 더 이상 복호화할 수 없으며, 이는 의도된 동작입니다.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;
use zeroize::Zeroizing;

use crate::storage::{StorageArea, StorageError};

/// 세션 영역 키
pub const SESSION_ID_KEY: &str = "hypewave_session_id";
/// 영구 영역 키
pub const BROWSER_ID_KEY: &str = "hypewave_browser_id";

/// 마스터키 재료 (drop 시 zeroize)
pub struct MasterKeyMaterial(Zeroizing<String>);

impl MasterKeyMaterial {
    fn from_parts(session_id: &str, browser_id: &str) -> Self {
        let mut material = Zeroizing::new(String::with_capacity(session_id.len() + browser_id.len()));
        material.push_str(session_id);
        material.push_str(browser_id);
        Self(material)
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for MasterKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKeyMaterial(<redacted>)")
    }
}

/// 세션/영구 영역에서 마스터키 재료를 관리
#[derive(Clone)]
pub struct MasterKeyProvider {
    session: Arc<dyn StorageArea>,
    durable: Arc<dyn StorageArea>,
}

impl MasterKeyProvider {
    pub fn new(session: Arc<dyn StorageArea>, durable: Arc<dyn StorageArea>) -> Self {
        Self { session, durable }
    }

    /// 마스터키 재료 로드 (없으면 생성)
    pub fn get_or_create(&self) -> Result<MasterKeyMaterial, StorageError> {
        let session_id = self.session.get_item(SESSION_ID_KEY)?.map(Zeroizing::new);
        let browser_id = self.durable.get_item(BROWSER_ID_KEY)?.map(Zeroizing::new);

        if let (Some(session_id), Some(browser_id)) = (&session_id, &browser_id) {
            return Ok(MasterKeyMaterial::from_parts(session_id, browser_id));
        }

        tracing::debug!(
            target: "MasterKeyProvider",
            has_session = session_id.is_some(),
            has_browser = browser_id.is_some(),
            "generating new master key material"
        );

        let new_session_id = Zeroizing::new(Uuid::new_v4().to_string());
        let new_browser_id = Zeroizing::new(Uuid::new_v4().to_string());

        self.session.set_item(SESSION_ID_KEY, &new_session_id)?;
        self.durable.set_item(BROWSER_ID_KEY, &new_browser_id)?;

        Ok(MasterKeyMaterial::from_parts(&new_session_id, &new_browser_id))
    }

    /// 두 식별자 모두 삭제 (로그아웃/초기화)
    ///
    /// 이후 기존에 암호화된 모든 blob은 복호화할 수 없습니다.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.session.remove_item(SESSION_ID_KEY)?;
        self.durable.remove_item(BROWSER_ID_KEY)?;
        tracing::info!(target: "MasterKeyProvider", "master key material cleared");
        Ok(())
    }
}
