//! Credential Store - API 키 저장/조회/검증 캐시
//!
//! - `<name>_key`: 암호화된 blob (영구 영역)
//! - `<name>_validated`: 마지막 검증 기록 JSON (영구 영역)
//!
//! 내부적으로는 `Result<_, CredentialError>`로 실패 종류를 구분하고,
//! 공개 API 경계에서만 `None` / `false` / [`SecureStorageFailure`]로 변환합니다.
//! 같은 이름에 대한 동시 쓰기는 보호하지 않습니다 (이름당 writer 1개 가정).

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use super::encryption::EncryptionService;
use super::error::{CredentialError, SecureStorageFailure};
use super::master_key::MasterKeyProvider;
use crate::config::{ConfigError, CredentialConfig};
use crate::models::{SecretKind, ValidationRecord};
use crate::storage::StorageArea;
use crate::utils::{Clock, SystemClock};
use crate::validation::{KeyValidator, NetworkEnvironment};

/// 암호화된 시크릿 저장 키
pub fn secret_storage_key(name: &str) -> String {
    format!("{}_key", name)
}

/// 검증 기록 저장 키
pub fn validation_storage_key(name: &str) -> String {
    format!("{}_validated", name)
}

/// 저장 키 → 시크릿 이름 (이 모듈이 쓰는 키가 아니면 `None`)
fn name_from_storage_key(key: &str) -> Option<&str> {
    key.strip_suffix("_key")
        .or_else(|| key.strip_suffix("_validated"))
        .filter(|name| !name.is_empty())
}

/// 이름별 확인 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecretCheck {
    /// 복호화 가능한 값이 저장되어 있는지
    pub stored: bool,
    /// 캐시 또는 원격 검사로 유효성이 확인되었는지
    pub valid: bool,
}

pub struct CredentialStore {
    durable: Arc<dyn StorageArea>,
    encryption: EncryptionService,
    environment: Arc<dyn NetworkEnvironment>,
    clock: Arc<dyn Clock>,
    validation_ttl: Duration,
}

impl CredentialStore {
    /// 설정 검증 후 생성 (PBKDF2 반복 횟수가 최소값 미만이면 거부)
    pub fn new(
        session: Arc<dyn StorageArea>,
        durable: Arc<dyn StorageArea>,
        environment: Arc<dyn NetworkEnvironment>,
        config: &CredentialConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let provider = MasterKeyProvider::new(session, durable.clone());
        let encryption = EncryptionService::with_iterations(provider, config.kdf_iterations);
        Ok(Self::from_parts(durable, encryption, environment, config.validation_ttl))
    }

    fn from_parts(
        durable: Arc<dyn StorageArea>,
        encryption: EncryptionService,
        environment: Arc<dyn NetworkEnvironment>,
        validation_ttl: Duration,
    ) -> Self {
        Self {
            durable,
            encryption,
            environment,
            clock: Arc::new(SystemClock),
            validation_ttl,
        }
    }

    /// 시계 교체 (검증 기록 만료 테스트용)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn environment(&self) -> &Arc<dyn NetworkEnvironment> {
        &self.environment
    }

    // =====================================
    // 시크릿 저장/조회/삭제
    // =====================================

    /// 시크릿 암호화 후 저장
    ///
    /// 실패 시 기존 값을 조용히 유지하지 않고 오류를 돌려줍니다.
    /// 새 값은 아직 검증되지 않았으므로 기존 검증 기록은 지웁니다.
    pub async fn save(&self, name: &str, plaintext: &str) -> Result<(), SecureStorageFailure> {
        self.try_save(name, plaintext).map_err(|e| {
            tracing::error!(target: "CredentialStore", secret = name, error = %e, "failed to save secret");
            SecureStorageFailure::new(name, e)
        })?;
        tracing::info!(target: "CredentialStore", secret = name, "secret saved");
        Ok(())
    }

    fn try_save(&self, name: &str, plaintext: &str) -> Result<(), CredentialError> {
        let blob = self.encryption.encrypt(plaintext)?;
        // 기록 삭제가 실패하면 새 blob을 쓰지 않음 (이전 검증이 새 값에 적용되지 않도록)
        self.durable.remove_item(&validation_storage_key(name))?;
        self.durable.set_item(&secret_storage_key(name), &blob)?;
        Ok(())
    }

    /// 시크릿 조회 (없거나, 손상되었거나, 복호화할 수 없으면 `None`)
    pub async fn get(&self, name: &str) -> Option<String> {
        match self.load(name) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(target: "CredentialStore", secret = name, error = %e, "secret unavailable");
                None
            }
        }
    }

    /// 실패 종류를 구분하는 조회
    ///
    /// 복호화 실패(손상/변조/다른 세션)면 blob을 삭제합니다. 저장 영역 오류는 삭제하지 않습니다.
    pub(crate) fn load(&self, name: &str) -> Result<Option<String>, CredentialError> {
        let key = secret_storage_key(name);
        let Some(blob) = self.durable.get_item(&key)? else {
            return Ok(None);
        };

        match self.encryption.decrypt(&blob) {
            Ok(plaintext) => Ok(Some(plaintext)),
            Err(e) if e.is_corruption() => {
                tracing::warn!(
                    target: "CredentialStore",
                    secret = name,
                    error = %e,
                    "stored secret cannot be decrypted, removing it"
                );
                if let Err(remove_err) = self.durable.remove_item(&key) {
                    tracing::error!(target: "CredentialStore", secret = name, error = %remove_err, "failed to remove corrupted secret");
                }
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// 시크릿과 검증 기록 삭제
    pub async fn remove(&self, name: &str) {
        for key in [secret_storage_key(name), validation_storage_key(name)] {
            if let Err(e) = self.durable.remove_item(&key) {
                tracing::error!(target: "CredentialStore", secret = name, key = %key, error = %e, "failed to remove entry");
            }
        }
        tracing::info!(target: "CredentialStore", secret = name, "secret removed");
    }

    /// 모든 시크릿, 검증 기록, 마스터키 재료 삭제 (로그아웃/초기화)
    pub async fn clear_all(&self) {
        let names = self.stored_names();
        for name in &names {
            self.remove(name).await;
        }
        if let Err(e) = self.encryption.clear_encryption_keys() {
            tracing::error!(target: "CredentialStore", error = %e, "failed to clear master key material");
        }
        tracing::info!(target: "CredentialStore", count = names.len(), "all credentials cleared");
    }

    // =====================================
    // 검증 캐시
    // =====================================

    /// 유효 기간 내의 성공 기록이 있으면 바로 `true`, 아니면 `check`로 원격 확인
    ///
    /// 확인 실패(거부 또는 네트워크 오류)는 "검증 안 됨"으로 기록하지만 시크릿은 유지합니다.
    pub async fn is_live_valid(&self, name: &str, check: &dyn KeyValidator) -> bool {
        self.check_with(name, check).await.valid
    }

    async fn check_with(&self, name: &str, check: &dyn KeyValidator) -> SecretCheck {
        let Some(api_key) = self.get(name).await else {
            return SecretCheck {
                stored: false,
                valid: false,
            };
        };

        if let Some(record) = self.validation_record(name) {
            if record.is_fresh(self.clock.now_millis(), self.ttl_millis()) {
                tracing::debug!(target: "CredentialStore", secret = name, "using cached validation");
                return SecretCheck {
                    stored: true,
                    valid: true,
                };
            }
        }

        let validated = match check.validate(&api_key).await {
            Ok(valid) => valid,
            Err(e) => {
                tracing::warn!(target: "CredentialStore", secret = name, error = %e, "remote validation failed");
                false
            }
        };

        self.record_validation(name, validated);
        SecretCheck {
            stored: true,
            valid: validated,
        }
    }

    /// 모든 이름이 존재하고 검증을 통과하는지 (이름별 검사는 동시에 진행)
    pub async fn has_all_required(&self, names: &[&str]) -> bool {
        self.check_all(names).await.iter().all(|check| check.valid)
    }

    /// 이름별 저장/검증 상태 (입력 순서대로, 이름마다 복호화는 한 번)
    pub async fn check_all(&self, names: &[&str]) -> Vec<SecretCheck> {
        let checks = names.iter().map(|name| async move {
            match self.environment.validator_for(name) {
                Some(validator) => self.check_with(name, validator.as_ref()).await,
                None => {
                    tracing::warn!(target: "CredentialStore", secret = name, "no validator for secret");
                    SecretCheck {
                        stored: self.get(name).await.is_some(),
                        valid: false,
                    }
                }
            }
        });

        join_all(checks).await
    }

    /// 저장된 검증 기록 (없거나 읽을 수 없으면 `None`)
    pub fn validation_record(&self, name: &str) -> Option<ValidationRecord> {
        match self.load_validation_record(name) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(target: "CredentialStore", secret = name, error = %e, "validation record unreadable");
                None
            }
        }
    }

    fn load_validation_record(&self, name: &str) -> Result<Option<ValidationRecord>, CredentialError> {
        let Some(raw) = self.durable.get_item(&validation_storage_key(name))? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// 현재 시각으로 검증 결과 기록
    pub(crate) fn record_validation(&self, name: &str, validated: bool) {
        let record = ValidationRecord {
            timestamp: self.clock.now_millis(),
            validated,
        };
        let result = serde_json::to_string(&record)
            .map_err(CredentialError::from)
            .and_then(|json| {
                self.durable
                    .set_item(&validation_storage_key(name), &json)
                    .map_err(CredentialError::from)
            });
        if let Err(e) = result {
            tracing::error!(target: "CredentialStore", secret = name, error = %e, "failed to write validation record");
        }
    }

    fn ttl_millis(&self) -> i64 {
        i64::try_from(self.validation_ttl.as_millis()).unwrap_or(i64::MAX)
    }

    /// `clear_all()` 대상 이름: 영구 영역의 `<name>_key` / `<name>_validated` + 기본 SecretKind
    fn stored_names(&self) -> BTreeSet<String> {
        let mut names: BTreeSet<String> = SecretKind::ALL
            .iter()
            .map(|kind| kind.as_str().to_string())
            .collect();
        match self.durable.keys() {
            Ok(keys) => names.extend(
                keys.iter()
                    .filter_map(|key| name_from_storage_key(key))
                    .map(str::to_string),
            ),
            Err(e) => {
                tracing::error!(target: "CredentialStore", error = %e, "failed to list stored secrets");
            }
        }
        names
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::secrets::error::CryptoError;
    use crate::storage::testing::FlakyStorage;
    use crate::storage::{SessionStorage, SqliteStorage};
    use crate::utils::ManualClock;
    use crate::validation::{FnValidator, ValidationError};
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    use std::collections::HashSet;
    use std::sync::atomic::Ordering;
    use tempfile::tempdir;
    use tokio::sync::Notify;

    const DAY_MS: i64 = 24 * 60 * 60 * 1_000;

    #[tokio::test]
    async fn test_save_get_roundtrip() {
        let h = harness();
        h.store.save("openrouter", "sk-or-v1-XXXX").await.unwrap();
        assert_eq!(h.store.get("openrouter").await.as_deref(), Some("sk-or-v1-XXXX"));

        // 저장된 값은 평문이 아님
        let stored = h.durable.get_item("openrouter_key").unwrap().unwrap();
        assert!(!stored.contains("sk-or-v1"));
    }

    #[tokio::test]
    async fn test_resave_overwrites() {
        let h = harness();
        h.store.save("scrapeowl", "first").await.unwrap();
        h.store.save("scrapeowl", "second").await.unwrap();
        assert_eq!(h.store.get("scrapeowl").await.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let h = harness();
        assert_eq!(h.store.get("openrouter").await, None);
        assert!(matches!(h.store.load("openrouter"), Ok(None)));
    }

    #[tokio::test]
    async fn test_remove_deletes_blob_and_record() {
        let h = harness();
        h.store.save("openrouter", "sk-or-v1-XXXX").await.unwrap();
        h.store.record_validation("openrouter", true);

        h.store.remove("openrouter").await;
        assert_eq!(h.store.get("openrouter").await, None);
        assert_eq!(h.durable.get_item("openrouter_key").unwrap(), None);
        assert_eq!(h.durable.get_item("openrouter_validated").unwrap(), None);
    }

    #[tokio::test]
    async fn test_any_flipped_byte_fails_closed_and_self_heals() {
        let h = harness();
        h.store.save("openrouter", "sk-or-v1-XXXX").await.unwrap();
        let original = BASE64
            .decode(h.durable.get_item("openrouter_key").unwrap().unwrap())
            .unwrap();

        for i in 0..original.len() {
            let mut tampered = original.clone();
            tampered[i] ^= 0x80;
            h.durable
                .set_item("openrouter_key", &BASE64.encode(&tampered))
                .unwrap();

            assert_eq!(h.store.get("openrouter").await, None, "byte {} accepted", i);
            assert_eq!(h.durable.get_item("openrouter_key").unwrap(), None);
        }
    }

    #[tokio::test]
    async fn test_malformed_blob_is_removed() {
        let h = harness();
        h.durable.set_item("openrouter_key", "%%% not a blob").unwrap();

        let err = h.store.load("openrouter").unwrap_err();
        assert!(matches!(err, CredentialError::Crypto(CryptoError::MalformedBlob(_))));
        assert_eq!(h.durable.get_item("openrouter_key").unwrap(), None);
    }

    #[tokio::test]
    async fn test_new_session_makes_old_secret_unreadable() {
        let h = harness();
        h.store.save("openrouter", "sk-or-v1-XXXX").await.unwrap();

        // 세션 종료 시뮬레이션: 영구 영역은 그대로
        h.session.end_session();

        let err = h.store.load("openrouter").unwrap_err();
        assert!(matches!(err, CredentialError::Crypto(CryptoError::AuthenticationFailed)));
        assert_eq!(h.store.get("openrouter").await, None);
    }

    #[tokio::test]
    async fn test_nonce_unique_across_saves() {
        let h = harness();
        let mut nonces = HashSet::new();
        for _ in 0..10_000 {
            h.store.save("openrouter", "sk-or-v1-XXXX").await.unwrap();
            let raw = BASE64
                .decode(h.durable.get_item("openrouter_key").unwrap().unwrap())
                .unwrap();
            nonces.insert(raw[16..28].to_vec());
        }
        assert_eq!(nonces.len(), 10_000);
    }

    #[tokio::test]
    async fn test_save_failure_is_reported() {
        let durable = Arc::new(FlakyStorage::default());
        let h = harness_with(durable.clone());
        h.store.save("openrouter", "old").await.unwrap();

        durable.set_fail_writes(true);
        let err = h.store.save("openrouter", "new").await.unwrap_err();
        assert_eq!(err.name(), "openrouter");
        assert!(matches!(err.cause(), CredentialError::Storage(_)));

        durable.set_fail_writes(false);
        assert_eq!(h.store.get("openrouter").await.as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn test_storage_read_failure_keeps_blob() {
        let durable = Arc::new(FlakyStorage::default());
        let h = harness_with(durable.clone());
        h.store.save("openrouter", "sk-or-v1-XXXX").await.unwrap();

        durable.set_fail_reads(true);
        assert_eq!(h.store.get("openrouter").await, None);
        assert!(matches!(h.store.load("openrouter"), Err(CredentialError::Storage(_))));

        durable.set_fail_reads(false);
        assert_eq!(h.store.get("openrouter").await.as_deref(), Some("sk-or-v1-XXXX"));
    }

    #[tokio::test]
    async fn test_validation_cache_within_window() {
        let h = harness();
        let clock = Arc::new(ManualClock::new(100 * DAY_MS));
        let store = h.store.with_clock(clock.clone());
        store.save("openrouter", "sk-or-v1-XXXX").await.unwrap();

        let (ok, ok_calls) = counting(Ok(true));
        assert!(store.is_live_valid("openrouter", ok.as_ref()).await);
        assert_eq!(ok_calls.load(Ordering::SeqCst), 1);

        // 두 번째 검사는 실패하겠지만 캐시가 우선
        clock.advance(chrono::Duration::hours(23));
        let (bad, bad_calls) = counting(Ok(false));
        assert!(store.is_live_valid("openrouter", bad.as_ref()).await);
        assert_eq!(bad_calls.load(Ordering::SeqCst), 0);

        // 24시간 경과 → 다시 원격 확인
        clock.advance(chrono::Duration::hours(1));
        assert!(!store.is_live_valid("openrouter", bad.as_ref()).await);
        assert_eq!(bad_calls.load(Ordering::SeqCst), 1);

        let record = store.validation_record("openrouter").unwrap();
        assert!(!record.validated);
        assert_eq!(record.timestamp, 101 * DAY_MS);
    }

    #[tokio::test]
    async fn test_network_failure_keeps_secret() {
        let h = harness();
        h.store.save("openrouter", "sk-or-v1-XXXX").await.unwrap();

        let (failing, _) = counting(Err(ValidationError::Network("timeout".to_string())));
        assert!(!h.store.is_live_valid("openrouter", failing.as_ref()).await);

        assert_eq!(h.store.get("openrouter").await.as_deref(), Some("sk-or-v1-XXXX"));
        let record = h.store.validation_record("openrouter").unwrap();
        assert!(!record.validated);
    }

    #[tokio::test]
    async fn test_failed_record_forces_recheck() {
        let h = harness();
        h.store.save("scrapeowl", "owl").await.unwrap();
        h.store.record_validation("scrapeowl", false);

        let (ok, calls) = counting(Ok(true));
        assert!(h.store.is_live_valid("scrapeowl", ok.as_ref()).await);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(h.store.validation_record("scrapeowl").unwrap().validated);
    }

    #[tokio::test]
    async fn test_missing_secret_skips_remote_check() {
        let h = harness();
        let (ok, calls) = counting(Ok(true));
        assert!(!h.store.is_live_valid("openrouter", ok.as_ref()).await);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_check_receives_plaintext() {
        let h = harness();
        h.store.save("openrouter", "sk-or-v1-XXXX").await.unwrap();
        let validator =
            FnValidator(|key: String| async move { Ok::<_, ValidationError>(key == "sk-or-v1-XXXX") });
        assert!(h.store.is_live_valid("openrouter", &validator).await);
    }

    #[tokio::test]
    async fn test_resave_invalidates_cached_validation() {
        let h = harness();
        h.store.save("openrouter", "sk-or-v1-old").await.unwrap();
        h.store.record_validation("openrouter", true);

        h.store.save("openrouter", "sk-or-v1-new").await.unwrap();
        assert!(h.store.validation_record("openrouter").is_none());
    }

    #[tokio::test]
    async fn test_corrupt_validation_record_is_ignored() {
        let h = harness();
        h.store.save("openrouter", "sk-or-v1-XXXX").await.unwrap();
        h.durable.set_item("openrouter_validated", "{oops").unwrap();

        let (ok, calls) = counting(Ok(true));
        assert!(h.store.is_live_valid("openrouter", ok.as_ref()).await);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_has_all_required_end_to_end() {
        let h = harness();
        let (ok_a, _) = counting(Ok(true));
        let (ok_b, _) = counting(Ok(true));
        h.environment.set("openrouter", ok_a);
        h.environment.set("scrapeowl", ok_b);
        let required = ["openrouter", "scrapeowl"];

        assert!(!h.store.has_all_required(&required).await);

        h.store.save("openrouter", "sk-or-v1-XXXX").await.unwrap();
        assert_eq!(h.store.get("openrouter").await.as_deref(), Some("sk-or-v1-XXXX"));
        assert!(!h.store.has_all_required(&required).await);

        h.store.save("scrapeowl", "owl-key").await.unwrap();
        assert!(h.store.has_all_required(&required).await);

        h.store.remove("openrouter").await;
        assert_eq!(h.store.get("openrouter").await, None);
        assert!(!h.store.has_all_required(&required).await);
    }

    #[tokio::test]
    async fn test_has_all_required_needs_every_validation() {
        let h = harness();
        let (ok, _) = counting(Ok(true));
        let (rejected, _) = counting(Ok(false));
        h.environment.set("openrouter", ok);
        h.environment.set("scrapeowl", rejected);
        h.store.save("openrouter", "a").await.unwrap();
        h.store.save("scrapeowl", "b").await.unwrap();

        assert!(!h.store.has_all_required(&["openrouter", "scrapeowl"]).await);
        // 검사가 없는 이름
        assert!(!h.store.has_all_required(&["github"]).await);
    }

    #[tokio::test]
    async fn test_concurrent_validations_complete_out_of_order() {
        let h = harness();
        h.store.save("openrouter", "a").await.unwrap();
        h.store.save("scrapeowl", "b").await.unwrap();

        // openrouter 검사는 scrapeowl 검사가 끝난 뒤에야 완료됨
        let gate = Arc::new(Notify::new());
        let waiter = gate.clone();
        h.environment.set(
            "openrouter",
            Arc::new(FnValidator(move |_key: String| {
                let waiter = waiter.clone();
                async move {
                    waiter.notified().await;
                    Ok::<_, ValidationError>(true)
                }
            })),
        );
        let signal = gate.clone();
        h.environment.set(
            "scrapeowl",
            Arc::new(FnValidator(move |_key: String| {
                let signal = signal.clone();
                async move {
                    signal.notify_one();
                    Ok::<_, ValidationError>(true)
                }
            })),
        );

        assert!(h.store.has_all_required(&["openrouter", "scrapeowl"]).await);
        assert!(h.store.validation_record("openrouter").unwrap().validated);
        assert!(h.store.validation_record("scrapeowl").unwrap().validated);
    }

    #[tokio::test]
    async fn test_clear_all_wipes_everything() {
        let h = harness();
        h.store.save("openrouter", "a").await.unwrap();
        h.store.save("scrapeowl", "b").await.unwrap();
        h.store.save("custom", "c").await.unwrap();
        h.store.record_validation("openrouter", true);

        h.store.clear_all().await;

        for key in [
            "openrouter_key",
            "openrouter_validated",
            "scrapeowl_key",
            "custom_key",
            "hypewave_browser_id",
        ] {
            assert_eq!(h.durable.get_item(key).unwrap(), None, "{} survived", key);
        }
        assert!(h.session.is_empty());
    }

    #[tokio::test]
    async fn test_sqlite_backed_store() {
        let durable: Arc<dyn StorageArea> = Arc::new(SqliteStorage::open_in_memory().unwrap());
        let h = harness_with(durable);
        h.store.save("openrouter", "sk-or-v1-XXXX").await.unwrap();
        assert_eq!(h.store.get("openrouter").await.as_deref(), Some("sk-or-v1-XXXX"));
    }

    #[tokio::test]
    async fn test_default_config_store_roundtrip() {
        let store = CredentialStore::new(
            Arc::new(SessionStorage::new()),
            Arc::new(SessionStorage::new()),
            Arc::new(FakeEnvironment::default()),
            &CredentialConfig::default(),
        )
        .unwrap();
        store.save("openrouter", "sk-or-v1-XXXX").await.unwrap();
        assert_eq!(store.get("openrouter").await.as_deref(), Some("sk-or-v1-XXXX"));
    }

    #[tokio::test]
    async fn test_failed_record_removal_keeps_previous_secret() {
        let durable = Arc::new(FlakyStorage::default());
        let h = harness_with(durable.clone());
        h.store.save("openrouter", "sk-or-v1-old").await.unwrap();
        h.store.record_validation("openrouter", true);

        durable.set_fail_removes(true);
        let err = h.store.save("openrouter", "sk-or-v1-new").await.unwrap_err();
        assert!(matches!(err.cause(), CredentialError::Storage(_)));
        durable.set_fail_removes(false);

        // 새 값은 기록되지 않았고, 남은 검증 기록은 이전 값에 대한 것
        assert_eq!(h.store.get("openrouter").await.as_deref(), Some("sk-or-v1-old"));

        let validator = FnValidator(|key: String| async move {
            Ok::<_, ValidationError>(key == "sk-or-v1-old")
        });
        h.store.record_validation("openrouter", false);
        assert!(h.store.is_live_valid("openrouter", &validator).await);
    }

    #[tokio::test]
    async fn test_clear_all_after_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("hypewave.db");

        {
            let durable: Arc<dyn StorageArea> = Arc::new(SqliteStorage::open(&db_path).unwrap());
            let h = harness_with(durable);
            h.store.save("custom", "c").await.unwrap();
            h.store.record_validation("custom", true);
            h.store.record_validation("orphan", false);
        }

        let durable: Arc<dyn StorageArea> = Arc::new(SqliteStorage::open(&db_path).unwrap());
        let h = harness_with(durable.clone());
        h.store.clear_all().await;

        for key in ["custom_key", "custom_validated", "orphan_validated", "hypewave_browser_id"] {
            assert_eq!(durable.get_item(key).unwrap(), None, "{} survived", key);
        }
        assert!(durable.keys().unwrap().is_empty());
    }

    #[test]
    fn test_weak_kdf_config_is_refused() {
        let config = CredentialConfig {
            kdf_iterations: 10,
            ..CredentialConfig::default()
        };
        let result = CredentialStore::new(
            Arc::new(SessionStorage::new()),
            Arc::new(SessionStorage::new()),
            Arc::new(FakeEnvironment::default()),
            &config,
        );
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[tokio::test]
    async fn test_check_all_decrypts_each_name_once() {
        let durable = Arc::new(FlakyStorage::default());
        let h = harness_with(durable.clone());
        let (ok, _) = counting(Ok(true));
        h.environment.set("openrouter", ok);
        h.store.save("openrouter", "sk-or-v1-XXXX").await.unwrap();

        let checks = h.store.check_all(&["openrouter", "scrapeowl"]).await;
        assert_eq!(
            checks,
            vec![
                SecretCheck {
                    stored: true,
                    valid: true
                },
                SecretCheck {
                    stored: false,
                    valid: false
                },
            ]
        );
        assert_eq!(durable.reads("openrouter_key"), 1);
    }

    #[test]
    fn test_name_from_storage_key() {
        assert_eq!(name_from_storage_key("openrouter_key"), Some("openrouter"));
        assert_eq!(name_from_storage_key("scrapeowl_validated"), Some("scrapeowl"));
        assert_eq!(name_from_storage_key("hypewave_browser_id"), None);
        assert_eq!(name_from_storage_key("_key"), None);
    }
}
