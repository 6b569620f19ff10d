//! Secret 모듈 오류 타입

use crate::storage::StorageError;

/// 암호화/복호화 오류
///
/// `MalformedBlob`과 `AuthenticationFailed`는 저장된 값이 손상/변조되었다는 뜻이며,
/// Credential Store는 이 경우 해당 blob을 삭제합니다.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Malformed blob: {0}")]
    MalformedBlob(String),

    #[error("Authentication failed (tampered data or different master key)")]
    AuthenticationFailed,

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decrypted payload is not valid UTF-8")]
    InvalidPlaintext,
}

/// Credential Store 내부 오류
///
/// 공개 API 경계에서 `None` / `false` / [`SecureStorageFailure`]로 변환됩니다.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Storage unavailable: {0}")]
    Storage(#[from] StorageError),

    #[error("Crypto failure: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CredentialError {
    /// 저장된 blob 자체가 신뢰할 수 없는 경우 (삭제 대상)
    pub fn is_corruption(&self) -> bool {
        matches!(self, CredentialError::Crypto(_))
    }
}

/// `save` 실패 시 호출자에게 노출되는 유일한 오류
#[derive(Debug, thiserror::Error)]
#[error("Secure storage failure: could not save '{name}'")]
pub struct SecureStorageFailure {
    name: String,
    #[source]
    cause: CredentialError,
}

impl SecureStorageFailure {
    pub(crate) fn new(name: &str, cause: CredentialError) -> Self {
        Self {
            name: name.to_string(),
            cause,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cause(&self) -> &CredentialError {
        &self.cause
    }
}
