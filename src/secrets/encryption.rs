//! Encryption Service
//!
//! Master-Key Provider → KDF → Cipher → Blob 포맷을 묶어 문자열 단위로 암호화/복호화합니다.
//! salt와 nonce는 `encrypt` 호출마다 새로 생성되며 어디에도 캐시하지 않습니다.

use super::blob;
use super::cipher;
use super::error::{CredentialError, CryptoError};
use super::kdf::{self, DEFAULT_PBKDF2_ITERATIONS};
use super::master_key::MasterKeyProvider;

#[derive(Clone)]
pub struct EncryptionService {
    provider: MasterKeyProvider,
    iterations: u32,
}

impl EncryptionService {
    pub fn new(provider: MasterKeyProvider) -> Self {
        Self::with_iterations(provider, DEFAULT_PBKDF2_ITERATIONS)
    }

    /// 반복 횟수 지정
    ///
    /// 최소값 검사를 하지 않으므로 crate 밖에 노출하지 않습니다.
    /// [`crate::secrets::CredentialStore::new`]가 설정 검증 후에만 호출합니다.
    pub(crate) fn with_iterations(provider: MasterKeyProvider, iterations: u32) -> Self {
        Self {
            provider,
            iterations,
        }
    }

    /// 평문 → base64 blob
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CredentialError> {
        let master_key = self.provider.get_or_create()?;

        let salt = kdf::generate_salt();
        let nonce = cipher::generate_nonce();

        let key = kdf::derive_key(&master_key, &salt, self.iterations);
        let ciphertext = cipher::seal(&key, &nonce, plaintext.as_bytes())?;

        Ok(blob::pack(&salt, &nonce, &ciphertext))
    }

    /// base64 blob → 평문
    ///
    /// 손상/변조/다른 마스터키는 모두 `CredentialError::Crypto`
    pub fn decrypt(&self, encoded: &str) -> Result<String, CredentialError> {
        let master_key = self.provider.get_or_create()?;
        let blob = blob::unpack(encoded)?;

        let key = kdf::derive_key(&master_key, &blob.salt, self.iterations);
        let plaintext = cipher::open(&key, &blob.nonce, &blob.ciphertext)?;

        let text = std::str::from_utf8(&plaintext).map_err(|_| CryptoError::InvalidPlaintext)?;
        Ok(text.to_string())
    }

    /// 마스터키 재료 삭제 (로그아웃/초기화)
    pub fn clear_encryption_keys(&self) -> Result<(), CredentialError> {
        self.provider.clear()?;
        Ok(())
    }
}
