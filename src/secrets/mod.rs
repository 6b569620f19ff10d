//! Secret 모듈
//!
//! API 키를 로컬 저장소에 암호화해 보관합니다.
//!
//! - 마스터키 재료 = 세션 식별자 + 브라우저 식별자 ([`master_key`])
//! - 값마다 새 salt로 PBKDF2 키 파생 ([`kdf`]), 새 nonce로 AEAD 암호화 ([`cipher`])
//! - `salt || nonce || ciphertext`를 base64 문자열 하나로 저장 ([`blob`])
//! - 공개 API는 [`CredentialStore`]

pub mod blob;
pub mod cipher;
pub mod encryption;
pub mod error;
pub mod kdf;
pub mod master_key;
pub mod store;

pub use encryption::EncryptionService;
pub use error::{CredentialError, CryptoError, SecureStorageFailure};
pub use master_key::{MasterKeyMaterial, MasterKeyProvider};
pub use store::{CredentialStore, SecretCheck};
