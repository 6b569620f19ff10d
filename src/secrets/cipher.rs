//! Authenticated Cipher (ChaCha20-Poly1305)
//!
//! - key: 256-bit (PBKDF2 파생 키)
//! - nonce: 96-bit, 암호화마다 새로 생성
//! - tag: 128-bit, 검증 실패 시 평문을 돌려주지 않음

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::Rng;
use zeroize::Zeroizing;

use super::error::CryptoError;
use super::kdf::DerivedKey;

/// Nonce 길이 (ChaCha20-Poly1305용 12 bytes)
pub const NONCE_LEN: usize = 12;

/// 인증 태그 길이 (16 bytes)
pub const TAG_LEN: usize = 16;

/// 랜덤 nonce 생성 (CSPRNG)
pub fn generate_nonce() -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    rand::thread_rng().fill(&mut nonce);
    nonce
}

/// 평문 암호화 → 암호문 + 태그
pub fn seal(
    key: &DerivedKey,
    nonce: &[u8; NONCE_LEN],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = ChaCha20Poly1305::new(key.as_bytes().into());
    cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))
}

/// 암호문 + 태그 복호화
///
/// 태그가 맞지 않으면 `AuthenticationFailed` (부분 평문 없음)
pub fn open(
    key: &DerivedKey,
    nonce: &[u8; NONCE_LEN],
    sealed: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let cipher = ChaCha20Poly1305::new(key.as_bytes().into());
    cipher
        .decrypt(Nonce::from_slice(nonce), sealed)
        .map(Zeroizing::new)
        .map_err(|_| CryptoError::AuthenticationFailed)
}
