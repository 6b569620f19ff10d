//! Encrypted Blob 포맷
//!
//! 바이트 레이아웃:
//! - salt: 16 bytes
//! - nonce: 12 bytes
//! - ciphertext: AEAD 결과 (= 암호문 + 16 bytes 태그)
//!
//! 저장 시에는 전체를 base64(STANDARD)로 인코딩한 문자열 하나로 다룹니다.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use super::cipher::{NONCE_LEN, TAG_LEN};
use super::error::CryptoError;
use super::kdf::SALT_LEN;

/// salt + nonce 헤더 길이
pub const HEADER_LEN: usize = SALT_LEN + NONCE_LEN;

/// 유효한 blob의 최소 길이 (빈 평문 + 태그)
pub const MIN_BLOB_LEN: usize = HEADER_LEN + TAG_LEN;

/// 분해된 blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedBlob {
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
}

/// salt || nonce || ciphertext → base64 문자열
pub fn pack(salt: &[u8; SALT_LEN], nonce: &[u8; NONCE_LEN], ciphertext: &[u8]) -> String {
    let mut combined = Vec::with_capacity(HEADER_LEN + ciphertext.len());
    combined.extend_from_slice(salt);
    combined.extend_from_slice(nonce);
    combined.extend_from_slice(ciphertext);
    BASE64.encode(combined)
}

/// base64 문자열 → (salt, nonce, ciphertext)
///
/// 최소 길이보다 짧거나 base64가 아니면 `MalformedBlob`
pub fn unpack(encoded: &str) -> Result<EncryptedBlob, CryptoError> {
    let combined = BASE64
        .decode(encoded.trim())
        .map_err(|e| CryptoError::MalformedBlob(format!("invalid base64: {}", e)))?;

    if combined.len() < MIN_BLOB_LEN {
        return Err(CryptoError::MalformedBlob(format!(
            "expected at least {} bytes, got {}",
            MIN_BLOB_LEN,
            combined.len()
        )));
    }

    let (salt_bytes, rest) = combined.split_at(SALT_LEN);
    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);

    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(salt_bytes);
    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(nonce_bytes);

    Ok(EncryptedBlob {
        salt,
        nonce,
        ciphertext: ciphertext.to_vec(),
    })
}
