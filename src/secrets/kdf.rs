//! Key Derivation (PBKDF2-HMAC-SHA256)

use pbkdf2::pbkdf2_hmac;
use rand::Rng;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::master_key::MasterKeyMaterial;

/// 파생 키 길이 (256-bit)
pub const DERIVED_KEY_LEN: usize = 32;

/// Salt 길이 (128-bit)
pub const SALT_LEN: usize = 16;

/// PBKDF2 최소 반복 횟수
pub const MIN_PBKDF2_ITERATIONS: u32 = 100_000;

/// PBKDF2 기본 반복 횟수
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 100_000;

/// 암호화/복호화 1회에만 쓰이는 대칭키 (drop 시 zeroize, 저장하지 않음)
pub struct DerivedKey(Zeroizing<[u8; DERIVED_KEY_LEN]>);

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; DERIVED_KEY_LEN] {
        &self.0
    }
}

/// 새 salt 생성 (CSPRNG)
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill(&mut salt);
    salt
}

/// 마스터키 재료 + salt로 키 파생
///
/// 같은 입력이면 항상 같은 키가 나와야 복호화가 가능합니다.
pub fn derive_key(
    master_key: &MasterKeyMaterial,
    salt: &[u8; SALT_LEN],
    iterations: u32,
) -> DerivedKey {
    let mut out = Zeroizing::new([0u8; DERIVED_KEY_LEN]);
    pbkdf2_hmac::<Sha256>(master_key.as_bytes(), salt, iterations, out.as_mut_slice());
    DerivedKey(out)
}
