//! Credential 명령어
//!
//! UI 레이어(설정 화면, 생성 화면)가 호출하는 API 키 관리 명령입니다.
//! - 저장/조회/삭제는 CredentialStore를 통해 암호화된 상태로 처리
//! - 오류는 `CommandError { code, message }`로만 노출 (원시 오류는 경계를 넘지 않음)

use serde::{Deserialize, Serialize};

use crate::error::{AppError, CommandError, CommandResult};
use crate::secrets::{CredentialStore, SecretCheck};

/// 시크릿 저장 요청
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCredentialArgs {
    pub name: String,
    pub value: String,
}

/// 시크릿별 상태
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialStatusDto {
    pub name: String,
    pub stored: bool,
    pub validated: bool,
    pub validated_at: Option<i64>,
}

/// 필수 시크릿 전체 상태
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsStatusDto {
    pub entries: Vec<CredentialStatusDto>,
    /// 모든 필수 시크릿이 저장되어 있고 검증을 통과했는지
    pub ready: bool,
}

fn validate_name(name: &str) -> Result<(), AppError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if !valid {
        return Err(AppError::InvalidArgument(format!(
            "secret name must match [a-z0-9_-]+, got '{}'",
            name
        )));
    }
    Ok(())
}

fn validate_value(value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidArgument(
            "secret value must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn status_of(store: &CredentialStore, name: &str, check: SecretCheck) -> CredentialStatusDto {
    let validated = check.stored && check.valid;
    CredentialStatusDto {
        name: name.to_string(),
        stored: check.stored,
        validated,
        validated_at: store
            .validation_record(name)
            .filter(|r| validated && r.validated)
            .map(|r| r.timestamp),
    }
}

/// 시크릿 저장 (검증 없이)
pub async fn credentials_save(
    store: &CredentialStore,
    args: SaveCredentialArgs,
) -> CommandResult<()> {
    validate_name(&args.name)?;
    validate_value(&args.value)?;

    store
        .save(&args.name, args.value.trim())
        .await
        .map_err(|e| CommandError::from(AppError::from(e)))
}

/// 원격 검증 후 유효한 경우에만 저장
///
/// 설정 화면의 "Save & Validate" 동작입니다. 거부된 키는 저장하지 않습니다.
pub async fn credentials_save_and_validate(
    store: &CredentialStore,
    args: SaveCredentialArgs,
) -> CommandResult<CredentialStatusDto> {
    validate_name(&args.name)?;
    validate_value(&args.value)?;
    let value = args.value.trim();

    let validator = store.environment().validator_for(&args.name).ok_or_else(|| {
        AppError::InvalidArgument(format!("no validator for secret '{}'", args.name))
    })?;

    match validator.validate(value).await {
        Ok(true) => {}
        Ok(false) => return Err(AppError::InvalidApiKey(args.name).into()),
        Err(e) => return Err(AppError::Validation(e).into()),
    }

    store.save(&args.name, value).await.map_err(AppError::from)?;
    store.record_validation(&args.name, true);

    Ok(status_of(
        store,
        &args.name,
        SecretCheck {
            stored: true,
            valid: true,
        },
    ))
}

/// 단일 시크릿 조회
pub async fn credentials_get(store: &CredentialStore, name: String) -> CommandResult<Option<String>> {
    validate_name(&name)?;
    Ok(store.get(&name).await)
}

/// 시크릿 삭제 (검증 기록 포함)
pub async fn credentials_remove(store: &CredentialStore, name: String) -> CommandResult<()> {
    validate_name(&name)?;
    store.remove(&name).await;
    Ok(())
}

/// 필수 시크릿 상태 조회
///
/// 캐시된 검증 기록이 만료된 시크릿은 이 호출에서 다시 원격 검증됩니다.
pub async fn credentials_status(
    store: &CredentialStore,
    names: Vec<String>,
) -> CommandResult<CredentialsStatusDto> {
    for name in &names {
        validate_name(name)?;
    }

    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let checks = store.check_all(&refs).await;
    let ready = checks.iter().all(|check| check.valid);

    let entries = names
        .iter()
        .zip(checks)
        .map(|(name, check)| status_of(store, name, check))
        .collect();

    Ok(CredentialsStatusDto { entries, ready })
}

/// 모든 로컬 시크릿과 마스터키 재료 삭제 (로그아웃/초기화)
pub async fn credentials_clear_all(store: &CredentialStore) -> CommandResult<()> {
    store.clear_all().await;
    Ok(())
}
