//! 세션/권한 상태 저장소
//!
//! # 개요
//!
//! Shopkit 클라이언트의 인증 상태는 세 필드로 구성됩니다:
//!
//! - **token**: 인증 토큰 (보유 여부가 곧 인증 여부)
//! - **user**: 로그인한 사용자 정보
//! - **permissions**: 부여된 권한 문자열 목록
//!
//! 세 필드는 login/logout에서만 함께 갱신되며, [`CredentialVault`]를 통해
//! 프로세스 재시작 후에도 복원됩니다. 권한 판정은 [`MatchPolicy`]로
//! 이름이 고정된 정책을 따릅니다.

mod vault;

pub use vault::{CredentialVault, FileVault, MemoryVault, StoredSession};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// 로그인한 사용자 정보 (백엔드 응답 형태 그대로)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    /// 사용자 ID
    #[serde(deserialize_with = "de_id")]
    pub id: String,

    /// 표시 이름
    pub fullname: String,

    /// 이메일
    pub email: String,

    /// 부여된 권한 문자열 목록
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// 로그인 성공 페이로드
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginData {
    /// 인증 토큰
    pub token: String,

    /// 로그인한 사용자
    pub user: Principal,
}

/// 백엔드가 숫자/문자열을 혼용하는 id 필드 디코딩
fn de_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "invalid id value: {other}"
        ))),
    }
}

/// 권한 매칭 정책
///
/// 요구 권한 목록과 보유 권한 목록을 비교하는 방식을 이름으로 고정합니다.
/// 더 엄격한 정책이 필요해지면 기존 variant의 의미를 바꾸지 않고
/// 새 variant로 추가합니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchPolicy {
    /// 요구 권한 중 하나라도 보유하면 충족
    #[default]
    AnyOf,
}

impl MatchPolicy {
    /// 보유 권한이 요구 목록을 충족하는지 판정
    pub fn satisfied(&self, required: &[String], held: &[String]) -> bool {
        match self {
            MatchPolicy::AnyOf => required.iter().any(|p| held.iter().any(|h| h == p)),
        }
    }
}

/// 세션/권한 상태 저장소
///
/// 현재 사용자, 인증 토큰, 부여된 권한 목록을 보관하고
/// "이 작업이 허용되는가" 질의에 답합니다. 로그인 시 메모리를 먼저
/// 갱신한 뒤 vault에 저장하며, 저장 실패 시 메모리를 원복합니다.
pub struct SessionStore {
    vault: Box<dyn CredentialVault>,
    token: Option<String>,
    user: Option<Principal>,
    permissions: Vec<String>,
    policy: MatchPolicy,
}

impl SessionStore {
    /// Vault에서 세션을 복원하며 저장소 생성
    ///
    /// 저장된 세션이 있으면 세 필드를 그대로 복원합니다.
    pub fn open(vault: Box<dyn CredentialVault>) -> Result<Self> {
        let stored = vault.load()?;
        let mut store = Self {
            vault,
            token: None,
            user: None,
            permissions: Vec::new(),
            policy: MatchPolicy::default(),
        };
        if let Some(session) = stored {
            store.token = session.token;
            store.user = session.user;
            store.permissions = session.permissions;
        }
        Ok(store)
    }

    /// 매칭 정책 교체
    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// 로그인 처리
    ///
    /// 토큰/사용자/권한 세 필드를 응답 그대로 교체합니다. 이전 세션이
    /// 있었다면 전부 대체됩니다. vault 저장이 실패하면 메모리 상태를
    /// 원복하고 에러를 반환합니다.
    pub fn login(&mut self, data: LoginData) -> Result<()> {
        if data.token.is_empty() {
            return Err(Error::InvalidLogin {
                reason: "empty token".to_string(),
            });
        }
        if data.user.id.is_empty() {
            return Err(Error::InvalidLogin {
                reason: "empty user id".to_string(),
            });
        }

        let prev_token = self.token.clone();
        let prev_user = self.user.clone();
        let prev_permissions = self.permissions.clone();

        self.token = Some(data.token);
        self.permissions = data.user.permissions.clone();
        self.user = Some(data.user);

        if let Err(e) = self.persist() {
            self.token = prev_token;
            self.user = prev_user;
            self.permissions = prev_permissions;
            return Err(e);
        }

        tracing::debug!(
            "session.login user={} permissions={}",
            self.user.as_ref().map(|u| u.id.as_str()).unwrap_or("-"),
            self.permissions.len()
        );
        Ok(())
    }

    /// 로그아웃 처리 (멱등)
    ///
    /// 메모리를 먼저 비운 뒤 vault를 삭제합니다. 로그인 상태가 아니어도
    /// 호출할 수 있습니다.
    pub fn logout(&mut self) -> Result<()> {
        self.token = None;
        self.user = None;
        self.permissions.clear();
        self.vault.clear()?;
        tracing::debug!("session.logout");
        Ok(())
    }

    /// 인증 여부 (토큰 보유 기준)
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// 인증 토큰
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// 현재 사용자
    pub fn user(&self) -> Option<&Principal> {
        self.user.as_ref()
    }

    /// 부여된 권한 목록
    pub fn permissions(&self) -> &[String] {
        &self.permissions
    }

    /// 요구 권한 충족 여부
    ///
    /// 미인증이면 항상 false, 요구 목록이 비어 있으면 true,
    /// 그 외에는 [`MatchPolicy`]에 따라 판정합니다. 에러를 내지 않습니다.
    pub fn has_permission(&self, required: &[String]) -> bool {
        if !self.is_authenticated() {
            return false;
        }
        if required.is_empty() {
            return true;
        }
        self.policy.satisfied(required, &self.permissions)
    }

    fn persist(&mut self) -> Result<()> {
        let snapshot = StoredSession {
            token: self.token.clone(),
            user: self.user.clone(),
            permissions: self.permissions.clone(),
        };
        self.vault.store(&snapshot)
    }
}
