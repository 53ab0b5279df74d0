//! 원격 RBAC authority 경계
//!
//! 역할/권한/사용자 영속화를 소유한 원격 백엔드에 대한 쓰기 경계입니다.
//! 동기화 엔진은 이 trait만 의존하며, 실제 HTTP 구현과 dry-run 플랜
//! 구현이 각각 이를 구현합니다.

use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role ID (원격 발급)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleId(pub String);

impl RoleId {
    /// 새 ID 생성
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// 내부 값 참조
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Permission ID (원격 발급)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionId(pub String);

impl PermissionId {
    /// 새 ID 생성
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// 내부 값 참조
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PermissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 사용자 ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    /// 새 ID 생성
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// 내부 값 참조
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 역할 생성 요청
///
/// 필드 이름이 곧 wire 포맷입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRole {
    pub role_name: String,
    pub description: String,
}

/// 권한 생성 요청
///
/// 필드 이름이 곧 wire 포맷입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePermission {
    pub permission_name: String,
    pub description: String,
}

/// Authority 호출 실패
#[derive(Debug, Error)]
pub enum AuthorityError {
    /// 백엔드가 요청을 거부함
    #[error("rejected by authority: {0}")]
    Rejected(String),

    /// 전송/디코딩 등 그 외 실패
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

pub type AuthorityResult<T> = Result<T, AuthorityError>;

/// 원격 RBAC authority
///
/// 네 작업 모두 쓰기 작업이며, 호출 측이 순서를 보장합니다.
#[async_trait]
pub trait RbacAuthority: Send + Sync {
    /// 역할 생성, 새 역할 ID 반환
    async fn create_role(&self, req: CreateRole) -> AuthorityResult<RoleId>;

    /// 권한 생성, 새 권한 ID 반환
    async fn create_permission(&self, req: CreatePermission) -> AuthorityResult<PermissionId>;

    /// 역할에 권한 부여
    async fn grant_permission(
        &self,
        role: &RoleId,
        permission: &PermissionId,
    ) -> AuthorityResult<()>;

    /// 사용자에 역할 배정
    async fn assign_role(&self, user: &UserId, role: &RoleId) -> AuthorityResult<()>;
}

/// 기록된 authority 호출 (플랜 항목)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "call")]
pub enum PlannedCall {
    CreateRole {
        role_name: String,
        description: String,
        minted: String,
    },
    CreatePermission {
        permission_name: String,
        description: String,
        minted: String,
    },
    GrantPermission {
        role_id: String,
        permission_id: String,
    },
    AssignRole {
        user_id: String,
        role_id: String,
    },
}

#[derive(Debug, Default)]
struct PlanState {
    calls: Vec<PlannedCall>,
    next_id: u64,
}

/// 호출을 실행하지 않고 기록만 하는 authority
///
/// dry-run 플랜 출력에 사용합니다. ID는 `plan-<n>` 형태의
/// 자리표시자를 발급합니다.
#[derive(Debug, Default)]
pub struct PlanAuthority {
    state: Mutex<PlanState>,
}

impl PlanAuthority {
    /// 빈 플랜 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 기록된 호출 목록
    pub fn calls(&self) -> Vec<PlannedCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PlanState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn mint(state: &mut PlanState) -> String {
        state.next_id += 1;
        format!("plan-{}", state.next_id)
    }
}

#[async_trait]
impl RbacAuthority for PlanAuthority {
    async fn create_role(&self, req: CreateRole) -> AuthorityResult<RoleId> {
        let mut state = self.lock();
        let minted = Self::mint(&mut state);
        state.calls.push(PlannedCall::CreateRole {
            role_name: req.role_name,
            description: req.description,
            minted: minted.clone(),
        });
        Ok(RoleId::new(minted))
    }

    async fn create_permission(&self, req: CreatePermission) -> AuthorityResult<PermissionId> {
        let mut state = self.lock();
        let minted = Self::mint(&mut state);
        state.calls.push(PlannedCall::CreatePermission {
            permission_name: req.permission_name,
            description: req.description,
            minted: minted.clone(),
        });
        Ok(PermissionId::new(minted))
    }

    async fn grant_permission(
        &self,
        role: &RoleId,
        permission: &PermissionId,
    ) -> AuthorityResult<()> {
        self.lock().calls.push(PlannedCall::GrantPermission {
            role_id: role.as_str().to_string(),
            permission_id: permission.as_str().to_string(),
        });
        Ok(())
    }

    async fn assign_role(&self, user: &UserId, role: &RoleId) -> AuthorityResult<()> {
        self.lock().calls.push(PlannedCall::AssignRole {
            user_id: user.as_str().to_string(),
            role_id: role.as_str().to_string(),
        });
        Ok(())
    }
}
