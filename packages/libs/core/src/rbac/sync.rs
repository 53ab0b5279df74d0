//! RBAC 동기화 엔진
//!
//! 매트릭스 선택 상태를 원격 authority에 반영합니다. 모듈 고정 순서대로
//! 역할 생성 → (작업별) 권한 생성/부여 → 역할 배정을 엄격히 순차
//! 실행하며, 각 단계는 직전 단계가 발급한 ID를 사용합니다.
//!
//! 원격 상태와의 차이 계산은 하지 않습니다. 같은 매트릭스를 다시
//! 반영하면 같은 이름의 역할/권한이 새로 생성됩니다. 실패 시 그
//! 지점에서 중단하며, 이미 반영된 내용은 되돌리지 않습니다.

use serde::Serialize;

use crate::rbac::authority::{
    AuthorityError, CreatePermission, CreateRole, PermissionId, RbacAuthority, RoleId, UserId,
};
use crate::rbac::matrix::{Action, Module, PermissionMatrix};

/// 권한 이름 ("read User Management")
pub fn permission_name(module: Module, action: Action) -> String {
    format!("{} {}", action.as_str(), module.title())
}

/// 권한 설명 슬러그 ("read-user")
pub fn permission_description(module: Module, action: Action) -> String {
    format!("{}-{}", action.as_str(), module.domain())
}

/// 동기화 단계 (실패 지점 보고용)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "step")]
pub enum SyncStep {
    CreateRole { module: Module },
    CreatePermission { module: Module, action: Action },
    GrantPermission { module: Module, action: Action },
    AssignRole { module: Module },
}

impl std::fmt::Display for SyncStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncStep::CreateRole { module } => {
                write!(f, "create role \"{}\"", module.title())
            }
            SyncStep::CreatePermission { module, action } => {
                write!(f, "create permission \"{}\"", permission_name(*module, *action))
            }
            SyncStep::GrantPermission { module, action } => {
                write!(f, "grant \"{}\"", permission_name(*module, *action))
            }
            SyncStep::AssignRole { module } => {
                write!(f, "assign role \"{}\"", module.title())
            }
        }
    }
}

/// 생성과 부여까지 끝난 권한
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrantedPermission {
    /// 대상 작업
    pub action: Action,

    /// 발급된 권한 ID
    pub permission: PermissionId,
}

/// 한 모듈에 대해 반영 완료된 내용
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleApply {
    /// 대상 모듈
    pub module: Module,

    /// 발급된 역할 ID
    pub role: RoleId,

    /// 생성/부여가 끝난 권한 (고정 순서)
    pub granted: Vec<GrantedPermission>,

    /// 역할 배정 완료 여부
    pub assigned: bool,
}

/// 동기화 성공 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncOutcome {
    /// 대상 사용자
    pub user: UserId,

    /// 모듈별 반영 내용 (고정 순서)
    pub applied: Vec<ModuleApply>,

    /// 선택이 없어 건너뛴 모듈 (고정 순서)
    pub skipped: Vec<Module>,
}

/// 동기화 실패
///
/// 실패한 단계와 그때까지 반영 완료된 내용을 함께 보고합니다.
/// committed에는 실패한 모듈의 부분 반영 내용도 포함됩니다.
#[derive(Debug, thiserror::Error)]
#[error("sync aborted at {step}")]
pub struct SyncError {
    /// 실패한 단계
    pub step: SyncStep,

    /// 중단 시점까지 반영 완료된 내용
    pub committed: Vec<ModuleApply>,

    /// 실패 원인
    #[source]
    pub source: AuthorityError,
}

/// RBAC 동기화 엔진
pub struct RbacSynchronizer<'a> {
    authority: &'a dyn RbacAuthority,
}

impl<'a> RbacSynchronizer<'a> {
    /// 새 엔진 생성
    pub fn new(authority: &'a dyn RbacAuthority) -> Self {
        Self { authority }
    }

    /// 매트릭스를 대상 사용자에 반영
    ///
    /// 선택이 없는 모듈은 조용히 건너뜁니다. 호출은 전부 순차이며,
    /// 첫 실패에서 중단합니다.
    pub async fn apply(
        &self,
        user: &UserId,
        matrix: &PermissionMatrix,
    ) -> Result<SyncOutcome, SyncError> {
        let mut applied: Vec<ModuleApply> = Vec::new();
        let mut skipped: Vec<Module> = Vec::new();

        for module in Module::ALL {
            let actions = matrix.selected(module);
            if actions.is_empty() {
                skipped.push(module);
                continue;
            }

            tracing::debug!(
                "rbac.sync module={} actions={}",
                module.slug(),
                actions.len()
            );

            let role = match self
                .authority
                .create_role(CreateRole {
                    role_name: module.title().to_string(),
                    description: module.slug().to_string(),
                })
                .await
            {
                Ok(id) => id,
                Err(source) => {
                    return Err(SyncError {
                        step: SyncStep::CreateRole { module },
                        committed: applied,
                        source,
                    });
                }
            };

            let mut current = ModuleApply {
                module,
                role,
                granted: Vec::new(),
                assigned: false,
            };

            for action in actions {
                let permission = match self
                    .authority
                    .create_permission(CreatePermission {
                        permission_name: permission_name(module, action),
                        description: permission_description(module, action),
                    })
                    .await
                {
                    Ok(id) => id,
                    Err(source) => {
                        applied.push(current);
                        return Err(SyncError {
                            step: SyncStep::CreatePermission { module, action },
                            committed: applied,
                            source,
                        });
                    }
                };

                if let Err(source) = self
                    .authority
                    .grant_permission(&current.role, &permission)
                    .await
                {
                    applied.push(current);
                    return Err(SyncError {
                        step: SyncStep::GrantPermission { module, action },
                        committed: applied,
                        source,
                    });
                }

                current.granted.push(GrantedPermission { action, permission });
            }

            if let Err(source) = self.authority.assign_role(user, &current.role).await {
                applied.push(current);
                return Err(SyncError {
                    step: SyncStep::AssignRole { module },
                    committed: applied,
                    source,
                });
            }

            current.assigned = true;
            applied.push(current);
        }

        tracing::debug!(
            "rbac.sync done user={} applied={} skipped={}",
            user.as_str(),
            applied.len(),
            skipped.len()
        );

        Ok(SyncOutcome {
            user: user.clone(),
            applied,
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::rbac::authority::AuthorityResult;

    /// 호출 로그를 남기고, 지정한 순번의 호출을 실패시키는 authority
    #[derive(Default)]
    struct ScriptedAuthority {
        log: Mutex<Vec<String>>,
        roles: Mutex<u64>,
        permissions: Mutex<u64>,
        fail_at: Option<usize>,
    }

    impl ScriptedAuthority {
        fn new() -> Self {
            Self::default()
        }

        fn failing_at(index: usize) -> Self {
            Self {
                fail_at: Some(index),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }

        fn record(&self, line: String) -> AuthorityResult<()> {
            let mut log = self.log.lock().unwrap();
            let index = log.len();
            log.push(line);
            if self.fail_at == Some(index) {
                return Err(AuthorityError::Rejected("scripted failure".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl RbacAuthority for ScriptedAuthority {
        async fn create_role(&self, req: CreateRole) -> AuthorityResult<RoleId> {
            self.record(format!("create_role {} [{}]", req.role_name, req.description))?;
            let mut n = self.roles.lock().unwrap();
            *n += 1;
            Ok(RoleId::new(format!("r{n}")))
        }

        async fn create_permission(&self, req: CreatePermission) -> AuthorityResult<PermissionId> {
            self.record(format!(
                "create_permission {} [{}]",
                req.permission_name, req.description
            ))?;
            let mut n = self.permissions.lock().unwrap();
            *n += 1;
            Ok(PermissionId::new(format!("p{n}")))
        }

        async fn grant_permission(
            &self,
            role: &RoleId,
            permission: &PermissionId,
        ) -> AuthorityResult<()> {
            self.record(format!("grant {} {}", role.as_str(), permission.as_str()))
        }

        async fn assign_role(&self, user: &UserId, role: &RoleId) -> AuthorityResult<()> {
            self.record(format!("assign {} {}", user.as_str(), role.as_str()))
        }
    }

    fn matrix(cells: &[(Module, Action)]) -> PermissionMatrix {
        let mut m = PermissionMatrix::new();
        for (module, action) in cells {
            m.toggle(*module, *action);
        }
        m
    }

    #[test]
    fn test_permission_naming() {
        assert_eq!(
            permission_name(Module::UserManagement, Action::Read),
            "read User Management"
        );
        assert_eq!(
            permission_description(Module::UserManagement, Action::Read),
            "read-user"
        );
        assert_eq!(
            permission_name(Module::ProductManagement, Action::Delete),
            "delete Product Management"
        );
        assert_eq!(
            permission_description(Module::ProductManagement, Action::Delete),
            "delete-product"
        );
    }

    #[tokio::test]
    async fn test_apply_order_single_module() {
        let authority = ScriptedAuthority::new();
        let sync = RbacSynchronizer::new(&authority);
        let m = matrix(&[
            (Module::ProductManagement, Action::Write),
            (Module::ProductManagement, Action::Delete),
        ]);

        let outcome = sync.apply(&UserId::new("u9"), &m).await.unwrap();

        assert_eq!(
            authority.calls(),
            vec![
                "create_role Product Management [product-management]",
                "create_permission write Product Management [write-product]",
                "grant r1 p1",
                "create_permission delete Product Management [delete-product]",
                "grant r1 p2",
                "assign u9 r1",
            ]
        );
        assert_eq!(outcome.applied.len(), 1);
        assert!(outcome.applied[0].assigned);
        assert_eq!(
            outcome.skipped,
            vec![
                Module::UserManagement,
                Module::CategoryManagement,
                Module::OrderManagement
            ]
        );
    }

    #[tokio::test]
    async fn test_apply_end_to_end_minimal() {
        let authority = ScriptedAuthority::new();
        let sync = RbacSynchronizer::new(&authority);
        let m = matrix(&[(Module::UserManagement, Action::Read)]);

        let outcome = sync.apply(&UserId::new("u1"), &m).await.unwrap();

        assert_eq!(
            authority.calls(),
            vec![
                "create_role User Management [user-management]",
                "create_permission read User Management [read-user]",
                "grant r1 p1",
                "assign u1 r1",
            ]
        );

        let apply = &outcome.applied[0];
        assert_eq!(apply.module, Module::UserManagement);
        assert_eq!(apply.role, RoleId::new("r1"));
        assert_eq!(apply.granted.len(), 1);
        assert_eq!(apply.granted[0].action, Action::Read);
        assert!(apply.assigned);
    }

    #[tokio::test]
    async fn test_empty_matrix_makes_no_calls() {
        let authority = ScriptedAuthority::new();
        let sync = RbacSynchronizer::new(&authority);

        let outcome = sync
            .apply(&UserId::new("u1"), &PermissionMatrix::new())
            .await
            .unwrap();

        assert!(authority.calls().is_empty());
        assert!(outcome.applied.is_empty());
        assert_eq!(outcome.skipped, Module::ALL.to_vec());
    }

    #[tokio::test]
    async fn test_modules_apply_in_fixed_order() {
        let authority = ScriptedAuthority::new();
        let sync = RbacSynchronizer::new(&authority);
        // 입력 순서와 무관하게 User Management가 먼저
        let m = matrix(&[
            (Module::OrderManagement, Action::Read),
            (Module::UserManagement, Action::Read),
        ]);

        sync.apply(&UserId::new("u1"), &m).await.unwrap();

        let calls = authority.calls();
        assert_eq!(calls[0], "create_role User Management [user-management]");
        assert_eq!(calls[4], "create_role Order Management [order-management]");
        assert_eq!(calls.len(), 8);
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_committed_work() {
        // 호출 순번 4 = write 권한의 grant에서 실패
        let authority = ScriptedAuthority::failing_at(4);
        let sync = RbacSynchronizer::new(&authority);
        let m = matrix(&[
            (Module::UserManagement, Action::Read),
            (Module::UserManagement, Action::Write),
            (Module::ProductManagement, Action::Read),
        ]);

        let err = sync.apply(&UserId::new("u1"), &m).await.unwrap_err();

        assert_eq!(
            err.step,
            SyncStep::GrantPermission {
                module: Module::UserManagement,
                action: Action::Write,
            }
        );
        // 실패한 모듈의 부분 반영: 역할 + read 권한까지
        assert_eq!(err.committed.len(), 1);
        assert_eq!(err.committed[0].role, RoleId::new("r1"));
        assert_eq!(err.committed[0].granted.len(), 1);
        assert_eq!(err.committed[0].granted[0].action, Action::Read);
        assert!(!err.committed[0].assigned);

        // 이후 모듈(Product Management)은 시도조차 하지 않음
        assert_eq!(authority.calls().len(), 5);
    }

    #[tokio::test]
    async fn test_failure_on_first_call_commits_nothing() {
        let authority = ScriptedAuthority::failing_at(0);
        let sync = RbacSynchronizer::new(&authority);
        let m = matrix(&[(Module::UserManagement, Action::Read)]);

        let err = sync.apply(&UserId::new("u1"), &m).await.unwrap_err();

        assert_eq!(
            err.step,
            SyncStep::CreateRole {
                module: Module::UserManagement
            }
        );
        assert!(err.committed.is_empty());
        assert!(err.to_string().contains("create role \"User Management\""));
    }

    #[tokio::test]
    async fn test_repeat_apply_creates_duplicates() {
        let authority = ScriptedAuthority::new();
        let sync = RbacSynchronizer::new(&authority);
        let m = matrix(&[(Module::UserManagement, Action::Read)]);

        let first = sync.apply(&UserId::new("u1"), &m).await.unwrap();
        let second = sync.apply(&UserId::new("u1"), &m).await.unwrap();

        // 같은 이름의 역할이 매번 새로 생성됨
        assert_eq!(first.applied[0].role, RoleId::new("r1"));
        assert_eq!(second.applied[0].role, RoleId::new("r2"));
        assert_eq!(
            authority
                .calls()
                .iter()
                .filter(|c| c.starts_with("create_role User Management"))
                .count(),
            2
        );
    }
}
