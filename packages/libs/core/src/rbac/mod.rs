//! RBAC 매트릭스 편집과 원격 동기화
//!
//! # 개요
//!
//! 모듈 × 작업 선택 매트릭스를 편집하고, 확정된 매트릭스를 원격
//! authority에 역할 생성 → 권한 생성/부여 → 역할 배정 순서로
//! 반영합니다.
//!
//! # 모듈 구조
//!
//! - `matrix`: 모듈/작업 어휘와 희소 선택 매트릭스
//! - `authority`: 원격 쓰기 경계 trait과 dry-run 플랜 구현
//! - `sync`: 순차 동기화 엔진

mod authority;
mod matrix;
mod sync;

pub use authority::{
    AuthorityError, AuthorityResult, CreatePermission, CreateRole, PermissionId, PlanAuthority,
    PlannedCall, RbacAuthority, RoleId, UserId,
};
pub use matrix::{Action, Module, PermissionMatrix};
pub use sync::{
    permission_description, permission_name, GrantedPermission, ModuleApply, RbacSynchronizer,
    SyncError, SyncOutcome, SyncStep,
};
