//! 접근 게이트
//!
//! 세션 저장소 위에서 허용/거부를 판정하는 계층입니다.
//! 거부는 정상 결과이며 에러가 아닙니다. 보호된 내용을 조용히
//! 생략하거나(fallback 없이) 지정된 경로로 이동시킵니다.

use serde::Serialize;

use crate::session::SessionStore;

/// 접근 판정 결과
///
/// 허용/거부 두 상태뿐입니다. 로딩 같은 중간 상태는 없습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// 접근 허용
    Allowed,
    /// 접근 거부
    Denied,
}

impl Decision {
    /// 허용 여부
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }
}

/// 조건부 출력 게이트
///
/// 요구 권한을 충족하는 경우에만 내용을 생성합니다.
pub struct AccessGate<'a> {
    store: &'a SessionStore,
}

impl<'a> AccessGate<'a> {
    /// 새 게이트 생성
    pub fn new(store: &'a SessionStore) -> Self {
        Self { store }
    }

    /// 요구 권한에 대한 판정
    pub fn check(&self, required: &[String]) -> Decision {
        if self.store.has_permission(required) {
            Decision::Allowed
        } else {
            Decision::Denied
        }
    }

    /// 허용 시에만 내용 생성
    ///
    /// 거부되면 closure를 호출하지 않고 None을 반환합니다.
    pub fn render<T>(&self, required: &[String], produce: impl FnOnce() -> T) -> Option<T> {
        match self.check(required) {
            Decision::Allowed => Some(produce()),
            Decision::Denied => None,
        }
    }
}

/// 보호된 경로 가드
///
/// 진입 시점에 한 번 판정하며, 이후 권한 변화를 다시 확인하지 않습니다.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    required: Vec<String>,
    fallback: String,
}

/// 가드 판정 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// 진입 허용
    Proceed,
    /// fallback 경로로 이동
    Redirect(String),
}

impl RouteGuard {
    /// 요구 권한과 거부 시 이동할 fallback 경로로 가드 생성
    pub fn new(required: Vec<String>, fallback: impl Into<String>) -> Self {
        Self {
            required,
            fallback: fallback.into(),
        }
    }

    /// 진입 판정
    pub fn evaluate(&self, store: &SessionStore) -> GuardOutcome {
        if store.has_permission(&self.required) {
            GuardOutcome::Proceed
        } else {
            GuardOutcome::Redirect(self.fallback.clone())
        }
    }
}
