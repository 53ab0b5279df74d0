//! shk-core: Shopkit 공통 핵심 라이브러리
//!
//! 이 크레이트는 Shopkit 관리 도구가 공유하는 핵심 타입과 로직을 제공합니다.
//!
//! # 모듈 구조
//!
//! - `session`: 세션/권한 상태 저장소와 영속화 vault
//! - `gate`: 허용/거부 판정과 보호된 경로 가드
//! - `rbac`: 권한 매트릭스 편집 및 원격 동기화
//! - `error`: 공통 에러 타입

pub mod error;
pub mod gate;
pub mod rbac;
pub mod session;

pub use error::{Error, Result};
