//! CLI 명령어 구현

use shk_core::gate::{GuardOutcome, RouteGuard};
use shk_core::session::SessionStore;

pub mod auth;
pub mod config;
pub mod grid;
pub mod http;
pub mod users;

/// 명령 진입 가드. 요구 권한을 만족하지 못하면 안내 후 즉시 종료합니다.
pub fn ensure_access(store: &SessionStore, required: &[String]) {
    let guard = RouteGuard::new(required.to_vec(), "/unauthorized");
    if let GuardOutcome::Redirect(_) = guard.evaluate(store) {
        println!("Unauthorized");
        std::process::exit(1);
    }
}
