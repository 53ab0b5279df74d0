//! Shared E2E helpers for `shk` binary tests.
//!
//! Each test spawns the real binary against a scripted hub. HOME is
//! redirected to a temp directory so config, session, and draft files
//! stay isolated per test.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

/// Session token the scripted hub mints and accepts.
pub const HUB_TOKEN: &str = "shopkit-session-token";

const TIMEOUT_BASIC: Duration = Duration::from_secs(10);

/// Build a Command for the `shk` binary confined to `home`.
pub fn shk_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("shk").expect("shk binary");
    cmd.timeout(TIMEOUT_BASIC);
    cmd.env("HOME", home);
    cmd.env_remove("SHK_HUB_URL");
    cmd.env_remove("RUST_LOG");
    cmd.current_dir(home);
    cmd
}

/// Write a saved session under `home` the way the CLI itself would.
pub fn write_session(home: &Path, token: &str, permissions: &[&str]) {
    let dir = home.join(".shk");
    std::fs::create_dir_all(&dir).expect("create .shk dir");
    let session = json!({
        "token": token,
        "user": {
            "id": "u1",
            "fullname": "Grid Admin",
            "email": "admin@example.com",
            "permissions": permissions,
        },
        "permissions": permissions,
    });
    std::fs::write(dir.join("session.json"), session.to_string()).expect("write session");
}

// ─── Scripted hub ──────────────────────────────────────────────────

/// Call log and id counters behind the hub endpoints.
#[derive(Default)]
pub struct HubState {
    pub calls: Vec<String>,
    roles: usize,
    permissions: usize,
    grants: usize,
    /// 1-based grant index to reject with `success: false`.
    pub fail_grant_at: Option<usize>,
    /// Message to deny logins with (HTTP 200, `success: false`).
    pub deny_login: Option<String>,
}

pub struct Hub {
    pub state: Mutex<HubState>,
}

impl Hub {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(HubState::default()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().expect("hub state").calls.clone()
    }
}

pub fn hub_url(addr: SocketAddr) -> String {
    format!("http://{addr}/api/v1")
}

/// Serve the scripted hub on its own thread and return the bound address.
pub fn spawn_hub(hub: Arc<Hub>) -> SocketAddr {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("hub runtime");
        rt.block_on(async move {
            let app = Router::new()
                .route("/api/v1/auth/login", post(login))
                .route("/api/v1/auth/admin/login", post(admin_login))
                .route("/api/v1/user", get(list_users))
                .route("/api/v1/rbac/roles", post(create_role))
                .route("/api/v1/rbac/permissions", post(create_permission))
                .route("/api/v1/rbac/permissions/assign", post(grant_permission))
                .route("/api/v1/rbac/roles/assign", post(assign_role))
                .with_state(hub);

            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind hub");
            tx.send(listener.local_addr().expect("hub addr"))
                .expect("report hub addr");
            axum::serve(listener, app).await.expect("serve hub");
        });
    });
    rx.recv().expect("hub address")
}

fn authorized(headers: &HeaderMap) -> bool {
    // The CLI sends the token verbatim, without a Bearer prefix.
    headers.get("authorization").and_then(|v| v.to_str().ok()) == Some(HUB_TOKEN)
}

fn rejected(message: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "success": false, "message": message })),
    )
}

#[derive(Deserialize)]
struct LoginReq {
    email: String,
    password: String,
}

async fn login(State(hub): State<Arc<Hub>>, Json(req): Json<LoginReq>) -> (StatusCode, Json<Value>) {
    let mut state = hub.state.lock().expect("hub state");
    state.calls.push(format!("login {}", req.email));
    respond_login(&state, &req)
}

async fn admin_login(
    State(hub): State<Arc<Hub>>,
    Json(req): Json<LoginReq>,
) -> (StatusCode, Json<Value>) {
    let mut state = hub.state.lock().expect("hub state");
    state.calls.push(format!("admin-login {}", req.email));
    respond_login(&state, &req)
}

fn respond_login(state: &HubState, req: &LoginReq) -> (StatusCode, Json<Value>) {
    if req.password != "secret" {
        return rejected("invalid credentials");
    }
    // Valid credentials can still be turned away at the account level;
    // the backend answers 200 with `success: false` in that case.
    if let Some(message) = &state.deny_login {
        return (
            StatusCode::OK,
            Json(json!({ "success": false, "message": message })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": {
                "token": HUB_TOKEN,
                "user": {
                    "id": 7,
                    "fullname": "Grid Admin",
                    "email": req.email,
                    "permissions": ["admin"],
                },
            },
        })),
    )
}

async fn list_users(State(hub): State<Arc<Hub>>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return rejected("admin auth required");
    }
    hub.state
        .lock()
        .expect("hub state")
        .calls
        .push("users".to_string());
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": [
                {
                    "id": 7,
                    "fullname": "Grid Admin",
                    "email": "admin@example.com",
                    "permissions": ["admin"],
                },
                {
                    "id": "u12",
                    "fullname": "Store Editor",
                    "email": "editor@example.com",
                    "permissions": [],
                },
            ],
        })),
    )
}

#[derive(Deserialize)]
struct RoleReq {
    role_name: String,
    description: String,
}

async fn create_role(
    State(hub): State<Arc<Hub>>,
    headers: HeaderMap,
    Json(req): Json<RoleReq>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return rejected("admin auth required");
    }
    let mut state = hub.state.lock().expect("hub state");
    state.roles += 1;
    state
        .calls
        .push(format!("role {} [{}]", req.role_name, req.description));
    // Roles answer through the legacy numeric insertId, permissions
    // through a string id, so both decode paths get exercised.
    let id = state.roles;
    (
        StatusCode::OK,
        Json(json!({ "success": true, "data": { "insertId": id } })),
    )
}

#[derive(Deserialize)]
struct PermissionReq {
    permission_name: String,
    description: String,
}

async fn create_permission(
    State(hub): State<Arc<Hub>>,
    headers: HeaderMap,
    Json(req): Json<PermissionReq>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return rejected("admin auth required");
    }
    let mut state = hub.state.lock().expect("hub state");
    state.permissions += 1;
    state
        .calls
        .push(format!("permission {} [{}]", req.permission_name, req.description));
    let id = format!("p{}", state.permissions);
    (
        StatusCode::OK,
        Json(json!({ "success": true, "data": { "id": id } })),
    )
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GrantReq {
    role_id: String,
    permission_id: String,
}

async fn grant_permission(
    State(hub): State<Arc<Hub>>,
    headers: HeaderMap,
    Json(req): Json<GrantReq>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return rejected("admin auth required");
    }
    let mut state = hub.state.lock().expect("hub state");
    state.grants += 1;
    state
        .calls
        .push(format!("grant {} {}", req.role_id, req.permission_id));
    if state.fail_grant_at == Some(state.grants) {
        return (
            StatusCode::OK,
            Json(json!({ "success": false, "message": "grant rejected by script" })),
        );
    }
    (StatusCode::OK, Json(json!({ "success": true })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignReq {
    user_id: String,
    role_id: String,
}

async fn assign_role(
    State(hub): State<Arc<Hub>>,
    headers: HeaderMap,
    Json(req): Json<AssignReq>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return rejected("admin auth required");
    }
    hub.state
        .lock()
        .expect("hub state")
        .calls
        .push(format!("assign {} {}", req.user_id, req.role_id));
    (StatusCode::OK, Json(json!({ "success": true })))
}
