//! HTTP 헬퍼와 Hub authority 구현

use anyhow::Context as _;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use shk_core::rbac::{
    AuthorityError, AuthorityResult, CreatePermission, CreateRole, PermissionId, RbacAuthority,
    RoleId, UserId,
};
use shk_core::session::SessionStore;

/// 백엔드 공통 응답 envelope
///
/// 세 필드 모두 생략될 수 있으며, 없는 필드는 None으로 디코딩됩니다.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: Option<bool>,
    pub message: Option<String>,
    pub data: Option<T>,
}

pub fn client() -> Client {
    Client::new()
}

/// 저장된 토큰을 Authorization 헤더 값으로 그대로 싣습니다 (Bearer 접두사 없음)
pub fn with_auth(store: &SessionStore, req: RequestBuilder) -> anyhow::Result<RequestBuilder> {
    let token = store
        .token()
        .ok_or_else(|| anyhow::anyhow!("Not logged in. Use 'shk login' first."))?;
    Ok(req.header(reqwest::header::AUTHORIZATION, token))
}

pub async fn send_json<T: DeserializeOwned>(req: RequestBuilder) -> anyhow::Result<T> {
    let resp = req.send().await.context("request failed")?;
    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        return Err(anyhow::anyhow!("request failed ({}): {}", status, text));
    }
    let body = resp.json::<T>().await.context("invalid json response")?;
    Ok(body)
}

/// 생성 응답에서 새 ID를 꺼냅니다 (`data.id` 우선, 없으면 `data.insertId`)
#[derive(Debug, Deserialize)]
pub struct CreatedData {
    id: Option<serde_json::Value>,
    #[serde(rename = "insertId")]
    insert_id: Option<serde_json::Value>,
}

impl CreatedData {
    pub fn created_id(&self) -> Option<String> {
        id_value(self.id.as_ref()).or_else(|| id_value(self.insert_id.as_ref()))
    }
}

fn id_value(value: Option<&serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Hub를 원격 RBAC authority로 사용하는 구현
///
/// 모든 호출은 저장된 세션 토큰을 그대로 Authorization 헤더에 싣습니다.
pub struct HubAuthority {
    base_url: String,
    token: String,
    client: Client,
}

impl HubAuthority {
    /// 새 authority 생성
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            client: client(),
        }
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .header(reqwest::header::AUTHORIZATION, &self.token)
    }

    async fn create(&self, path: &str, body: impl serde::Serialize) -> AuthorityResult<String> {
        let resp: Envelope<CreatedData> = send_json(self.post(path).json(&body))
            .await
            .map_err(AuthorityError::Transport)?;

        if resp.success == Some(false) {
            return Err(AuthorityError::Rejected(
                resp.message.unwrap_or_else(|| "request rejected".to_string()),
            ));
        }

        resp.data
            .as_ref()
            .and_then(CreatedData::created_id)
            .ok_or_else(|| AuthorityError::Rejected("missing id in response".to_string()))
    }

    async fn post_ok(&self, path: &str, body: impl serde::Serialize) -> AuthorityResult<()> {
        let resp: Envelope<serde_json::Value> = send_json(self.post(path).json(&body))
            .await
            .map_err(AuthorityError::Transport)?;

        if resp.success == Some(false) {
            return Err(AuthorityError::Rejected(
                resp.message.unwrap_or_else(|| "request rejected".to_string()),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl RbacAuthority for HubAuthority {
    async fn create_role(&self, req: CreateRole) -> AuthorityResult<RoleId> {
        let id = self.create("/rbac/roles", &req).await?;
        Ok(RoleId::new(id))
    }

    async fn create_permission(&self, req: CreatePermission) -> AuthorityResult<PermissionId> {
        let id = self.create("/rbac/permissions", &req).await?;
        Ok(PermissionId::new(id))
    }

    async fn grant_permission(
        &self,
        role: &RoleId,
        permission: &PermissionId,
    ) -> AuthorityResult<()> {
        #[derive(serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Req<'a> {
            role_id: &'a str,
            permission_id: &'a str,
        }

        self.post_ok(
            "/rbac/permissions/assign",
            &Req {
                role_id: role.as_str(),
                permission_id: permission.as_str(),
            },
        )
        .await
    }

    async fn assign_role(&self, user: &UserId, role: &RoleId) -> AuthorityResult<()> {
        #[derive(serde::Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Req<'a> {
            user_id: &'a str,
            role_id: &'a str,
        }

        self.post_ok(
            "/rbac/roles/assign",
            &Req {
                user_id: user.as_str(),
                role_id: role.as_str(),
            },
        )
        .await
    }
}
