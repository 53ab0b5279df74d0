//! 사용자 조회

use shk_core::session::{Principal, SessionStore};

use crate::commands::{ensure_access, http};
use crate::config::CliConfig;
use crate::OutputFormat;

/// 사용자 목록 조회 (역할 배정 대상 선택용)
pub async fn list(
    config: &CliConfig,
    store: &SessionStore,
    hub: Option<&str>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    ensure_access(store, &["admin".to_string()]);

    let base = config.hub_url(hub);
    let client = http::client();

    let resp: http::Envelope<Vec<Principal>> =
        http::send_json(http::with_auth(store, client.get(format!("{base}/user")))?).await?;
    let users = resp.data.unwrap_or_default();

    if users.is_empty() {
        println!("No users.");
        return Ok(());
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&users)?),
        OutputFormat::Text => {
            for user in users {
                println!("- {} {} ({})", user.id, user.fullname, user.email);
            }
        }
    }
    Ok(())
}
