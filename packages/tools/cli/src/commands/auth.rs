//! 인증 명령어

use serde::Serialize;

use shk_core::gate::AccessGate;
use shk_core::session::{LoginData, SessionStore};

use crate::commands::http;
use crate::config::CliConfig;
use crate::OutputFormat;

/// Hub에 로그인하고 세션을 저장합니다
///
/// 이메일/비밀번호를 옵션으로 받고, 생략된 값은 프롬프트로 입력받습니다.
/// `--admin`이면 관리자 로그인 엔드포인트를 사용합니다.
pub async fn login(
    config: &CliConfig,
    store: &mut SessionStore,
    hub: Option<&str>,
    admin: bool,
    email: Option<String>,
    password: Option<String>,
) -> anyhow::Result<()> {
    let base = config.hub_url(hub);

    let email = match email {
        Some(value) => value,
        None => inquire::Text::new("Email:").prompt()?,
    };
    let password = match password {
        Some(value) => value,
        None => inquire::Password::new("Password:")
            .without_confirmation()
            .prompt()?,
    };

    #[derive(Serialize)]
    struct Req<'a> {
        email: &'a str,
        password: &'a str,
    }

    let path = if admin { "/auth/admin/login" } else { "/auth/login" };
    let resp: http::Envelope<LoginData> = http::send_json(
        http::client().post(format!("{base}{path}")).json(&Req {
            email: &email,
            password: &password,
        }),
    )
    .await?;

    if resp.success == Some(false) {
        anyhow::bail!(resp.message.unwrap_or_else(|| "login failed".to_string()));
    }
    let data = resp
        .data
        .ok_or_else(|| anyhow::anyhow!("missing login data in response"))?;

    store.login(data)?;

    if let Some(user) = store.user() {
        println!("Logged in as {} ({})", user.fullname, user.email);
    }
    if store.permissions().is_empty() {
        println!("No permissions granted.");
    }
    Ok(())
}

/// 세션을 삭제합니다
pub fn logout(store: &mut SessionStore) -> anyhow::Result<()> {
    store.logout()?;
    println!("Logged out.");
    Ok(())
}

/// 현재 세션 정보를 출력합니다
pub fn whoami(store: &SessionStore, format: OutputFormat) -> anyhow::Result<()> {
    let user = match store.user() {
        Some(user) => user,
        None => {
            println!("Not logged in");
            return Ok(());
        }
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(user)?);
        }
        OutputFormat::Text => {
            println!("{} ({})", user.fullname, user.email);
            println!("id: {}", user.id);
            if store.permissions().is_empty() {
                println!("permissions: (none)");
            } else {
                println!("permissions: {}", store.permissions().join(", "));
            }
        }
    }
    Ok(())
}

/// 요구 권한에 대한 허용/거부를 판정합니다
///
/// 권한을 지정하지 않으면 세션 존재 여부만 확인합니다.
/// 거부 시 종료 코드 1로 끝납니다.
pub fn can(
    store: &SessionStore,
    required: &[String],
    format: OutputFormat,
) -> anyhow::Result<()> {
    let gate = AccessGate::new(store);
    let decision = gate.check(required);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&decision)?),
        OutputFormat::Text => {
            if decision.is_allowed() {
                println!("allowed");
            } else {
                println!("denied");
            }
        }
    }

    if !decision.is_allowed() {
        std::process::exit(1);
    }
    Ok(())
}
