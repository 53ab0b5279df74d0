//! 권한 매트릭스 편집/반영 명령어

use shk_core::rbac::{
    Action, Module, PermissionMatrix, PlanAuthority, PlannedCall, RbacSynchronizer, SyncError,
    SyncOutcome, UserId,
};
use shk_core::session::SessionStore;

use crate::commands::{ensure_access, http::HubAuthority};
use crate::config::CliConfig;
use crate::draft;
use crate::OutputFormat;

fn parse_module(input: &str) -> anyhow::Result<Module> {
    Module::from_str(input).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown module '{}'. Valid modules: {}",
            input,
            Module::ALL.map(|m| m.slug()).join(", ")
        )
    })
}

fn parse_action(input: &str) -> anyhow::Result<Action> {
    Action::from_str(input).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown action '{}'. Valid actions: {}",
            input,
            Action::ALL.map(|a| a.as_str()).join(", ")
        )
    })
}

fn mark(selected: bool) -> &'static str {
    if selected {
        "[x]"
    } else {
        "[ ]"
    }
}

fn print_row(matrix: &PermissionMatrix, module: Module) {
    let selected = matrix.selected(module);
    if selected.is_empty() {
        println!("{}: (none)", module.title());
    } else {
        println!(
            "{}: {}",
            module.title(),
            selected
                .iter()
                .map(|a| a.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
}

/// 드래프트 현황 출력
pub fn show(format: OutputFormat) -> anyhow::Result<()> {
    let matrix = draft::load()?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&matrix)?),
        OutputFormat::Text => {
            println!(
                "{:<22} {:<5} {:<5} {:<6} {:<6}",
                "Module",
                Action::Read.title(),
                Action::Write.title(),
                Action::Update.title(),
                Action::Delete.title(),
            );
            for module in Module::ALL {
                println!(
                    "{:<22} {:<5} {:<5} {:<6} {:<6}",
                    module.title(),
                    mark(matrix.is_selected(module, Action::Read)),
                    mark(matrix.is_selected(module, Action::Write)),
                    mark(matrix.is_selected(module, Action::Update)),
                    mark(matrix.is_selected(module, Action::Delete)),
                );
            }
        }
    }
    Ok(())
}

/// 셀 토글 후 저장
pub fn toggle(module: &str, action: &str) -> anyhow::Result<()> {
    let module = parse_module(module)?;
    let action = parse_action(action)?;

    let mut matrix = draft::load()?;
    matrix.toggle(module, action);
    draft::save(&matrix)?;

    print_row(&matrix, module);
    Ok(())
}

/// 모듈 일괄 토글 후 저장
pub fn toggle_all(module: &str) -> anyhow::Result<()> {
    let module = parse_module(module)?;

    let mut matrix = draft::load()?;
    matrix.toggle_all(module);
    draft::save(&matrix)?;

    print_row(&matrix, module);
    Ok(())
}

/// 드래프트 삭제
pub fn clear() -> anyhow::Result<()> {
    draft::clear()?;
    println!("Draft cleared.");
    Ok(())
}

/// 드래프트를 대상 사용자에 반영
///
/// `--dry-run`이면 원격 호출 없이 실행될 호출 순서만 출력합니다.
/// 실패 시 그 지점까지 반영된 내용을 보고하며, 되돌리지 않습니다.
pub async fn apply(
    config: &CliConfig,
    store: &SessionStore,
    hub: Option<&str>,
    user: &str,
    dry_run: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    ensure_access(store, &["admin".to_string()]);

    let matrix = draft::load()?;
    let user_id = UserId::new(user);

    if dry_run {
        let plan = PlanAuthority::new();
        let sync = RbacSynchronizer::new(&plan);
        let outcome = sync.apply(&user_id, &matrix).await?;
        return print_plan(&plan.calls(), &outcome, format);
    }

    let token = store
        .token()
        .ok_or_else(|| anyhow::anyhow!("Not logged in. Use 'shk login' first."))?;
    let authority = HubAuthority::new(config.hub_url(hub), token);
    let sync = RbacSynchronizer::new(&authority);

    match sync.apply(&user_id, &matrix).await {
        Ok(outcome) => print_outcome(&outcome, format),
        Err(err) => {
            report_partial(&err);
            Err(err.into())
        }
    }
}

fn print_plan(
    calls: &[PlannedCall],
    outcome: &SyncOutcome,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(calls)?),
        OutputFormat::Text => {
            if calls.is_empty() {
                println!("Nothing to apply.");
                return Ok(());
            }
            println!("Plan for user {} (no changes made):", outcome.user);
            for (index, call) in calls.iter().enumerate() {
                let line = match call {
                    PlannedCall::CreateRole {
                        role_name, minted, ..
                    } => format!("create role \"{role_name}\" -> {minted}"),
                    PlannedCall::CreatePermission {
                        permission_name,
                        minted,
                        ..
                    } => format!("create permission \"{permission_name}\" -> {minted}"),
                    PlannedCall::GrantPermission {
                        role_id,
                        permission_id,
                    } => format!("grant {permission_id} to {role_id}"),
                    PlannedCall::AssignRole { user_id, role_id } => {
                        format!("assign {role_id} to user {user_id}")
                    }
                };
                println!("{:>3}. {}", index + 1, line);
            }
        }
    }
    Ok(())
}

fn print_outcome(outcome: &SyncOutcome, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(outcome)?),
        OutputFormat::Text => {
            if outcome.applied.is_empty() {
                println!("Nothing to apply.");
                return Ok(());
            }
            println!(
                "Applied {} module(s) for user {}:",
                outcome.applied.len(),
                outcome.user
            );
            for apply in &outcome.applied {
                println!(
                    "- {} (role {}): {}",
                    apply.module.title(),
                    apply.role,
                    apply
                        .granted
                        .iter()
                        .map(|g| g.action.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
            if !outcome.skipped.is_empty() {
                println!(
                    "Skipped (no selections): {}",
                    outcome
                        .skipped
                        .iter()
                        .map(|m| m.title())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
        }
    }
    Ok(())
}

fn report_partial(err: &SyncError) {
    if err.committed.is_empty() {
        eprintln!("No changes were applied.");
        return;
    }
    eprintln!("Already applied before the failure (not rolled back):");
    for apply in &err.committed {
        let granted = if apply.granted.is_empty() {
            "(none)".to_string()
        } else {
            apply
                .granted
                .iter()
                .map(|g| g.action.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let assigned = if apply.assigned {
            "assigned"
        } else {
            "not assigned"
        };
        eprintln!(
            "- {} (role {}): {} [{}]",
            apply.module.title(),
            apply.role,
            granted,
            assigned
        );
    }
    eprintln!("Re-running apply will create new roles/permissions for these selections.");
}
