//! 매트릭스 드래프트 관리
//!
//! `.shk/matrix.json` 파일을 통해 repo-local 매트릭스 초안을 관리합니다.
//! `shk grid` 편집 명령이 이 파일을 갱신하고, `shk grid apply`가
//! 이 파일의 스냅샷을 반영합니다.

use std::path::Path;

use shk_core::rbac::PermissionMatrix;

const DRAFT_PATH: &str = ".shk/matrix.json";

/// 드래프트 로드 (없으면 빈 매트릭스)
pub fn load() -> anyhow::Result<PermissionMatrix> {
    load_from(Path::new(DRAFT_PATH))
}

/// 드래프트 저장
pub fn save(matrix: &PermissionMatrix) -> anyhow::Result<()> {
    save_to(Path::new(DRAFT_PATH), matrix)
}

/// 드래프트 파일 삭제
pub fn clear() -> anyhow::Result<()> {
    clear_at(Path::new(DRAFT_PATH))
}

fn load_from(path: &Path) -> anyhow::Result<PermissionMatrix> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let matrix: PermissionMatrix = serde_json::from_str(&content)?;
        Ok(matrix)
    } else {
        Ok(PermissionMatrix::new())
    }
}

fn save_to(path: &Path, matrix: &PermissionMatrix) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(matrix)?;
    std::fs::write(path, content)?;
    Ok(())
}

fn clear_at(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}
