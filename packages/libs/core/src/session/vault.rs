//! 세션 영속화 저장소
//!
//! 프로세스 재시작 후에도 로그인 상태를 복원할 수 있도록
//! 세션을 통째로 저장/복원/삭제하는 vault 추상화입니다.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::session::Principal;

/// Vault에 저장되는 세션 스냅샷
///
/// 키 이름(`token`/`user`/`permissions`)은 곧 파일 포맷입니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    /// 인증 토큰
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// 로그인한 사용자
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Principal>,

    /// 부여된 권한 목록
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// 세션 영속화 vault
///
/// 읽기/쓰기 모두 동기 호출입니다. 저장 실패는 호출자가 처리합니다.
pub trait CredentialVault: Send + Sync {
    /// 저장된 세션 복원 (없으면 None)
    fn load(&self) -> Result<Option<StoredSession>>;

    /// 세션 저장 (기존 내용 전체 교체)
    fn store(&mut self, session: &StoredSession) -> Result<()>;

    /// 저장된 세션 삭제 (없어도 성공)
    fn clear(&mut self) -> Result<()>;
}

/// JSON 파일 기반 vault
#[derive(Debug, Clone)]
pub struct FileVault {
    path: PathBuf,
}

impl FileVault {
    /// 지정한 경로를 사용하는 vault 생성
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CredentialVault for FileVault {
    fn load(&self) -> Result<Option<StoredSession>> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let session: StoredSession = serde_json::from_str(&content)?;
            Ok(Some(session))
        } else {
            Ok(None)
        }
    }

    fn store(&mut self, session: &StoredSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// 메모리 기반 vault (테스트/임베딩용)
#[derive(Debug, Default)]
pub struct MemoryVault {
    saved: Option<StoredSession>,
}

impl MemoryVault {
    /// 빈 vault 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 미리 저장된 세션으로 시작하는 vault 생성
    pub fn with_session(session: StoredSession) -> Self {
        Self {
            saved: Some(session),
        }
    }
}

impl CredentialVault for MemoryVault {
    fn load(&self) -> Result<Option<StoredSession>> {
        Ok(self.saved.clone())
    }

    fn store(&mut self, session: &StoredSession) -> Result<()> {
        self.saved = Some(session.clone());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.saved = None;
        Ok(())
    }
}
