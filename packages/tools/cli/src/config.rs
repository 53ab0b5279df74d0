//! CLI 설정

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// 설정이 없을 때 사용하는 Hub URL
pub const DEFAULT_HUB_URL: &str = "http://localhost:3000/api/v1";

/// CLI 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// 기본 Hub URL
    pub default_hub: Option<String>,
}

impl CliConfig {
    /// 설정 파일 경로
    fn config_path() -> anyhow::Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?;
        Ok(home.join(".shk").join("config.json"))
    }

    /// 세션 vault 파일 경로
    pub fn session_path() -> anyhow::Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?;
        Ok(home.join(".shk").join("session.json"))
    }

    /// 설정 로드
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: CliConfig = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// 설정 저장
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Hub URL 결정 (CLI 옵션 > 설정 파일 > SHK_HUB_URL > 기본값)
    pub fn hub_url(&self, override_url: Option<&str>) -> String {
        override_url
            .map(|s| s.to_string())
            .or_else(|| self.default_hub.clone())
            .or_else(|| std::env::var("SHK_HUB_URL").ok())
            .unwrap_or_else(|| DEFAULT_HUB_URL.to_string())
    }
}
