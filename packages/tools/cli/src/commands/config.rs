//! CLI 설정 명령어

use crate::config::CliConfig;

/// 기본 Hub URL 설정
pub fn set(hub: Option<String>) -> anyhow::Result<()> {
    let mut config = CliConfig::load()?;
    if let Some(hub) = hub {
        config.default_hub = Some(hub);
    }
    config.save()?;
    println!("Config saved.");
    show(&config)
}

/// 현재 설정 출력
pub fn show(config: &CliConfig) -> anyhow::Result<()> {
    match &config.default_hub {
        Some(hub) => println!("default hub: {hub}"),
        None => println!("default hub: (not set, using {})", crate::config::DEFAULT_HUB_URL),
    }
    Ok(())
}
