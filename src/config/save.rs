use crate::config::types::Settings;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// 將目前生效的設定寫成 JSON，方便使用者修改後再載入
pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    let content = serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;

    fs::write(path, content)
        .with_context(|| format!("Failed to write settings to {}", path.display()))?;

    Ok(())
}
