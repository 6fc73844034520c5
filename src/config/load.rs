use crate::config::types::{SETTINGS_FILE_NAME, Settings};
use anyhow::{Context, Result, bail};
use log::debug;
use std::fs;
use std::path::Path;

/// 編譯時嵌入的預設設定（不需要外部檔案）
const DEFAULT_SETTINGS_JSON: &str = include_str!("../data/default_settings.json");

impl Settings {
    /// 載入設定
    ///
    /// 優先順序：明確指定的路徑 > 工作目錄下的 `spritesheet.json` > 嵌入的預設值
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let settings = match explicit_path {
            Some(path) => {
                if !path.exists() {
                    bail!("Settings file not found: {}", path.display());
                }
                Self::load_from_file(path)?
            }
            None => {
                let path = Path::new(SETTINGS_FILE_NAME);
                if path.exists() {
                    Self::load_from_file(path)?
                } else {
                    Self::load_embedded()?
                }
            }
        };

        settings.validate()?;
        Ok(settings)
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        debug!("讀取設定檔: {}", path.display());
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))
    }

    /// 從編譯時嵌入的 JSON 載入預設設定
    pub fn load_embedded() -> Result<Self> {
        serde_json::from_str(DEFAULT_SETTINGS_JSON).context("無法解析嵌入的預設設定")
    }

    pub fn validate(&self) -> Result<()> {
        if self.presets.is_empty() {
            bail!("Settings must define at least one preset");
        }
        for preset in &self.presets {
            if !preset.frames_per_second.is_finite() || preset.frames_per_second <= 0.0 {
                bail!("Preset fps must be positive: {}", preset.frames_per_second);
            }
            if preset.max_sheet_edge == 0 {
                bail!("Preset max_edge must be positive");
            }
        }
        if self.output_template.trim().is_empty() {
            bail!("Output template must not be empty");
        }
        Ok(())
    }
}
