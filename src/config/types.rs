use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 預設的設定檔名稱（位於目前工作目錄）
pub const SETTINGS_FILE_NAME: &str = "spritesheet.json";

/// 取樣參數：每秒取幾幀、輸出圖最大邊長
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSamplingParams {
    #[serde(rename = "fps")]
    pub frames_per_second: f64,
    #[serde(rename = "max_edge")]
    pub max_sheet_edge: u32,
}

impl FrameSamplingParams {
    #[must_use]
    pub const fn new(frames_per_second: f64, max_sheet_edge: u32) -> Self {
        Self {
            frames_per_second,
            max_sheet_edge,
        }
    }
}

/// 使用者設定
///
/// `default_input` 沒有隱含的預設路徑；未設定時 CLI 必須明確給輸入檔。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub default_input: Option<PathBuf>,
    pub output_dir: PathBuf,
    /// 可用的替換欄位：`{base}` `{max_edge}` `{fps}` `{cols}` `{rows}`
    pub output_template: String,
    pub presets: Vec<FrameSamplingParams>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_input: None,
            output_dir: PathBuf::from("media/sprites"),
            output_template: "{base}_{max_edge}px_{fps}fps_{cols}x{rows}.png".to_string(),
            presets: vec![FrameSamplingParams::new(30.0, 4096)],
        }
    }
}
