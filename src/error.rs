//! 錯誤型別
//!
//! 每個變體的訊息都以失敗的階段開頭（probe / grid / render / io），
//! 讓 CLI 可以直接輸出單行診斷訊息。

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SheetError>;

#[derive(Debug, Error)]
pub enum SheetError {
    /// ffprobe 無法執行或輸出無法解析
    #[error("probe failed for {path}: {reason}")]
    Probe { path: PathBuf, reason: String },

    /// 沒有任何網格能放進邊長上限
    #[error(
        "grid not found: no layout fits total_frames={total_frames}, source={source_width}x{source_height}, max_edge={max_edge}"
    )]
    GridNotFound {
        total_frames: u32,
        source_width: u32,
        source_height: u32,
        max_edge: u32,
    },

    /// ffmpeg 結束碼非零或未產生輸出
    #[error("render failed for {path}: {reason}")]
    Render { path: PathBuf, reason: String },

    /// 底層錯誤只放在 `source`，`{:#}` 串接時才不會重複
    #[error("io error at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("spec incomplete: missing {0}")]
    MissingField(&'static str),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("cancelled: shutdown requested before all sheets were rendered")]
    Cancelled,
}

impl SheetError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
