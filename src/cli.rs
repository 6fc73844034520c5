use crate::config::{FrameSamplingParams, Settings};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "video_spritesheet",
    version,
    about = "Pack sampled video frames into flipbook sprite sheets"
)]
pub struct Cli {
    /// Input video (mp4/webm); falls back to `default_input` from the settings file
    pub input: Option<PathBuf>,

    /// Output directory (default from settings: media/sprites)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Base output name (default: input file name without extension)
    #[arg(long)]
    pub base: Option<String>,

    /// Settings file (default: ./spritesheet.json if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Sampling rate; replaces the configured presets with a single sheet
    #[arg(long)]
    pub fps: Option<f64>,

    /// Maximum sheet width/height in pixels; replaces the configured presets
    #[arg(long)]
    pub max_edge: Option<u32>,

    /// Do not print the asset preset snippets
    #[arg(long)]
    pub no_snippets: bool,

    /// Write the effective settings to this file and exit
    #[arg(long)]
    pub write_config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// 命令列指定 `--fps` 或 `--max-edge` 時，只產生一張精靈圖
    ///
    /// 只給其中一個時，另一個沿用第一個設定的值。
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if self.fps.is_none() && self.max_edge.is_none() {
            return;
        }

        let first = settings
            .presets
            .first()
            .copied()
            .unwrap_or(FrameSamplingParams::new(30.0, 4096));

        settings.presets = vec![FrameSamplingParams::new(
            self.fps.unwrap_or(first.frames_per_second),
            self.max_edge.unwrap_or(first.max_sheet_edge),
        )];
    }
}
