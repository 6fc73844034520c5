use super::sheet_spec::{SheetSpec, format_fps};
use crate::error::{Result, SheetError};
use crate::tools::flatten_stderr;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

/// 將 `SheetSpec` 轉成實際的圖檔
pub trait SheetRenderer {
    fn render(&self, spec: &SheetSpec, source_path: &Path) -> Result<()>;
}

/// 建立 ffmpeg 濾鏡鏈：取樣 → lanczos 縮放 → RGBA → 拼貼
#[must_use]
pub fn build_tile_filter(spec: &SheetSpec) -> String {
    format!(
        "fps={},scale={}:{}:flags=lanczos,format=rgba,tile={}x{}",
        format_fps(spec.sampling_fps),
        spec.frame_width,
        spec.frame_height,
        spec.columns,
        spec.rows
    )
}

/// 渲染中的暫存路徑，保留副檔名讓 ffmpeg 判斷輸出格式
///
/// 例如 `sheet.png` → `sheet.partial.png`
#[must_use]
pub fn partial_path(output_path: &Path) -> PathBuf {
    let stem = output_path
        .file_stem()
        .map_or_else(|| "sheet".to_string(), |s| s.to_string_lossy().to_string());
    let file_name = match output_path.extension() {
        Some(ext) => format!("{stem}.partial.{}", ext.to_string_lossy()),
        None => format!("{stem}.partial"),
    };
    output_path.with_file_name(file_name)
}

/// 使用 ffmpeg 的 tile 濾鏡產生精靈圖
#[derive(Debug, Clone)]
pub struct FfmpegTileRenderer {
    show_spinner: bool,
}

impl FfmpegTileRenderer {
    #[must_use]
    pub const fn new(show_spinner: bool) -> Self {
        Self { show_spinner }
    }

    #[must_use]
    pub fn build_args(spec: &SheetSpec, source_path: &Path, target: &Path) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-y".to_string(),
            "-i".to_string(),
            source_path.to_string_lossy().to_string(),
            "-vf".to_string(),
            build_tile_filter(spec),
            "-frames:v".to_string(),
            "1".to_string(),
            "-update".to_string(),
            "1".to_string(),
            target.to_string_lossy().to_string(),
        ]
    }

    fn spinner(&self, spec: &SheetSpec) -> ProgressBar {
        if !self.show_spinner {
            return ProgressBar::hidden();
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(format!(
            "渲染 {}x{} 精靈圖 ({} 幀)...",
            spec.columns, spec.rows, spec.total_frames
        ));
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner
    }

    fn run_ffmpeg(&self, spec: &SheetSpec, source_path: &Path, target: &Path) -> Result<()> {
        let fail = |reason: String| SheetError::Render {
            path: spec.output_path.clone(),
            reason,
        };

        let args = Self::build_args(spec, source_path, target);
        debug!("ffmpeg {}", args.join(" "));

        let spinner = self.spinner(spec);
        let output = Command::new("ffmpeg").args(&args).output();
        spinner.finish_and_clear();

        let output = output.map_err(|e| fail(format!("cannot run ffmpeg: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(fail(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                flatten_stderr(&stderr)
            )));
        }

        // 確認輸出檔案存在
        if !target.exists() {
            return Err(fail("ffmpeg produced no image".to_string()));
        }
        Ok(())
    }
}

impl Default for FfmpegTileRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}

fn discard_partial(target: &Path) {
    if target.exists() && fs::remove_file(target).is_err() {
        warn!("無法清理暫存檔: {}", target.display());
    }
}

/// 把渲染完成的暫存檔改名為正式檔名，失敗時刪除暫存檔
pub fn promote_partial(target: &Path, output_path: &Path) -> Result<()> {
    if let Err(e) = fs::rename(target, output_path) {
        discard_partial(target);
        return Err(SheetError::io(output_path, e));
    }
    Ok(())
}

impl SheetRenderer for FfmpegTileRenderer {
    fn render(&self, spec: &SheetSpec, source_path: &Path) -> Result<()> {
        let target = partial_path(&spec.output_path);

        if let Err(e) = self.run_ffmpeg(spec, source_path, &target) {
            discard_partial(&target);
            return Err(e);
        }

        promote_partial(&target, &spec.output_path)?;
        debug!("精靈圖已建立: {}", spec.output_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> SheetSpec {
        SheetSpec {
            columns: 2,
            rows: 3,
            frame_width: 2048,
            frame_height: 1152,
            sheet_width: 4096,
            sheet_height: 3456,
            total_frames: 6,
            sampling_fps: 30.0,
            max_sheet_edge: 4096,
            source_duration_seconds: 0.2,
            output_path: PathBuf::from("/sprites/clip_4096px_30fps_2x3.png"),
        }
    }

    #[test]
    fn test_build_tile_filter() {
        assert_eq!(
            build_tile_filter(&spec()),
            "fps=30,scale=2048:1152:flags=lanczos,format=rgba,tile=2x3"
        );
    }

    #[test]
    fn test_partial_path_keeps_extension() {
        assert_eq!(
            partial_path(Path::new("/sprites/clip.png")),
            PathBuf::from("/sprites/clip.partial.png")
        );
        assert_eq!(
            partial_path(Path::new("/sprites/clip")),
            PathBuf::from("/sprites/clip.partial")
        );
    }

    #[test]
    fn test_build_args_single_frame_output() {
        let target = partial_path(&spec().output_path);
        let args = FfmpegTileRenderer::build_args(&spec(), Path::new("/videos/clip.webm"), &target);

        let vf = args.iter().position(|a| a == "-vf").unwrap();
        assert_eq!(args[vf + 1], build_tile_filter(&spec()));

        let frames = args.iter().position(|a| a == "-frames:v").unwrap();
        assert_eq!(args[frames + 1], "1");

        let input = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[input + 1], "/videos/clip.webm");

        assert_eq!(args.last().unwrap(), "/sprites/clip_4096px_30fps_2x3.partial.png");
    }

    #[test]
    fn test_promote_partial_moves_into_place() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("clip.png");
        let target = partial_path(&output);
        fs::write(&target, b"png").unwrap();

        promote_partial(&target, &output).unwrap();
        assert!(!target.exists());
        assert_eq!(fs::read(&output).unwrap(), b"png");
    }

    #[test]
    fn test_promote_partial_failure_removes_partial() {
        let dir = tempfile::tempdir().unwrap();
        // 正式檔名被非空資料夾佔用，rename 必定失敗
        let output = dir.path().join("clip.png");
        fs::create_dir(&output).unwrap();
        fs::write(output.join("keep.txt"), b"x").unwrap();
        let target = partial_path(&output);
        fs::write(&target, b"png").unwrap();

        let err = promote_partial(&target, &output).unwrap_err();
        assert!(matches!(err, SheetError::Io { .. }));
        assert!(!target.exists());
        assert!(output.join("keep.txt").exists());
    }
}
