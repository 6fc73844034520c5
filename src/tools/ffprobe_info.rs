use crate::error::{Result, SheetError};
use log::debug;
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

/// 來源影片的尺寸與長度
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceFrameInfo {
    pub width: u32,
    pub height: u32,
    pub duration_seconds: f64,
}

/// 取得來源影片資訊的介面，測試時可以替換成假的實作
pub trait FrameProbe {
    fn probe(&self, path: &Path) -> Result<SourceFrameInfo>;
}

/// 使用 ffprobe 取得影片資訊
#[derive(Debug, Clone, Default)]
pub struct FfprobeProbe;

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<FormatInfo>,
    streams: Option<Vec<StreamInfo>>,
}

#[derive(Deserialize)]
struct FormatInfo {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct StreamInfo {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}

impl FrameProbe for FfprobeProbe {
    fn probe(&self, path: &Path) -> Result<SourceFrameInfo> {
        let fail = |reason: String| SheetError::Probe {
            path: path.to_path_buf(),
            reason,
        };

        let output = Command::new("ffprobe")
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
                "-select_streams",
                "v:0",
            ])
            .arg(path)
            .output()
            .map_err(|e| fail(format!("cannot run ffprobe: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(fail(format!(
                "ffprobe exited with {}: {}",
                output.status,
                flatten_stderr(&stderr)
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!("ffprobe 輸出 {} bytes: {}", stdout.len(), path.display());
        parse_probe_output(&stdout).map_err(fail)
    }
}

/// 把外部工具的 stderr 壓成單行，空行略過，各行以 ` | ` 連接
#[must_use]
pub fn flatten_stderr(stderr: &str) -> String {
    stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}

/// 解析 ffprobe 的 JSON 輸出
fn parse_probe_output(json: &str) -> std::result::Result<SourceFrameInfo, String> {
    let probe: FfprobeOutput =
        serde_json::from_str(json).map_err(|e| format!("unparseable ffprobe output: {e}"))?;

    // 找到視訊串流
    let video_stream = probe
        .streams
        .as_ref()
        .and_then(|streams| {
            streams
                .iter()
                .find(|s| s.codec_type.as_deref().is_none_or(|t| t == "video"))
        })
        .ok_or_else(|| "no video stream".to_string())?;

    let width = video_stream
        .width
        .filter(|w| *w > 0)
        .ok_or_else(|| "missing or zero width".to_string())?;
    let height = video_stream
        .height
        .filter(|h| *h > 0)
        .ok_or_else(|| "missing or zero height".to_string())?;

    // 取得影片長度（優先從 format，其次從 stream）
    let duration_seconds = probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .or(video_stream.duration.as_deref())
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| "missing or invalid duration".to_string())?;

    Ok(SourceFrameInfo {
        width,
        height,
        duration_seconds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_probe_output_format_duration() {
        let json = r#"{
            "streams": [{ "codec_type": "video", "width": 1920, "height": 1080, "duration": "9.0" }],
            "format": { "duration": "10.500000" }
        }"#;
        let info = parse_probe_output(json).unwrap();
        assert_eq!(info.width, 1920);
        assert_eq!(info.height, 1080);
        assert!((info.duration_seconds - 10.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_probe_output_stream_duration_fallback() {
        let json = r#"{
            "streams": [{ "codec_type": "video", "width": 640, "height": 360, "duration": "4.25" }],
            "format": {}
        }"#;
        let info = parse_probe_output(json).unwrap();
        assert!((info.duration_seconds - 4.25).abs() < 1e-9);
    }

    #[test]
    fn test_parse_probe_output_skips_audio_stream() {
        let json = r#"{
            "streams": [
                { "codec_type": "audio" },
                { "codec_type": "video", "width": 320, "height": 240 }
            ],
            "format": { "duration": "1.0" }
        }"#;
        let info = parse_probe_output(json).unwrap();
        assert_eq!((info.width, info.height), (320, 240));
    }

    #[test]
    fn test_flatten_stderr_is_single_line() {
        let stderr = "[mov,mp4] moov atom not found\r\n\ngarbage.mp4: Invalid data found when processing input\n";
        let flat = flatten_stderr(stderr);
        assert_eq!(
            flat,
            "[mov,mp4] moov atom not found | garbage.mp4: Invalid data found when processing input"
        );
        assert!(!flat.contains('\n') && !flat.contains('\r'));
        assert_eq!(flatten_stderr("  \n"), "");
    }

    #[test]
    fn test_parse_probe_output_invalid() {
        assert!(parse_probe_output("not json").is_err());
        assert!(parse_probe_output(r#"{ "streams": [], "format": {} }"#).is_err());
        assert!(
            parse_probe_output(
                r#"{ "streams": [{ "codec_type": "video", "width": 0, "height": 10 }], "format": { "duration": "1" } }"#
            )
            .is_err()
        );
        assert!(
            parse_probe_output(
                r#"{ "streams": [{ "codec_type": "video", "width": 10, "height": 10 }], "format": { "duration": "N/A" } }"#
            )
            .is_err()
        );
    }
}
