use super::sheet_spec::SheetSpec;
use crate::error::{Result, SheetError};
use serde::{Deserialize, Serialize, Serializer};
use std::fs;
use std::path::{Path, PathBuf};

/// 中繼資料中的一筆精靈圖紀錄
///
/// 欄位順序即為輸出的 key 順序。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetRecord {
    pub input: String,
    pub duration: f64,
    /// 整數取樣率寫成 `30` 而非 `30.0`
    #[serde(serialize_with = "serialize_rate")]
    pub fps: f64,
    pub total_frames: u32,
    pub cols: u32,
    pub rows: u32,
    pub frame_width: u32,
    pub frame_height: u32,
    pub sheet_size: [u32; 2],
    pub sheet_path: String,
}

fn serialize_rate<S: Serializer>(fps: &f64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    if fps.is_finite() && fps.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(fps) {
        serializer.serialize_u64(*fps as u64)
    } else {
        serializer.serialize_f64(*fps)
    }
}

impl SheetRecord {
    #[must_use]
    pub fn new(input_path: &Path, spec: &SheetSpec) -> Self {
        Self {
            input: input_path.to_string_lossy().to_string(),
            duration: spec.source_duration_seconds,
            fps: spec.sampling_fps,
            total_frames: spec.total_frames,
            cols: spec.columns,
            rows: spec.rows,
            frame_width: spec.frame_width,
            frame_height: spec.frame_height,
            sheet_size: [spec.sheet_width, spec.sheet_height],
            sheet_path: spec.output_path.to_string_lossy().to_string(),
        }
    }
}

/// 中繼資料檔的路徑：`{out_dir}/{base}_spritesheets.json`
#[must_use]
pub fn metadata_path(output_dir: &Path, base_name: &str) -> PathBuf {
    output_dir.join(format!("{base_name}_spritesheets.json"))
}

/// 寫出中繼資料的介面
pub trait MetadataWriter {
    fn write(&self, input_path: &Path, specs: &[SheetSpec], destination: &Path) -> Result<()>;
}

/// 以縮排 JSON 陣列寫出所有精靈圖紀錄
#[derive(Debug, Clone, Default)]
pub struct JsonMetadataWriter;

impl JsonMetadataWriter {
    pub fn to_json(input_path: &Path, specs: &[SheetSpec]) -> Result<String> {
        let records: Vec<SheetRecord> = specs
            .iter()
            .map(|spec| SheetRecord::new(input_path, spec))
            .collect();
        let mut json = serde_json::to_string_pretty(&records)
            .map_err(|e| SheetError::InvalidInput(format!("cannot serialize metadata: {e}")))?;
        json.push('\n');
        Ok(json)
    }
}

impl MetadataWriter for JsonMetadataWriter {
    fn write(&self, input_path: &Path, specs: &[SheetSpec], destination: &Path) -> Result<()> {
        let json = Self::to_json(input_path, specs)?;

        // 先寫暫存檔再改名，避免留下寫到一半的檔案
        let temp = destination.with_extension("json.tmp");
        fs::write(&temp, json).map_err(|e| SheetError::io(&temp, e))?;
        if let Err(e) = fs::rename(&temp, destination) {
            let _ = fs::remove_file(&temp);
            return Err(SheetError::io(destination, e));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(path: &str) -> SheetSpec {
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
            output_path: PathBuf::from(path),
        }
    }

    #[test]
    fn test_metadata_path() {
        assert_eq!(
            metadata_path(Path::new("media/sprites"), "Formulation"),
            PathBuf::from("media/sprites/Formulation_spritesheets.json")
        );
    }

    #[test]
    fn test_keys_in_fixed_order() {
        let json =
            JsonMetadataWriter::to_json(Path::new("in.webm"), &[spec("out/a.png")]).unwrap();
        let keys = [
            "\"input\"",
            "\"duration\"",
            "\"fps\"",
            "\"total_frames\"",
            "\"cols\"",
            "\"rows\"",
            "\"frame_width\"",
            "\"frame_height\"",
            "\"sheet_size\"",
            "\"sheet_path\"",
        ];
        let positions: Vec<usize> = keys.iter().map(|k| json.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_integral_fps_written_as_integer() {
        let json =
            JsonMetadataWriter::to_json(Path::new("in.webm"), &[spec("out/a.png")]).unwrap();
        assert!(json.contains("\"fps\": 30,"));

        let mut fractional = spec("out/b.png");
        fractional.sampling_fps = 12.5;
        let json = JsonMetadataWriter::to_json(Path::new("in.webm"), &[fractional]).unwrap();
        assert!(json.contains("\"fps\": 12.5,"));

        let records: Vec<SheetRecord> = serde_json::from_str(&json).unwrap();
        assert!((records[0].fps - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("clip_spritesheets.json");
        let specs = [spec("out/a.png"), spec("out/b.png")];

        JsonMetadataWriter
            .write(Path::new("in.webm"), &specs, &destination)
            .unwrap();

        let content = fs::read_to_string(&destination).unwrap();
        let records: Vec<SheetRecord> = serde_json::from_str(&content).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sheet_size, [4096, 3456]);
        assert_eq!(records[1].sheet_path, "out/b.png");
        assert!(!destination.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("missing/clip_spritesheets.json");
        let result = JsonMetadataWriter.write(Path::new("in.webm"), &[spec("a.png")], &destination);
        assert!(matches!(result, Err(SheetError::Io { .. })));
    }
}
