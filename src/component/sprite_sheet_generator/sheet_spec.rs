use super::grid_optimizer::GridCandidate;
use crate::config::FrameSamplingParams;
use crate::error::{Result, SheetError};
use crate::tools::SourceFrameInfo;
use std::path::{Path, PathBuf};

/// 一張精靈圖的完整描述，建立後不再修改
#[derive(Debug, Clone, PartialEq)]
pub struct SheetSpec {
    pub columns: u32,
    pub rows: u32,
    pub frame_width: u32,
    pub frame_height: u32,
    pub sheet_width: u32,
    pub sheet_height: u32,
    pub total_frames: u32,
    pub sampling_fps: f64,
    pub max_sheet_edge: u32,
    pub source_duration_seconds: f64,
    pub output_path: PathBuf,
}

/// fps 以最短形式輸出（30.0 → "30"，29.97 → "29.97"）
#[must_use]
pub fn format_fps(fps: f64) -> String {
    format!("{fps}")
}

/// 將樣板中的 `{base}` `{max_edge}` `{fps}` `{cols}` `{rows}` 換成實際值
#[must_use]
pub fn resolve_output_name(
    template: &str,
    base_name: &str,
    sampling: &FrameSamplingParams,
    grid: &GridCandidate,
) -> String {
    template
        .replace("{base}", base_name)
        .replace("{max_edge}", &sampling.max_sheet_edge.to_string())
        .replace("{fps}", &format_fps(sampling.frames_per_second))
        .replace("{cols}", &grid.columns.to_string())
        .replace("{rows}", &grid.rows.to_string())
}

/// 組合 `SheetSpec`
///
/// 只做組裝，不重新計算佈局；缺少任何必要欄位時 `build` 失敗。
#[derive(Debug, Clone)]
pub struct SheetSpecBuilder {
    output_dir: PathBuf,
    output_template: String,
    base_name: Option<String>,
    source: Option<SourceFrameInfo>,
    total_frames: Option<u32>,
    sampling: Option<FrameSamplingParams>,
    grid: Option<GridCandidate>,
}

impl SheetSpecBuilder {
    #[must_use]
    pub fn new(output_dir: &Path, output_template: &str) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            output_template: output_template.to_string(),
            base_name: None,
            source: None,
            total_frames: None,
            sampling: None,
            grid: None,
        }
    }

    #[must_use]
    pub fn base_name(mut self, base_name: &str) -> Self {
        self.base_name = Some(base_name.to_string());
        self
    }

    #[must_use]
    pub fn source(mut self, source: SourceFrameInfo) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn total_frames(mut self, total_frames: u32) -> Self {
        self.total_frames = Some(total_frames);
        self
    }

    #[must_use]
    pub fn sampling(mut self, sampling: FrameSamplingParams) -> Self {
        self.sampling = Some(sampling);
        self
    }

    #[must_use]
    pub fn grid(mut self, grid: GridCandidate) -> Self {
        self.grid = Some(grid);
        self
    }

    pub fn build(self) -> Result<SheetSpec> {
        let base_name = self
            .base_name
            .filter(|b| !b.is_empty())
            .ok_or(SheetError::MissingField("base_name"))?;
        let source = self.source.ok_or(SheetError::MissingField("source"))?;
        let total_frames = self
            .total_frames
            .ok_or(SheetError::MissingField("total_frames"))?;
        let sampling = self.sampling.ok_or(SheetError::MissingField("sampling"))?;
        let grid = self.grid.ok_or(SheetError::MissingField("grid"))?;

        if u64::from(grid.columns) * u64::from(grid.rows) < u64::from(total_frames) {
            return Err(SheetError::InvalidInput(format!(
                "grid {}x{} cannot hold {total_frames} frames",
                grid.columns, grid.rows
            )));
        }

        let file_name = resolve_output_name(&self.output_template, &base_name, &sampling, &grid);

        Ok(SheetSpec {
            columns: grid.columns,
            rows: grid.rows,
            frame_width: grid.frame_width,
            frame_height: grid.frame_height,
            sheet_width: grid.sheet_width(),
            sheet_height: grid.sheet_height(),
            total_frames,
            sampling_fps: sampling.frames_per_second,
            max_sheet_edge: sampling.max_sheet_edge,
            source_duration_seconds: source.duration_seconds,
            output_path: self.output_dir.join(file_name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::sprite_sheet_generator::grid_optimizer::find_best_grid;

    const TEMPLATE: &str = "{base}_{max_edge}px_{fps}fps_{cols}x{rows}.png";

    fn source() -> SourceFrameInfo {
        SourceFrameInfo {
            width: 16,
            height: 9,
            duration_seconds: 0.2,
        }
    }

    #[test]
    fn test_build_complete_spec() {
        let grid = find_best_grid(6, 16, 9, 4096).unwrap();
        let spec = SheetSpecBuilder::new(Path::new("media/sprites"), TEMPLATE)
            .base_name("Formulation")
            .source(source())
            .total_frames(6)
            .sampling(FrameSamplingParams::new(30.0, 4096))
            .grid(grid)
            .build()
            .unwrap();

        assert_eq!((spec.columns, spec.rows), (2, 3));
        assert_eq!((spec.sheet_width, spec.sheet_height), (4096, 3456));
        assert_eq!(spec.total_frames, 6);
        assert!((spec.source_duration_seconds - 0.2).abs() < 1e-9);
        assert_eq!(
            spec.output_path,
            PathBuf::from("media/sprites/Formulation_4096px_30fps_2x3.png")
        );
    }

    #[test]
    fn test_missing_grid_fails() {
        let err = SheetSpecBuilder::new(Path::new("out"), TEMPLATE)
            .base_name("clip")
            .source(source())
            .total_frames(6)
            .sampling(FrameSamplingParams::new(30.0, 4096))
            .build()
            .unwrap_err();
        assert!(matches!(err, SheetError::MissingField("grid")));
    }

    #[test]
    fn test_missing_base_name_fails() {
        let grid = find_best_grid(6, 16, 9, 4096).unwrap();
        let err = SheetSpecBuilder::new(Path::new("out"), TEMPLATE)
            .base_name("")
            .source(source())
            .total_frames(6)
            .sampling(FrameSamplingParams::new(30.0, 4096))
            .grid(grid)
            .build()
            .unwrap_err();
        assert!(matches!(err, SheetError::MissingField("base_name")));
    }

    #[test]
    fn test_grid_too_small_for_frames() {
        let grid = find_best_grid(6, 16, 9, 4096).unwrap();
        let result = SheetSpecBuilder::new(Path::new("out"), TEMPLATE)
            .base_name("clip")
            .source(source())
            .total_frames(7)
            .sampling(FrameSamplingParams::new(30.0, 4096))
            .grid(grid)
            .build();
        assert!(matches!(result, Err(SheetError::InvalidInput(_))));
    }

    #[test]
    fn test_resolve_output_name_fractional_fps() {
        let grid = find_best_grid(6, 16, 9, 2048).unwrap();
        let name = resolve_output_name(
            "{base}-{fps}-{cols}-{rows}-{max_edge}",
            "intro",
            &FrameSamplingParams::new(29.97, 2048),
            &grid,
        );
        assert_eq!(name, format!("intro-29.97-{}-{}-2048", grid.columns, grid.rows));
    }

    #[test]
    fn test_format_fps() {
        assert_eq!(format_fps(30.0), "30");
        assert_eq!(format_fps(60.0), "60");
        assert_eq!(format_fps(12.5), "12.5");
    }
}
