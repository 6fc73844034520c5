use super::frame_count::compute_total_frames;
use super::grid_optimizer::find_best_grid;
use super::metadata_writer::{JsonMetadataWriter, MetadataWriter, metadata_path};
use super::preset_snippet::format_preset_snippet;
use super::sheet_renderer::{FfmpegTileRenderer, SheetRenderer};
use super::sheet_spec::{SheetSpec, SheetSpecBuilder, format_fps};
use crate::config::{FrameSamplingParams, Settings};
use crate::error::{Result, SheetError};
use crate::tools::{
    FfprobeProbe, FrameProbe, SourceFrameInfo, ensure_directory_exists, validate_file_exists,
};
use console::style;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 單次執行的輸入：來源影片、輸出資料夾、輸出檔名前綴
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRequest {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub base_name: String,
}

impl SheetRequest {
    /// 依命令列參數與設定決定實際的請求
    ///
    /// 未指定輸入時使用 `settings.default_input`，兩者都沒有則失敗。
    /// 未指定前綴時使用輸入檔名（不含副檔名）。
    pub fn resolve(
        input: Option<PathBuf>,
        output_dir: Option<PathBuf>,
        base_name: Option<String>,
        settings: &Settings,
    ) -> Result<Self> {
        let input_path = input
            .or_else(|| settings.default_input.clone())
            .ok_or_else(|| {
                SheetError::InvalidInput(
                    "no input provided and no default_input configured".to_string(),
                )
            })?;

        let output_dir = output_dir.unwrap_or_else(|| settings.output_dir.clone());

        let base_name = match base_name.filter(|b| !b.trim().is_empty()) {
            Some(base) => base,
            None => input_path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    SheetError::InvalidInput(format!(
                        "cannot derive base name from {}",
                        input_path.display()
                    ))
                })?,
        };

        Ok(Self {
            input_path,
            output_dir,
            base_name,
        })
    }
}

/// 精靈圖生成結果
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub source: SourceFrameInfo,
    pub sheets: Vec<SheetSpec>,
    pub metadata_path: PathBuf,
}

/// 單一取樣設定的佈局規劃（純計算）
pub fn plan_sheet(
    request: &SheetRequest,
    source: &SourceFrameInfo,
    sampling: FrameSamplingParams,
    output_template: &str,
) -> Result<SheetSpec> {
    let total_frames = compute_total_frames(source.duration_seconds, sampling.frames_per_second);
    let grid = find_best_grid(
        total_frames,
        source.width,
        source.height,
        sampling.max_sheet_edge,
    )?;

    SheetSpecBuilder::new(&request.output_dir, output_template)
        .base_name(&request.base_name)
        .source(*source)
        .total_frames(total_frames)
        .sampling(sampling)
        .grid(grid)
        .build()
}

/// 精靈圖生成器
///
/// 流程：
/// A. 取得影片資訊（ffprobe）
/// B. 每個取樣設定計算總幀數與最佳網格
/// C. 逐一渲染精靈圖（ffmpeg tile）
/// D. 寫出中繼資料 JSON
///
/// 任何階段失敗都會刪除本次已產生的圖檔，不留下部分結果。
pub struct SpriteSheetGenerator<P = FfprobeProbe, R = FfmpegTileRenderer, M = JsonMetadataWriter> {
    settings: Settings,
    probe: P,
    renderer: R,
    metadata_writer: M,
    shutdown_signal: Arc<AtomicBool>,
}

impl SpriteSheetGenerator {
    #[must_use]
    pub fn new(settings: Settings, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self::with_collaborators(
            settings,
            FfprobeProbe,
            FfmpegTileRenderer::default(),
            JsonMetadataWriter,
            shutdown_signal,
        )
    }
}

impl<P, R, M> SpriteSheetGenerator<P, R, M>
where
    P: FrameProbe,
    R: SheetRenderer,
    M: MetadataWriter,
{
    pub fn with_collaborators(
        settings: Settings,
        probe: P,
        renderer: R,
        metadata_writer: M,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Self {
        Self {
            settings,
            probe,
            renderer,
            metadata_writer,
            shutdown_signal,
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// 為所有取樣設定規劃精靈圖，結果依設定順序排列
    pub fn plan(&self, request: &SheetRequest, source: &SourceFrameInfo) -> Result<Vec<SheetSpec>> {
        // 只借用設定欄位，閉包不捕捉 `self`，collaborator 不需要 `Sync`
        let template = self.settings.output_template.as_str();
        let specs: Vec<SheetSpec> = self
            .settings
            .presets
            .par_iter()
            .map(|preset| plan_sheet(request, source, *preset, template))
            .collect::<Result<_>>()?;

        // 兩個設定產生相同檔名時，後者會覆蓋前者
        let mut seen = HashSet::new();
        for spec in &specs {
            if !seen.insert(&spec.output_path) {
                return Err(SheetError::InvalidInput(format!(
                    "two presets resolve to the same output: {}",
                    spec.output_path.display()
                )));
            }
        }

        Ok(specs)
    }

    pub fn run(&self, request: &SheetRequest) -> Result<GenerationResult> {
        validate_file_exists(&request.input_path)?;
        ensure_directory_exists(&request.output_dir)?;

        // Stage A: 取得影片資訊
        let source = self.probe.probe(&request.input_path)?;
        info!(
            "影片資訊: {}x{}, {:.3}s ({})",
            source.width,
            source.height,
            source.duration_seconds,
            request.input_path.display()
        );

        // Stage B: 規劃佈局
        let specs = self.plan(request, &source)?;
        for spec in &specs {
            debug!(
                "規劃 {}fps/{}px: {} 幀 → {}x{} 網格, 單幀 {}x{}",
                format_fps(spec.sampling_fps),
                spec.max_sheet_edge,
                spec.total_frames,
                spec.columns,
                spec.rows,
                spec.frame_width,
                spec.frame_height
            );
        }

        // Stage C: 渲染
        let mut rendered: Vec<PathBuf> = Vec::with_capacity(specs.len());
        for spec in &specs {
            if self.shutdown_signal.load(Ordering::SeqCst) {
                info!("收到中斷訊號，停止處理");
                remove_outputs(&rendered);
                return Err(SheetError::Cancelled);
            }

            if let Err(e) = self.renderer.render(spec, &request.input_path) {
                remove_outputs(&rendered);
                return Err(e);
            }
            info!("精靈圖已建立: {}", spec.output_path.display());
            rendered.push(spec.output_path.clone());
        }

        // Stage D: 中繼資料
        let meta_path = metadata_path(&request.output_dir, &request.base_name);
        if let Err(e) = self
            .metadata_writer
            .write(&request.input_path, &specs, &meta_path)
        {
            remove_outputs(&rendered);
            return Err(e);
        }
        info!("中繼資料已寫入: {}", meta_path.display());

        Ok(GenerationResult {
            source,
            sheets: specs,
            metadata_path: meta_path,
        })
    }
}

/// 刪除本次已產生的圖檔
fn remove_outputs(paths: &[PathBuf]) {
    for path in paths {
        if path.exists() && fs::remove_file(path).is_err() {
            warn!("無法清理輸出檔: {}", path.display());
        }
    }
}

/// 輸出生成摘要與 preset 片段
pub fn print_summary(result: &GenerationResult, show_snippets: bool) {
    println!("{}", style("Generated:").green().bold());
    for sheet in &result.sheets {
        println!(
            "- {} ({}x{}, frame {}x{})",
            sheet.output_path.display(),
            sheet.columns,
            sheet.rows,
            sheet.frame_width,
            sheet.frame_height
        );
    }
    println!("Metadata: {}", result.metadata_path.display());

    if show_snippets {
        println!();
        println!(
            "{}",
            style("AssetPresets snippets (copy/paste and adjust size/pos/rot/id):").dim()
        );
        for sheet in &result.sheets {
            println!();
            println!("{}", format_preset_snippet(sheet));
        }
    }
}
