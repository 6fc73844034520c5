//! 影片精靈圖生成元件
//!
//! 四階段流程：
//! A. 取得影片資訊（ffprobe）
//! B. 計算總幀數並選出最佳網格
//! C. 渲染拼貼圖（ffmpeg tile）
//! D. 寫出中繼資料

mod frame_count;
mod grid_optimizer;
mod main;
mod metadata_writer;
mod preset_snippet;
mod sheet_renderer;
mod sheet_spec;

pub use frame_count::compute_total_frames;
pub use grid_optimizer::{GridCandidate, GridScore, evaluate_columns, find_best_grid};
pub use main::{GenerationResult, SheetRequest, SpriteSheetGenerator, plan_sheet, print_summary};
pub use metadata_writer::{JsonMetadataWriter, MetadataWriter, SheetRecord, metadata_path};
pub use preset_snippet::format_preset_snippet;
pub use sheet_renderer::{
    FfmpegTileRenderer, SheetRenderer, build_tile_filter, partial_path, promote_partial,
};
pub use sheet_spec::{SheetSpec, SheetSpecBuilder, format_fps, resolve_output_name};
