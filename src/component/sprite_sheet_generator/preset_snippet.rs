use super::sheet_spec::{SheetSpec, format_fps};

/// 產生可貼進前端 asset preset 的 sprite 設定片段
///
/// id / size / pos / rot 是佔位值，使用者貼上後再調整。
#[must_use]
pub fn format_preset_snippet(spec: &SheetSpec) -> String {
    let fps = format_fps(spec.sampling_fps);
    format!(
        r"// {fps}fps {sheet_width}x{sheet_height}
{{
  id: 'sprite-id',
  type: 'sprite',
  src: '{src}',
  cols: {cols},
  rows: {rows},
  fps: {fps},
  frameCount: {frame_count},
  loop: true,
  size: [90, 50],
  pos: [0, 0, 0.12],
  rot: [0, 0, 0],
  side: 'double',
  opacity: 1
}}",
        sheet_width = spec.sheet_width,
        sheet_height = spec.sheet_height,
        src = spec.output_path.to_string_lossy(),
        cols = spec.columns,
        rows = spec.rows,
        frame_count = spec.total_frames,
    )
}
