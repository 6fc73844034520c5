//! 網格佈局最佳化
//!
//! 對每個欄數 `cols`（1..=總幀數）計算列數與縮放比例，
//! 挑出單幀解析度最高、空格最少、最接近正方形的佈局。

use crate::error::{Result, SheetError};
use log::debug;
use std::cmp::Ordering;

/// 候選佈局的評分
///
/// 比較順序：`scale` 大者優先 → `waste` 小者優先 → `|cols - rows|` 小者優先。
/// `Ordering::Greater` 代表較佳。
#[derive(Debug, Clone, Copy)]
pub struct GridScore {
    pub scale: f64,
    pub waste: u32,
    pub imbalance: u32,
}

impl Ord for GridScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.scale
            .total_cmp(&other.scale)
            .then_with(|| other.waste.cmp(&self.waste))
            .then_with(|| other.imbalance.cmp(&self.imbalance))
    }
}

impl PartialOrd for GridScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for GridScore {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GridScore {}

/// 單一欄數的評估結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCandidate {
    pub columns: u32,
    pub rows: u32,
    pub scale: f64,
    /// 輸出單幀寬度（偶數）
    pub frame_width: u32,
    /// 輸出單幀高度（偶數）
    pub frame_height: u32,
    pub waste: u32,
}

impl GridCandidate {
    #[must_use]
    pub const fn score(&self) -> GridScore {
        GridScore {
            scale: self.scale,
            waste: self.waste,
            imbalance: self.columns.abs_diff(self.rows),
        }
    }

    #[must_use]
    pub const fn sheet_width(&self) -> u32 {
        self.frame_width.saturating_mul(self.columns)
    }

    #[must_use]
    pub const fn sheet_height(&self) -> u32 {
        self.frame_height.saturating_mul(self.rows)
    }
}

/// 向下取到偶數（影像編碼器偏好偶數尺寸）
fn floor_to_even(value: f64) -> u32 {
    ((value / 2.0).floor() as u32).saturating_mul(2)
}

/// 評估指定欄數，不符合邊長限制時回傳 `None`
#[must_use]
pub fn evaluate_columns(
    columns: u32,
    total_frames: u32,
    source_width: u32,
    source_height: u32,
    max_edge: u32,
) -> Option<GridCandidate> {
    if columns == 0 {
        return None;
    }
    let rows = total_frames.div_ceil(columns);
    let max = f64::from(max_edge);

    let scale = (max / (f64::from(columns) * f64::from(source_width)))
        .min(max / (f64::from(rows) * f64::from(source_height)));
    if scale.is_nan() || scale <= 0.0 {
        return None;
    }

    let frame_width = floor_to_even(f64::from(source_width) * scale);
    let frame_height = floor_to_even(f64::from(source_height) * scale);
    if frame_width == 0 || frame_height == 0 {
        return None;
    }

    // 捨入後仍不能超出邊長上限
    if u64::from(frame_width) * u64::from(columns) > u64::from(max_edge)
        || u64::from(frame_height) * u64::from(rows) > u64::from(max_edge)
    {
        return None;
    }

    Some(GridCandidate {
        columns,
        rows,
        scale,
        frame_width,
        frame_height,
        // waste < columns，轉回 u32 不會溢位
        waste: (u64::from(columns) * u64::from(rows) - u64::from(total_frames)) as u32,
    })
}

/// 找出最佳網格
///
/// 欄數由小到大列舉，只有分數嚴格更高才取代目前最佳，
/// 所以同分時保留欄數最小的候選。
pub fn find_best_grid(
    total_frames: u32,
    source_width: u32,
    source_height: u32,
    max_edge: u32,
) -> Result<GridCandidate> {
    let not_found = || SheetError::GridNotFound {
        total_frames,
        source_width,
        source_height,
        max_edge,
    };

    if total_frames == 0 || source_width == 0 || source_height == 0 || max_edge == 0 {
        return Err(not_found());
    }

    let mut best: Option<GridCandidate> = None;
    for columns in 1..=total_frames {
        let Some(candidate) =
            evaluate_columns(columns, total_frames, source_width, source_height, max_edge)
        else {
            continue;
        };

        if best.is_none_or(|current| candidate.score() > current.score()) {
            best = Some(candidate);
        }
    }

    let best = best.ok_or_else(not_found)?;
    debug!(
        "最佳網格 {}x{}: scale={:.4}, frame={}x{}, waste={}",
        best.columns, best.rows, best.scale, best.frame_width, best.frame_height, best.waste
    );
    Ok(best)
}
