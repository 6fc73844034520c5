/// 計算要放進精靈圖的總幀數
///
/// 公式：`ceil(duration * fps)`，最少 1 幀。
/// 長度為 0 或量測誤差造成的極短影片仍會產生單幀的精靈圖。
#[must_use]
pub fn compute_total_frames(duration_seconds: f64, frames_per_second: f64) -> u32 {
    let product = (duration_seconds * frames_per_second).ceil();
    if !product.is_finite() || product < 1.0 {
        return 1;
    }
    if product >= f64::from(u32::MAX) {
        return u32::MAX;
    }
    product as u32
}
