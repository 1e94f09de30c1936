//! 浮点比较工具
//!
//! 数值类型就是 `f64`，比较时使用绝对/相对误差。

/// 默认误差
pub const EPSILON: f64 = 1e-7;

/// 在 `epsilon` 的绝对误差或相对误差范围内相等
///
/// `epsilon == 0` 时使用 [`EPSILON`]。两个 NaN 视为相等。
#[inline]
pub fn approx_eq_eps(a: f64, b: f64, epsilon: f64) -> bool {
    let epsilon = if epsilon == 0.0 { EPSILON } else { epsilon };
    if a == b || (a.is_nan() && b.is_nan()) {
        return true;
    }
    let delta = (a - b).abs();
    if delta <= epsilon {
        return true;
    }
    delta / a.abs().max(b.abs()) <= epsilon
}

/// 使用默认误差比较
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    approx_eq_eps(a, b, EPSILON)
}

/// 逐元素比较两个切片
pub fn slice_approx_eq(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| approx_eq(*x, *y))
}
