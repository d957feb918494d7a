//! Fixed-point arithmetic and numeric conversion helpers.
//!
//! Every quantity that feeds a course or a score is an `i64` in milli-units
//! (1 unit = 1000). Products are widened to `i128` before division so that
//! intermediate values never wrap.

use num_traits::cast::cast;

/// Fixed-point scale shared by every simulation quantity.
pub const MILLI: i64 = 1000;

/// Scale used for dimensionless ratios such as difficulty or switch progress.
pub const MICRO: i64 = 1_000_000;

/// Convert whole units to milli-units.
#[must_use]
pub const fn milli(units: i64) -> i64 {
    units * MILLI
}

/// Compute `value * num / den` with a widened intermediate, truncating toward zero.
///
/// Returns `0` when `den` is zero or the result does not fit in `i64`.
#[must_use]
pub fn mul_div(value: i64, num: i64, den: i64) -> i64 {
    if den == 0 {
        return 0;
    }
    let wide = i128::from(value) * i128::from(num) / i128::from(den);
    cast::<i128, i64>(wide).unwrap_or(0)
}

/// Squared Euclidean length of `(dx, dy)` compared against `radius²` without `sqrt`.
#[must_use]
pub fn within_radius(dx: i64, dy: i64, radius: i64) -> bool {
    let dx = i128::from(dx);
    let dy = i128::from(dy);
    let r = i128::from(radius);
    dx * dx + dy * dy < r * r
}

/// Quadratic ease-in-out over `progress` in `[0, MICRO]`, returning `[0, MICRO]`.
#[must_use]
pub fn ease_in_out_quad(progress: i64) -> i64 {
    let t = progress.clamp(0, MICRO);
    if t < MICRO / 2 {
        mul_div(2 * t, t, MICRO)
    } else {
        let rest = 2 * MICRO - 2 * t;
        MICRO - mul_div(rest, rest, 2 * MICRO)
    }
}

/// Widen a `usize` into `i64`, saturating at `i64::MAX`.
#[must_use]
pub fn usize_to_i64(value: usize) -> i64 {
    cast::<usize, i64>(value).unwrap_or(i64::MAX)
}

/// Narrow a `usize` into `u32`, saturating at `u32::MAX`.
#[must_use]
pub fn usize_to_u32(value: usize) -> u32 {
    cast::<usize, u32>(value).unwrap_or(u32::MAX)
}

/// Narrow a non-negative `i64` into `u32`, returning `None` when out of range.
#[must_use]
pub fn i64_to_u32(value: i64) -> Option<u32> {
    cast::<i64, u32>(value)
}

/// Convert a `u32` tick or counter to `i64`.
#[must_use]
pub fn u32_to_i64(value: u32) -> i64 {
    i64::from(value)
}
