//! Float ordering.
//!
//! Geometry is computed in `f64` and narrowed to `f32` only for render
//! commands. Comparisons that pick a winner (nearest hit, sort keys) go
//! through [`stable_total_cmp_f64`] so the result never depends on the sign
//! of zero or on which NaN payload showed up.

use core::cmp::Ordering;

/// `-0.0` → `0.0`; every NaN → the canonical NaN.
pub fn canonical_f64(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

pub fn stable_total_cmp_f64(a: f64, b: f64) -> Ordering {
    canonical_f64(a).total_cmp(&canonical_f64(b))
}
