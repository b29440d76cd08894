// SPDX-License-Identifier: LGPL-3.0-or-later

//! Horizontal (reduction) operations on float buffers.
//!
//! These are the building blocks of the buffer statistics used by level
//! detectors. All reductions iterate in index order.

use multiversion::multiversion;

/// Sum of all elements.
#[multiversion(targets("x86_64+avx2+fma", "x86_64+avx", "x86_64+sse4.1", "aarch64+neon",))]
pub fn sum(src: &[f64]) -> f64 {
    src.iter().sum()
}

/// Sum of absolute values.
#[multiversion(targets("x86_64+avx2+fma", "x86_64+avx", "x86_64+sse4.1", "aarch64+neon",))]
pub fn abs_sum(src: &[f64]) -> f64 {
    src.iter().map(|x| x.abs()).sum()
}

/// Sum of squares.
#[multiversion(targets("x86_64+avx2+fma", "x86_64+avx", "x86_64+sse4.1", "aarch64+neon",))]
pub fn sqr_sum(src: &[f64]) -> f64 {
    src.iter().map(|x| x * x).sum()
}

/// Sum of reciprocals.
#[multiversion(targets("x86_64+avx2+fma", "x86_64+avx", "x86_64+sse4.1", "aarch64+neon",))]
pub fn recip_sum(src: &[f64]) -> f64 {
    src.iter().map(|x| 1.0 / x).sum()
}

/// Product of all elements (1.0 for an empty buffer).
pub fn product(src: &[f64]) -> f64 {
    src.iter().product()
}

/// Find both minimum and maximum.
///
/// Returns `(+inf, -inf)` for an empty buffer.
#[multiversion(targets("x86_64+avx2+fma", "x86_64+avx", "x86_64+sse4.1", "aarch64+neon",))]
pub fn min_max(src: &[f64]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &x in src {
        lo = lo.min(x);
        hi = hi.max(x);
    }
    (lo, hi)
}

/// Find both minimum and maximum of the absolute values.
///
/// Returns `(+inf, 0)` for an empty buffer.
#[multiversion(targets("x86_64+avx2+fma", "x86_64+avx", "x86_64+sse4.1", "aarch64+neon",))]
pub fn abs_min_max(src: &[f64]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = 0.0f64;
    for &x in src {
        let a = x.abs();
        lo = lo.min(a);
        hi = hi.max(a);
    }
    (lo, hi)
}

/// Find the maximum absolute value (peak amplitude).
#[multiversion(targets("x86_64+avx2+fma", "x86_64+avx", "x86_64+sse4.1", "aarch64+neon",))]
pub fn abs_max(src: &[f64]) -> f64 {
    src.iter().map(|x| x.abs()).fold(0.0f64, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_sum() {
        assert_approx_eq!(f64, sum(&[1.0, 2.0, 3.0, 4.0]), 10.0, ulps = 2);
    }

    #[test]
    fn test_abs_and_sqr_sum() {
        let buf = [1.0, -2.0, 3.0];
        assert_approx_eq!(f64, abs_sum(&buf), 6.0, ulps = 2);
        assert_approx_eq!(f64, sqr_sum(&buf), 14.0, ulps = 2);
    }

    #[test]
    fn test_recip_sum_and_product() {
        let buf = [1.0, 2.0, 4.0];
        assert_approx_eq!(f64, recip_sum(&buf), 1.75, ulps = 2);
        assert_approx_eq!(f64, product(&buf), 8.0, ulps = 2);
        assert_eq!(product(&[]), 1.0);
    }

    #[test]
    fn test_min_max() {
        let (lo, hi) = min_max(&[3.0, -1.0, 7.0, 2.0]);
        assert_approx_eq!(f64, lo, -1.0, ulps = 2);
        assert_approx_eq!(f64, hi, 7.0, ulps = 2);
    }

    #[test]
    fn test_abs_min_max() {
        let (lo, hi) = abs_min_max(&[3.0, -0.5, -7.0, 2.0]);
        assert_approx_eq!(f64, lo, 0.5, ulps = 2);
        assert_approx_eq!(f64, hi, 7.0, ulps = 2);
    }

    #[test]
    fn test_abs_max() {
        assert_approx_eq!(f64, abs_max(&[1.0, -5.0, 3.0, -2.0]), 5.0, ulps = 2);
        assert_eq!(abs_max(&[]), 0.0);
    }
}
