// SPDX-License-Identifier: LGPL-3.0-or-later

//! Block level statistics.
//!
//! Each function reduces a whole buffer to one value. The sign-dependent
//! means ([`mean`], [`geometric_mean`], [`harmonic_mean`], [`midpoint`])
//! describe the signal itself; the sign-independent ones ([`peak`],
//! [`abs_average`], [`rms`], [`abs_midpoint`]) describe its magnitude and
//! are the ones a level detector can use, selected through [`LevelKind`].
//!
//! Every function returns 0 for an empty buffer.
//!
//! # Examples
//!
//! ```
//! use modal_dsp_units::meters::level::{LevelKind, summary_level};
//!
//! let block = [0.5, -1.0, 0.25, 0.0];
//! assert_eq!(summary_level(&block, LevelKind::Peak), 1.0);
//! assert_eq!(summary_level(&block, LevelKind::AbsoluteMidpoint), 0.5);
//! ```

use modal_dsp_lib::math::horizontal::{
    abs_max, abs_min_max, abs_sum, min_max, product, recip_sum, sqr_sum, sum,
};

/// Detector used to summarize a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LevelKind {
    /// Largest absolute sample.
    #[default]
    Peak,
    /// Mean of absolute samples.
    AbsoluteAverage,
    /// Root mean square.
    Rms,
    /// Halfway between the smallest and largest absolute sample.
    AbsoluteMidpoint,
}

/// Summarize `buf` with the detector `kind`.
pub fn summary_level(buf: &[f64], kind: LevelKind) -> f64 {
    match kind {
        LevelKind::Peak => peak(buf),
        LevelKind::AbsoluteAverage => abs_average(buf),
        LevelKind::Rms => rms(buf),
        LevelKind::AbsoluteMidpoint => abs_midpoint(buf),
    }
}

/// Arithmetic mean.
pub fn mean(buf: &[f64]) -> f64 {
    if buf.is_empty() {
        return 0.0;
    }
    sum(buf) / buf.len() as f64
}

/// Geometric mean, `(x0 * x1 * ... )^(1/n)`.
///
/// Only meaningful for positive samples; a negative product yields NaN.
pub fn geometric_mean(buf: &[f64]) -> f64 {
    if buf.is_empty() {
        return 0.0;
    }
    product(buf).powf(1.0 / buf.len() as f64)
}

/// Harmonic mean, `n / sum(1/x)`.
pub fn harmonic_mean(buf: &[f64]) -> f64 {
    if buf.is_empty() {
        return 0.0;
    }
    buf.len() as f64 / recip_sum(buf)
}

/// Halfway between the minimum and the maximum.
pub fn midpoint(buf: &[f64]) -> f64 {
    if buf.is_empty() {
        return 0.0;
    }
    let (lo, hi) = min_max(buf);
    (lo + hi) / 2.0
}

/// Largest absolute value.
pub fn peak(buf: &[f64]) -> f64 {
    abs_max(buf)
}

/// Mean of the absolute values.
pub fn abs_average(buf: &[f64]) -> f64 {
    if buf.is_empty() {
        return 0.0;
    }
    abs_sum(buf) / buf.len() as f64
}

/// Root mean square.
pub fn rms(buf: &[f64]) -> f64 {
    if buf.is_empty() {
        return 0.0;
    }
    (sqr_sum(buf) / buf.len() as f64).sqrt()
}

/// Halfway between the smallest and the largest absolute value.
pub fn abs_midpoint(buf: &[f64]) -> f64 {
    if buf.is_empty() {
        return 0.0;
    }
    let (lo, hi) = abs_min_max(buf);
    (lo + hi) / 2.0
}
