// SPDX-License-Identifier: LGPL-3.0-or-later

//! Scalar math operations on float buffers.

/// Apply a linear fade-out over the whole buffer.
///
/// `dst[j] *= (n - (j + 1)) / n` with `n = dst.len()`, so the gain starts
/// just below 1 and the last sample is multiplied by exactly 0.
pub fn linear_fade_out(dst: &mut [f64]) {
    let n = dst.len() as f64;
    for (j, s) in dst.iter_mut().enumerate() {
        *s *= (n - (j + 1) as f64) / n;
    }
}
