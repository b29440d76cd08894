// SPDX-License-Identifier: LGPL-3.0-or-later

//! Lag-domain signal comparison.
//!
//! Provides the squared-difference function and its cumulative-mean
//! normalization, the two lag-domain stages of YIN pitch estimation.

/// Compute the squared-difference function of `src`.
///
/// `dst[k] = sum_{i < W} { (src[i] - src[i + k])^2 }` for `k` in `0..W`,
/// where `W = dst.len()`. Terms whose shifted index falls past the end of
/// `src` are skipped, so `src.len() >= 2*W - 1` gives full windows.
pub fn squared_difference(dst: &mut [f64], src: &[f64]) {
    let w = dst.len();
    for (k, out) in dst.iter_mut().enumerate() {
        let len = w.min(src.len().saturating_sub(k));
        let mut acc = 0.0f64;
        for i in 0..len {
            let delta = src[i] - src[i + k];
            acc += delta * delta;
        }
        *out = acc;
    }
}

/// Normalize a squared-difference buffer by its cumulative mean, in place.
///
/// `buf[0] = 1`, `buf[k] = buf[k] * k / sum_{j=1..=k} buf[j]`. A lag whose
/// running sum is still zero is set to 1.
pub fn cumulative_mean_normalize(buf: &mut [f64]) {
    let Some((first, rest)) = buf.split_first_mut() else {
        return;
    };
    *first = 1.0;

    let mut running = 0.0f64;
    for (k, v) in rest.iter_mut().enumerate() {
        running += *v;
        let lag = (k + 1) as f64;
        *v = if running > 0.0 { *v * lag / running } else { 1.0 };
    }
}
