// SPDX-License-Identifier: LGPL-3.0-or-later

//! Signal mixing operations.

use multiversion::multiversion;

/// Add-mix a weighted source into `dst`: `dst[i] += src[i] * k`.
#[multiversion(targets("x86_64+avx2+fma", "x86_64+avx", "x86_64+sse4.1", "aarch64+neon",))]
pub fn mix_add(dst: &mut [f64], src: &[f64], k: f64) {
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d += *s * k;
    }
}
