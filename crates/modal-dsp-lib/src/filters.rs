// SPDX-License-Identifier: LGPL-3.0-or-later

//! Recursive filter processing (static coefficients).
//!
//! The biquad kernel is the direct-form I recurrence on canonical,
//! un-normalized coefficients:
//! ```text
//!   y0 = (b0*x + b1*x1 + b2*x2 - a1*y1 - a2*y2) / a0
//! ```
//! The accumulation order above is fixed so that two filters fed the same
//! input produce bit-identical output.

use crate::types::{BiquadCoeffs, BiquadHistory, Lr4Coeffs, Lr4History};

/// Advance a biquad by one sample and return the new output.
#[inline]
pub fn biquad_step(c: &BiquadCoeffs, h: &mut BiquadHistory, x: f64) -> f64 {
    h.x2 = h.x1;
    h.x1 = h.x0;
    h.x0 = x;

    let mut acc = c.b0 * h.x0;
    acc += c.b1 * h.x1;
    acc += c.b2 * h.x2;
    acc -= c.a1 * h.y1;
    acc -= c.a2 * h.y2;
    let y = acc / c.a0;

    h.y2 = h.y1;
    h.y1 = y;
    y
}

/// Process `src` into `dst` through a single biquad section.
///
/// Processes `min(dst.len(), src.len())` samples in order.
pub fn biquad_process(dst: &mut [f64], src: &[f64], c: &BiquadCoeffs, h: &mut BiquadHistory) {
    for (out, &inp) in dst.iter_mut().zip(src.iter()) {
        *out = biquad_step(c, h, inp);
    }
}

/// Process `buf` in place through a single biquad section.
pub fn biquad_process_inplace(buf: &mut [f64], c: &BiquadCoeffs, h: &mut BiquadHistory) {
    for s in buf.iter_mut() {
        *s = biquad_step(c, h, *s);
    }
}

/// Split `src` into `lo` and `hi` through a fourth-order crossover.
///
/// Both outputs share one input history. Processes the shortest of the
/// three buffers.
pub fn lr4_process(lo: &mut [f64], hi: &mut [f64], src: &[f64], c: &Lr4Coeffs, h: &mut Lr4History) {
    for ((l, r), &x0) in lo.iter_mut().zip(hi.iter_mut()).zip(src.iter()) {
        let x = &h.x;

        let mut yl = c.lo[0] * x0 + c.lo[1] * x[0] + c.lo[2] * x[1] + c.lo[3] * x[2] + c.lo[4] * x[3];
        yl -= c.b[0] * h.lo[0] + c.b[1] * h.lo[1] + c.b[2] * h.lo[2] + c.b[3] * h.lo[3];

        let mut yh = c.hi[0] * x0 + c.hi[1] * x[0] + c.hi[2] * x[1] + c.hi[3] * x[2] + c.hi[4] * x[3];
        yh -= c.b[0] * h.hi[0] + c.b[1] * h.hi[1] + c.b[2] * h.hi[2] + c.b[3] * h.hi[3];

        h.x.rotate_right(1);
        h.x[0] = x0;
        h.lo.rotate_right(1);
        h.lo[0] = yl;
        h.hi.rotate_right(1);
        h.hi[0] = yh;

        *l = yl;
        *r = yh;
    }
}
