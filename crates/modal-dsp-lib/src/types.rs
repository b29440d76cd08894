// SPDX-License-Identifier: LGPL-3.0-or-later

//! Core data types shared by the filter kernels.
//!
//! These are plain data: no validation happens here. Higher layers are
//! responsible for only ever building coefficients from valid parameters.

// ─── Biquad filter types ───────────────────────────────────────────────────

/// Canonical second-order transfer function coefficients.
///
/// ```text
///          b0 + b1*z^-1 + b2*z^-2
///   H(z) = ----------------------
///          a0 + a1*z^-1 + a2*z^-2
/// ```
///
/// `a0` is kept as the normalization term and is **not** pre-divided into
/// the other five values. The recurrence divides by it once per sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoeffs {
    pub a0: f64,
    pub a1: f64,
    pub a2: f64,
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
}

impl BiquadCoeffs {
    /// Pass-through coefficients (`H(z) = 1`).
    pub const IDENTITY: Self = Self {
        a0: 1.0,
        a1: 0.0,
        a2: 0.0,
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
    };

    /// True when all six coefficients are finite.
    pub fn is_finite(&self) -> bool {
        [self.a0, self.a1, self.a2, self.b0, self.b1, self.b2]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Coefficients divided through by `a0`.
    ///
    /// Returns `(b0, b1, b2, a1, a2)` of the equivalent filter with a
    /// unit leading denominator term.
    pub fn normalized(&self) -> (f64, f64, f64, f64, f64) {
        let inv = 1.0 / self.a0;
        (
            self.b0 * inv,
            self.b1 * inv,
            self.b2 * inv,
            self.a1 * inv,
            self.a2 * inv,
        )
    }
}

impl Default for BiquadCoeffs {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Direct-form I history of a biquad.
///
/// `x0` is the most recent input, `x1`/`x2` the two before it. `y1`/`y2`
/// are the two most recent outputs; the output being computed is never
/// stored.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BiquadHistory {
    pub x0: f64,
    pub x1: f64,
    pub x2: f64,
    pub y1: f64,
    pub y2: f64,
}

impl BiquadHistory {
    /// Zero all taps.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ─── Four-pole crossover types ─────────────────────────────────────────────

/// Coefficients of a fourth-order Linkwitz-Riley low/high split.
///
/// Both outputs share the denominator `1 + b[0]z^-1 + .. + b[3]z^-4`.
/// `lo` and `hi` hold the five numerator taps of each output.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Lr4Coeffs {
    pub b: [f64; 4],
    pub lo: [f64; 5],
    pub hi: [f64; 5],
}

/// History for [`Lr4Coeffs`]: four past inputs and four past outputs per band.
///
/// Index 0 is the most recent sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Lr4History {
    pub x: [f64; 4],
    pub lo: [f64; 4],
    pub hi: [f64; 4],
}

impl Lr4History {
    /// Zero all taps.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
