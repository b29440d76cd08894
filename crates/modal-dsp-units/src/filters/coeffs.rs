// SPDX-License-Identifier: LGPL-3.0-or-later

//! Biquad coefficient derivation using the RBJ Audio EQ Cookbook.
//!
//! Coefficients are returned in canonical form: `a0` is the denominator
//! normalization term and is **not** divided into the other five values,
//! and `a1`/`a2` carry the cookbook signs (the recurrence subtracts them).
//!
//! Derivation runs in a fixed order:
//!
//! 1. `omega0 = 2π·fc/fs`
//! 2. `cos(omega0)`, `sin(omega0)`
//! 3. `alpha` from the [`BandwidthSpec`]
//! 4. `alpha' = 2·sqrt(A)·alpha` for shelving responses
//! 5. the six coefficients, keyed on [`FilterResponse`]
//!
//! All six values are produced together by one call; there is no way to
//! update part of a coefficient set.

use std::f64::consts::{LN_2, PI};

use modal_dsp_lib::types::BiquadCoeffs;

use crate::error::{DspError, Result, ensure_below_nyquist, ensure_positive};
use crate::units::shelf_amplitude;

/// Biquad response topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterResponse {
    /// Band-pass with constant 0 dB peak gain.
    BandPass,
    /// Second-order low-pass.
    LowPass,
    /// Second-order high-pass.
    HighPass,
    /// Band-reject.
    Notch,
    /// All-pass (phase shift only).
    AllPass,
    /// Low-shelf: `gain_db` below the corner, unity above.
    LowShelf,
    /// High-shelf: unity below the corner, `gain_db` above.
    HighShelf,
}

impl FilterResponse {
    /// Every response, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::BandPass,
        Self::LowPass,
        Self::HighPass,
        Self::Notch,
        Self::AllPass,
        Self::LowShelf,
        Self::HighShelf,
    ];

    /// True for the two shelving responses.
    pub fn is_shelf(self) -> bool {
        matches!(self, Self::LowShelf | Self::HighShelf)
    }

    /// Whether `kind` may be used to specify this response's bandwidth.
    ///
    /// `QFactor` is accepted everywhere. `HalfPowerBandwidthOctaves` is
    /// limited to band-pass and notch, `ShelfSlope` to the shelves.
    pub fn accepts(self, kind: BandwidthKind) -> bool {
        match kind {
            BandwidthKind::QFactor => true,
            BandwidthKind::HalfPowerBandwidthOctaves => {
                matches!(self, Self::BandPass | Self::Notch)
            }
            BandwidthKind::ShelfSlope => self.is_shelf(),
        }
    }
}

/// Bandwidth convention together with its value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BandwidthSpec {
    /// Quality factor `Q`.
    QFactor(f64),
    /// Distance in octaves between the half-power points.
    HalfPowerBandwidthOctaves(f64),
    /// Shelf slope `S`; `1` is the steepest slope that stays monotonic.
    ShelfSlope(f64),
}

/// Discriminant of [`BandwidthSpec`], used in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BandwidthKind {
    QFactor,
    HalfPowerBandwidthOctaves,
    ShelfSlope,
}

impl BandwidthSpec {
    pub fn kind(&self) -> BandwidthKind {
        match self {
            Self::QFactor(_) => BandwidthKind::QFactor,
            Self::HalfPowerBandwidthOctaves(_) => BandwidthKind::HalfPowerBandwidthOctaves,
            Self::ShelfSlope(_) => BandwidthKind::ShelfSlope,
        }
    }

    pub fn value(&self) -> f64 {
        match *self {
            Self::QFactor(v) | Self::HalfPowerBandwidthOctaves(v) | Self::ShelfSlope(v) => v,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::QFactor(_) => "Q",
            Self::HalfPowerBandwidthOctaves(_) => "bandwidth",
            Self::ShelfSlope(_) => "shelf slope",
        }
    }
}

impl Default for BandwidthSpec {
    fn default() -> Self {
        Self::QFactor(std::f64::consts::FRAC_1_SQRT_2)
    }
}

/// Inputs of the coefficient model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterParameters {
    /// Sample rate in Hz.
    pub sample_rate_hz: f64,
    /// Center or corner frequency in Hz, strictly below Nyquist.
    pub center_freq_hz: f64,
    pub bandwidth: BandwidthSpec,
    /// Shelf gain in dB. Ignored by non-shelving responses.
    pub gain_db: f64,
}

impl Default for FilterParameters {
    /// 48 kHz, 1 kHz, Q = 1/sqrt(2), 0 dB.
    fn default() -> Self {
        Self {
            sample_rate_hz: 48000.0,
            center_freq_hz: 1000.0,
            bandwidth: BandwidthSpec::default(),
            gain_db: 0.0,
        }
    }
}

impl FilterParameters {
    /// Parameters with a 0 dB gain.
    pub fn new(sample_rate_hz: f64, center_freq_hz: f64, bandwidth: BandwidthSpec) -> Self {
        Self {
            sample_rate_hz,
            center_freq_hz,
            bandwidth,
            gain_db: 0.0,
        }
    }

    /// Replace the shelf gain.
    pub fn with_gain_db(mut self, gain_db: f64) -> Self {
        self.gain_db = gain_db;
        self
    }

    /// Check that [`derive`] would succeed for `response`.
    ///
    /// Once this returns `Ok`, deriving coefficients from the same inputs
    /// cannot fail and yields only finite values.
    pub fn validate(&self, response: FilterResponse) -> Result<()> {
        ensure_below_nyquist("center frequency", self.center_freq_hz, self.sample_rate_hz)?;

        let kind = self.bandwidth.kind();
        if !response.accepts(kind) {
            return Err(DspError::BandwidthMismatch {
                response,
                bandwidth: kind,
            });
        }
        ensure_positive(self.bandwidth.name(), self.bandwidth.value())?;

        if !self.gain_db.is_finite() {
            return Err(DspError::invalid("gain", self.gain_db, "must be finite"));
        }

        if response.is_shelf() {
            let a = shelf_amplitude(self.gain_db);
            if !a.is_finite() || a <= 0.0 || !a.recip().is_finite() {
                return Err(DspError::invalid(
                    "gain",
                    self.gain_db,
                    "shelf amplitude is not representable",
                ));
            }
            if let BandwidthSpec::ShelfSlope(slope) = self.bandwidth {
                if shelf_radicand(a, slope) < 0.0 {
                    return Err(DspError::NumericDomain {
                        what: "shelf slope too steep for the requested gain",
                    });
                }
            }
        }

        // Shelf coefficients scale with the square of the amplitude.
        if response.is_shelf() && !derive_validated(self, response).0.is_finite() {
            return Err(DspError::NumericDomain {
                what: "shelf gain overflows the coefficients",
            });
        }

        if let BandwidthSpec::HalfPowerBandwidthOctaves(bw) = self.bandwidth {
            let omega0 = omega0(self);
            let sin_w0 = omega0.sin();
            if sin_w0 <= 0.0 {
                return Err(DspError::NumericDomain {
                    what: "sin(omega0) is zero",
                });
            }
            if !octave_alpha(bw, omega0, sin_w0).is_finite() {
                return Err(DspError::NumericDomain {
                    what: "half-power bandwidth overflows near Nyquist",
                });
            }
        }

        Ok(())
    }
}

/// Intermediate values of one derivation, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoefficientTrace {
    pub omega0: f64,
    pub cos_w0: f64,
    pub sin_w0: f64,
    pub alpha: f64,
    /// Shelf amplitude `10^(gain_db/40)`.
    pub gain: f64,
    /// `2·sqrt(gain)·alpha`, shelving responses only.
    pub alpha_prime: Option<f64>,
}

/// Derive the six biquad coefficients for `response`.
pub fn derive(params: &FilterParameters, response: FilterResponse) -> Result<BiquadCoeffs> {
    derive_with_trace(params, response).map(|(coeffs, _)| coeffs)
}

/// Derive coefficients and report the intermediate values.
pub fn derive_with_trace(
    params: &FilterParameters,
    response: FilterResponse,
) -> Result<(BiquadCoeffs, CoefficientTrace)> {
    params.validate(response)?;
    Ok(derive_validated(params, response))
}

/// Derivation proper. `params` must already have passed
/// [`FilterParameters::validate`] for `response`.
pub(crate) fn derive_validated(
    params: &FilterParameters,
    response: FilterResponse,
) -> (BiquadCoeffs, CoefficientTrace) {
    let omega0 = omega0(params);
    let cos_w0 = omega0.cos();
    let sin_w0 = omega0.sin();
    let gain = shelf_amplitude(params.gain_db);

    let alpha = match params.bandwidth {
        BandwidthSpec::QFactor(q) => sin_w0 / (2.0 * q),
        BandwidthSpec::HalfPowerBandwidthOctaves(bw) => octave_alpha(bw, omega0, sin_w0),
        BandwidthSpec::ShelfSlope(slope) => 0.5 * sin_w0 * shelf_radicand(gain, slope).sqrt(),
    };

    let alpha_prime = response.is_shelf().then(|| 2.0 * gain.sqrt() * alpha);

    let trace = CoefficientTrace {
        omega0,
        cos_w0,
        sin_w0,
        alpha,
        gain,
        alpha_prime,
    };

    let coeffs = match (response, alpha_prime) {
        // Unity shelf: poles and zeros coincide, emit the cancelled form.
        (FilterResponse::LowShelf | FilterResponse::HighShelf, _) if params.gain_db == 0.0 => {
            BiquadCoeffs::IDENTITY
        }
        (FilterResponse::LowShelf, Some(ap)) => {
            let s = ShelfTerms::new(gain, cos_w0);
            BiquadCoeffs {
                b0: gain * (s.pmm + ap),
                b1: 2.0 * gain * s.mmp,
                b2: gain * (s.pmm - ap),
                a0: s.ppm + ap,
                a1: -2.0 * s.mpp,
                a2: s.ppm - ap,
            }
        }
        (FilterResponse::HighShelf, Some(ap)) => {
            let s = ShelfTerms::new(gain, cos_w0);
            BiquadCoeffs {
                b0: gain * (s.ppm + ap),
                b1: -2.0 * gain * s.mpp,
                b2: gain * (s.ppm - ap),
                a0: s.pmm + ap,
                a1: 2.0 * s.mmp,
                a2: s.pmm - ap,
            }
        }
        (FilterResponse::BandPass, _) => BiquadCoeffs {
            b0: alpha,
            b1: 0.0,
            b2: -alpha,
            a0: 1.0 + alpha,
            a1: -2.0 * cos_w0,
            a2: 1.0 - alpha,
        },
        (FilterResponse::LowPass, _) => {
            let b1 = 1.0 - cos_w0;
            BiquadCoeffs {
                b0: b1 / 2.0,
                b1,
                b2: b1 / 2.0,
                a0: 1.0 + alpha,
                a1: -2.0 * cos_w0,
                a2: 1.0 - alpha,
            }
        }
        (FilterResponse::HighPass, _) => {
            let b0 = (1.0 + cos_w0) / 2.0;
            BiquadCoeffs {
                b0,
                b1: -(1.0 + cos_w0),
                b2: b0,
                a0: 1.0 + alpha,
                a1: -2.0 * cos_w0,
                a2: 1.0 - alpha,
            }
        }
        (FilterResponse::Notch, _) => BiquadCoeffs {
            b0: 1.0,
            b1: -2.0 * cos_w0,
            b2: 1.0,
            a0: 1.0 + alpha,
            a1: -2.0 * cos_w0,
            a2: 1.0 - alpha,
        },
        (FilterResponse::AllPass, _) => BiquadCoeffs {
            b0: 1.0 - alpha,
            b1: -2.0 * cos_w0,
            b2: 1.0 + alpha,
            a0: 1.0 + alpha,
            a1: -2.0 * cos_w0,
            a2: 1.0 - alpha,
        },
        // is_shelf() always yields Some(alpha')
        (FilterResponse::LowShelf | FilterResponse::HighShelf, None) => BiquadCoeffs::IDENTITY,
    };

    (coeffs, trace)
}

/// Evaluate `H(e^jw)` of `c` at `freq` Hz.
///
/// Returns `(magnitude, phase)`: linear magnitude, phase in radians.
pub fn response_at(c: &BiquadCoeffs, sample_rate: f64, freq: f64) -> (f64, f64) {
    let w = 2.0 * PI * freq / sample_rate;
    let (sin_w, cos_w) = w.sin_cos();
    let (sin_2w, cos_2w) = (2.0 * w).sin_cos();

    // H = (b0 + b1*e^(-jw) + b2*e^(-j2w)) / (a0 + a1*e^(-jw) + a2*e^(-j2w))
    let num_re = c.b0 + c.b1 * cos_w + c.b2 * cos_2w;
    let num_im = -c.b1 * sin_w - c.b2 * sin_2w;
    let den_re = c.a0 + c.a1 * cos_w + c.a2 * cos_2w;
    let den_im = -c.a1 * sin_w - c.a2 * sin_2w;

    let den_mag_sq = den_re * den_re + den_im * den_im;
    let h_re = (num_re * den_re + num_im * den_im) / den_mag_sq;
    let h_im = (num_im * den_re - num_re * den_im) / den_mag_sq;

    (h_re.hypot(h_im), h_im.atan2(h_re))
}

fn omega0(params: &FilterParameters) -> f64 {
    2.0 * PI * params.center_freq_hz / params.sample_rate_hz
}

fn octave_alpha(bw: f64, omega0: f64, sin_w0: f64) -> f64 {
    sin_w0 * (LN_2 / 2.0 * bw * omega0 / sin_w0).sinh()
}

fn shelf_radicand(gain: f64, slope: f64) -> f64 {
    (gain + 1.0 / gain) * (1.0 / slope - 1.0) + 2.0
}

/// Sums and differences shared by both shelving forms.
struct ShelfTerms {
    /// `(A+1) - (A-1)cos`
    pmm: f64,
    /// `(A-1) - (A+1)cos`
    mmp: f64,
    /// `(A+1) + (A-1)cos`
    ppm: f64,
    /// `(A-1) + (A+1)cos`
    mpp: f64,
}

impl ShelfTerms {
    fn new(gain: f64, cos_w0: f64) -> Self {
        let gp = gain + 1.0;
        let gm = gain - 1.0;
        let mc = gm * cos_w0;
        let pc = gp * cos_w0;
        Self {
            pmm: gp - mc,
            mmp: gm - pc,
            ppm: gp + mc,
            mpp: gm + pc,
        }
    }
}
