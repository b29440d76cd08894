// SPDX-License-Identifier: LGPL-3.0-or-later

//! Fourth-order Linkwitz-Riley two-band crossover.
//!
//! The low and high outputs are designed directly as fourth-order
//! sections from the analog prototype, pre-warped with the bilinear
//! transform so the crossover lands exactly on the cutoff:
//!
//! ```text
//!   w  = 2π·fc
//!   c  = w / tan(π·fc/fs)
//!   lo = w⁴·{1, 4, 6, 4, 1} / at
//!   hi = c⁴·{1,-4, 6,-4, 1} / at
//! ```
//!
//! Both bands share one denominator. Each band is -6 dB at the cutoff and
//! their sum is flat in magnitude.

use std::f64::consts::{PI, SQRT_2};

use modal_dsp_lib::filters::lr4_process;
use modal_dsp_lib::types::{Lr4Coeffs, Lr4History};
use tracing::debug;

use crate::error::{Result, ensure_below_nyquist};

/// Two-band LR4 splitter.
///
/// # Examples
///
/// ```
/// use modal_dsp_units::util::crossover::LinkwitzRiley;
///
/// let mut xover = LinkwitzRiley::new(48000.0, 1000.0).unwrap();
///
/// let input = vec![1.0; 256];
/// let mut low = vec![0.0; 256];
/// let mut high = vec![0.0; 256];
/// xover.process(&mut low, &mut high, &input);
/// ```
#[derive(Debug, Clone)]
pub struct LinkwitzRiley {
    sample_rate: f64,
    cutoff: f64,
    coeffs: Lr4Coeffs,
    history: Lr4History,
}

impl Default for LinkwitzRiley {
    /// 44.1 kHz, 440 Hz cutoff.
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            cutoff: 440.0,
            coeffs: lr4_coeffs(44100.0, 440.0),
            history: Lr4History::default(),
        }
    }
}

impl LinkwitzRiley {
    /// Create a splitter. Requires `0 < cutoff < sample_rate / 2`.
    pub fn new(sample_rate: f64, cutoff: f64) -> Result<Self> {
        ensure_below_nyquist("cutoff", cutoff, sample_rate)?;
        Ok(Self {
            sample_rate,
            cutoff,
            coeffs: lr4_coeffs(sample_rate, cutoff),
            history: Lr4History::default(),
        })
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    pub fn coefficients(&self) -> &Lr4Coeffs {
        &self.coeffs
    }

    /// Change the sample rate, keeping the cutoff.
    pub fn set_sample_rate(&mut self, sample_rate: f64) -> Result<()> {
        ensure_below_nyquist("cutoff", self.cutoff, sample_rate)?;
        self.sample_rate = sample_rate;
        self.update_coeffs();
        Ok(())
    }

    /// Change the cutoff frequency.
    pub fn set_cutoff(&mut self, cutoff: f64) -> Result<()> {
        ensure_below_nyquist("cutoff", cutoff, self.sample_rate)?;
        self.cutoff = cutoff;
        self.update_coeffs();
        Ok(())
    }

    /// Zero the shared history.
    pub fn reset(&mut self) {
        self.history.reset();
    }

    /// Split `src` into `low` and `high`.
    ///
    /// Processes the shortest of the three buffers.
    pub fn process(&mut self, low: &mut [f64], high: &mut [f64], src: &[f64]) {
        lr4_process(low, high, src, &self.coeffs, &mut self.history);
    }

    fn update_coeffs(&mut self) {
        self.coeffs = lr4_coeffs(self.sample_rate, self.cutoff);
        debug!(
            sample_rate = self.sample_rate,
            cutoff = self.cutoff,
            "crossover coefficients updated"
        );
    }
}

fn lr4_coeffs(sample_rate: f64, cutoff: f64) -> Lr4Coeffs {
    let w = 2.0 * PI * cutoff;
    let w2 = w * w;
    let w3 = w2 * w;
    let w4 = w2 * w2;

    let c = w / (PI * cutoff / sample_rate).tan();
    let c2 = c * c;
    let c3 = c2 * c;
    let c4 = c2 * c2;

    let bt1 = SQRT_2 * w3 * c;
    let bt2 = SQRT_2 * w * c3;
    let at = 4.0 * w2 * c2 + 2.0 * bt1 + c4 + 2.0 * bt2 + w4;

    let lo = w4 / at;
    let hi = c4 / at;

    Lr4Coeffs {
        b: [
            4.0 * (w4 + bt1 - c4 - bt2) / at,
            (6.0 * w4 - 8.0 * w2 * c2 + 6.0 * c4) / at,
            4.0 * (w4 - bt1 + bt2 - c4) / at,
            (c4 - 2.0 * bt1 + w4 - 2.0 * bt2 + 4.0 * w2 * c2) / at,
        ],
        lo: [lo, 4.0 * lo, 6.0 * lo, 4.0 * lo, lo],
        hi: [hi, -4.0 * hi, 6.0 * hi, -4.0 * hi, hi],
    }
}
