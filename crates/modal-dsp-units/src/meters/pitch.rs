// SPDX-License-Identifier: LGPL-3.0-or-later

//! YIN fundamental-frequency estimator.
//!
//! # Algorithm
//!
//! For an input of `2W` samples:
//!
//! 1. Squared difference `d(τ) = Σ_{i<W} (x[i] - x[i+τ])²` for `τ < W`.
//! 2. Cumulative-mean normalization `d'(τ) = d(τ)·τ / Σ_{j=1..τ} d(j)`,
//!    `d'(0) = 1`.
//! 3. Absolute threshold: the first `τ >= 2` with `d'(τ) < threshold`,
//!    then followed downhill to the local minimum.
//! 4. Parabolic interpolation around that minimum.
//!
//! The estimate is `fs / τ̂` with probability `1 - d'(τ)`.
//!
//! # Examples
//!
//! ```
//! use modal_dsp_units::meters::pitch::Yin;
//!
//! let fs = 44100.0;
//! let signal: Vec<f64> = (0..2048)
//!     .map(|i| (2.0 * std::f64::consts::PI * 441.0 * i as f64 / fs).sin())
//!     .collect();
//!
//! let mut yin = Yin::new(fs, 0.15).unwrap();
//! let estimate = yin.detect(&signal).unwrap().unwrap();
//! assert!((estimate.frequency_hz - 441.0).abs() < 1.0);
//! ```

use modal_dsp_lib::correlation::{cumulative_mean_normalize, squared_difference};
use tracing::trace;

use crate::error::{DspError, Result, ensure_positive};

/// Threshold used by [`Yin::default`].
pub const DEFAULT_THRESHOLD: f64 = 0.15;

/// Shortest input `detect` accepts.
const MIN_INPUT_LEN: usize = 4;

/// A detected fundamental.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchEstimate {
    pub frequency_hz: f64,
    /// `1 - d'(τ)` at the chosen lag, in `(0, 1]`.
    pub probability: f64,
}

/// YIN pitch detector.
///
/// Holds the lag buffer so repeated calls with the same input length do
/// not allocate.
#[derive(Debug, Clone)]
pub struct Yin {
    sample_rate: f64,
    threshold: f64,
    buffer: Vec<f64>,
}

impl Default for Yin {
    /// 44.1 kHz with [`DEFAULT_THRESHOLD`].
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            threshold: DEFAULT_THRESHOLD,
            buffer: Vec::new(),
        }
    }
}

impl Yin {
    /// Create a detector. `threshold` must lie in `(0, 1]`.
    pub fn new(sample_rate: f64, threshold: f64) -> Result<Self> {
        ensure_positive("sample rate", sample_rate)?;
        check_threshold(threshold)?;
        Ok(Self {
            sample_rate,
            threshold,
            buffer: Vec::new(),
        })
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn set_sample_rate(&mut self, sample_rate: f64) -> Result<()> {
        ensure_positive("sample rate", sample_rate)?;
        self.sample_rate = sample_rate;
        Ok(())
    }

    pub fn set_threshold(&mut self, threshold: f64) -> Result<()> {
        check_threshold(threshold)?;
        self.threshold = threshold;
        Ok(())
    }

    /// Estimate the fundamental of `input`.
    ///
    /// Returns `Ok(None)` when no lag falls below the threshold. Inputs
    /// shorter than four samples are rejected.
    pub fn detect(&mut self, input: &[f64]) -> Result<Option<PitchEstimate>> {
        if input.len() < MIN_INPUT_LEN {
            return Err(DspError::invalid(
                "input length",
                input.len() as f64,
                "must be at least 4 samples",
            ));
        }

        let window = input.len() / 2;
        self.buffer.clear();
        self.buffer.resize(window, 0.0);
        squared_difference(&mut self.buffer, input);
        cumulative_mean_normalize(&mut self.buffer);

        let Some(tau) = self.absolute_threshold() else {
            trace!(window, threshold = self.threshold, "no pitch below threshold");
            return Ok(None);
        };

        let refined = self.interpolate(tau);
        if refined <= 0.0 {
            return Ok(None);
        }

        Ok(Some(PitchEstimate {
            frequency_hz: self.sample_rate / refined,
            probability: 1.0 - self.buffer[tau],
        }))
    }

    fn absolute_threshold(&self) -> Option<usize> {
        let buf = &self.buffer;
        let mut tau = (2..buf.len()).find(|&t| buf[t] < self.threshold)?;
        while tau + 1 < buf.len() && buf[tau + 1] < buf[tau] {
            tau += 1;
        }
        Some(tau)
    }

    fn interpolate(&self, tau: usize) -> f64 {
        let buf = &self.buffer;
        let z0 = tau.saturating_sub(1);
        let z2 = if tau + 1 < buf.len() { tau + 1 } else { tau };

        if z0 == tau {
            return if buf[tau] <= buf[z2] { tau as f64 } else { z2 as f64 };
        }
        if z2 == tau {
            return if buf[tau] <= buf[z0] { tau as f64 } else { z0 as f64 };
        }

        let (s0, s1, s2) = (buf[z0], buf[tau], buf[z2]);
        let curvature = 2.0 * (2.0 * s1 - s2 - s0);
        if curvature == 0.0 {
            return tau as f64;
        }
        tau as f64 + (s2 - s0) / curvature
    }
}

fn check_threshold(threshold: f64) -> Result<()> {
    ensure_positive("threshold", threshold)?;
    if threshold > 1.0 {
        return Err(DspError::invalid("threshold", threshold, "must not exceed 1"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use std::f64::consts::PI;

    fn sine(freq: f64, fs: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f64 / fs).sin())
            .collect()
    }

    #[test]
    fn detects_441_hz() {
        let mut yin = Yin::new(44100.0, DEFAULT_THRESHOLD).unwrap();
        let est = yin.detect(&sine(441.0, 44100.0, 2048)).unwrap().unwrap();
        assert_approx_eq!(f64, est.frequency_hz, 441.0, epsilon = 1.0);
        assert!(est.probability > 0.9);
    }

    #[test]
    fn detects_non_integer_period() {
        let mut yin = Yin::new(48000.0, DEFAULT_THRESHOLD).unwrap();
        let est = yin.detect(&sine(310.0, 48000.0, 2048)).unwrap().unwrap();
        assert_approx_eq!(f64, est.frequency_hz, 310.0, epsilon = 1.0);
    }

    #[test]
    fn silence_has_no_pitch() {
        let mut yin = Yin::default();
        assert_eq!(yin.detect(&[0.0; 1024]).unwrap(), None);
    }

    #[test]
    fn short_input_is_rejected() {
        let mut yin = Yin::default();
        assert!(yin.detect(&[0.0; 3]).unwrap_err().is_invalid_parameter());
        // Four samples give a two-lag window: nothing to search past lag 1.
        assert_eq!(yin.detect(&[1.0, -1.0, 1.0, -1.0]).unwrap(), None);
    }

    #[test]
    fn threshold_bounds() {
        assert!(Yin::new(44100.0, 0.0).is_err());
        assert!(Yin::new(44100.0, 1.5).is_err());
        assert!(Yin::new(44100.0, f64::NAN).is_err());
        assert!(Yin::new(0.0, 0.1).is_err());
        let mut yin = Yin::new(44100.0, 1.0).unwrap();
        assert!(yin.set_threshold(-0.1).is_err());
        assert_eq!(yin.threshold(), 1.0);
        yin.set_threshold(0.3).unwrap();
        assert_eq!(yin.threshold(), 0.3);
    }

    #[test]
    fn repeated_calls_agree() {
        let signal = sine(220.0, 44100.0, 4096);
        let mut yin = Yin::default();
        let a = yin.detect(&signal).unwrap();
        let b = yin.detect(&signal).unwrap();
        assert_eq!(a, b);
    }
}
