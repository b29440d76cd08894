// SPDX-License-Identifier: LGPL-3.0-or-later

//! Block-level dynamics processor.
//!
//! The level of each block (or of its sidechain) is measured once with a
//! [`LevelKind`] detector. While that level is above the threshold, the
//! effective ratio moves linearly toward the configured ratio over the
//! attack time; otherwise it moves back toward 1 over the release time.
//! The gain applied to every sample is
//!
//! ```text
//!   g = 1 + k * (r_eff - 1)
//!   k = clamp((level - threshold) / knee, 0, 1)
//! ```
//!
//! so the ratio selects the behaviour: below 0 inverts, 0 limits, (0, 1)
//! compresses, 1 is neutral and above 1 expands. `k` is held at its last
//! engaged value during release so the gain glides back to unity.

use tracing::debug;

use crate::error::{DspError, Result, ensure_positive};
use crate::meters::level::{LevelKind, summary_level};
use crate::units::{db_to_gain, millis_to_samples};

/// Committed configuration of a [`DynamicsProcessor`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DynamicsSettings {
    pub detector: LevelKind,
    /// Engagement threshold (linear amplitude).
    pub threshold: f64,
    /// Target gain ratio when fully engaged.
    pub ratio: f64,
    /// Attack time in samples.
    pub attack: f64,
    /// Release time in samples.
    pub release: f64,
    /// Knee width (linear amplitude above the threshold).
    pub knee: f64,
    /// Output gain (linear).
    pub makeup: f64,
}

impl Default for DynamicsSettings {
    /// Peak detector, threshold 0.5, neutral ratio, 10 ms attack and
    /// 100 ms release at 44.1 kHz, hard knee, unity makeup.
    fn default() -> Self {
        Self {
            detector: LevelKind::Peak,
            threshold: 0.5,
            ratio: 1.0,
            attack: 441.0,
            release: 4410.0,
            knee: 0.0,
            makeup: 1.0,
        }
    }
}

impl DynamicsSettings {
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("threshold", self.threshold)?;
        if !self.ratio.is_finite() {
            return Err(DspError::invalid("ratio", self.ratio, "must be finite"));
        }
        ensure_positive("attack", self.attack)?;
        ensure_positive("release", self.release)?;
        ensure_non_negative("knee", self.knee)?;
        ensure_non_negative("makeup gain", self.makeup)?;
        Ok(())
    }
}

fn ensure_non_negative(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(DspError::invalid(name, value, "must be finite"));
    }
    if value < 0.0 {
        return Err(DspError::invalid(name, value, "must not be negative"));
    }
    Ok(())
}

/// Compressor / limiter / inverter / expander driven by block levels.
///
/// Setters record pending values; [`update_settings`](DynamicsProcessor::update_settings)
/// validates them and makes them active. Processing always uses the last
/// committed settings.
///
/// # Examples
///
/// ```
/// use modal_dsp_units::dynamics::processor::DynamicsProcessor;
/// use modal_dsp_units::meters::level::LevelKind;
///
/// let mut dynamics = DynamicsProcessor::new(48000.0).unwrap();
/// dynamics
///     .set_detector(LevelKind::Rms)
///     .set_threshold_db(-12.0)
///     .set_ratio(0.25)
///     .set_attack_ms(5.0)
///     .set_release_ms(50.0);
/// dynamics.update_settings().unwrap();
///
/// let input = vec![0.9; 64];
/// let mut output = vec![0.0; 64];
/// dynamics.process(&mut output, None, &input);
/// assert!(output[63] < input[63]);
/// ```
#[derive(Debug, Clone)]
pub struct DynamicsProcessor {
    sample_rate: f64,
    pending: DynamicsSettings,
    active: DynamicsSettings,
    attack_step: f64,
    release_step: f64,
    effective_ratio: f64,
    knee_mod: f64,
    dirty: bool,
}

impl DynamicsProcessor {
    /// Create a processor with [`DynamicsSettings::default`].
    pub fn new(sample_rate: f64) -> Result<Self> {
        Self::with_settings(sample_rate, DynamicsSettings::default())
    }

    pub fn with_settings(sample_rate: f64, settings: DynamicsSettings) -> Result<Self> {
        ensure_positive("sample rate", sample_rate)?;
        settings.validate()?;
        let mut processor = Self {
            sample_rate,
            pending: settings,
            active: settings,
            attack_step: 0.0,
            release_step: 0.0,
            effective_ratio: 1.0,
            knee_mod: 0.0,
            dirty: false,
        };
        processor.compute_steps();
        Ok(processor)
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Change the rate used by the millisecond setters.
    ///
    /// Attack and release are stored in samples and are not rescaled.
    pub fn set_sample_rate(&mut self, sample_rate: f64) -> Result<()> {
        ensure_positive("sample rate", sample_rate)?;
        self.sample_rate = sample_rate;
        Ok(())
    }

    /// Settings currently used for processing.
    pub fn settings(&self) -> &DynamicsSettings {
        &self.active
    }

    /// Settings that the next `update_settings` would apply.
    pub fn pending(&self) -> &DynamicsSettings {
        &self.pending
    }

    pub fn effective_ratio(&self) -> f64 {
        self.effective_ratio
    }

    /// Set the level detector.
    pub fn set_detector(&mut self, detector: LevelKind) -> &mut Self {
        self.pending.detector = detector;
        self.dirty = true;
        self
    }

    /// Set the threshold (linear amplitude).
    pub fn set_threshold(&mut self, threshold: f64) -> &mut Self {
        self.pending.threshold = threshold;
        self.dirty = true;
        self
    }

    /// Set the threshold in dB.
    pub fn set_threshold_db(&mut self, db: f64) -> &mut Self {
        self.set_threshold(db_to_gain(db))
    }

    /// Set the ratio reached when fully engaged.
    pub fn set_ratio(&mut self, ratio: f64) -> &mut Self {
        self.pending.ratio = ratio;
        self.dirty = true;
        self
    }

    /// Set the attack time in samples.
    pub fn set_attack(&mut self, samples: f64) -> &mut Self {
        self.pending.attack = samples;
        self.dirty = true;
        self
    }

    /// Set the attack time in milliseconds.
    pub fn set_attack_ms(&mut self, ms: f64) -> &mut Self {
        self.set_attack(millis_to_samples(self.sample_rate, ms))
    }

    /// Set the release time in samples.
    pub fn set_release(&mut self, samples: f64) -> &mut Self {
        self.pending.release = samples;
        self.dirty = true;
        self
    }

    /// Set the release time in milliseconds.
    pub fn set_release_ms(&mut self, ms: f64) -> &mut Self {
        self.set_release(millis_to_samples(self.sample_rate, ms))
    }

    /// Set the knee width (linear amplitude).
    pub fn set_knee(&mut self, knee: f64) -> &mut Self {
        self.pending.knee = knee;
        self.dirty = true;
        self
    }

    /// Set the knee width in dB.
    pub fn set_knee_db(&mut self, db: f64) -> &mut Self {
        self.set_knee(db_to_gain(db))
    }

    /// Set the makeup gain (linear).
    pub fn set_makeup(&mut self, gain: f64) -> &mut Self {
        self.pending.makeup = gain;
        self.dirty = true;
        self
    }

    /// Set the makeup gain in dB.
    pub fn set_makeup_db(&mut self, db: f64) -> &mut Self {
        self.set_makeup(db_to_gain(db))
    }

    /// Validate and commit pending settings.
    ///
    /// On error the active settings stay in place and the pending values
    /// are kept so they can be corrected.
    pub fn update_settings(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        self.pending.validate()?;

        self.active = self.pending;
        self.compute_steps();
        self.dirty = false;
        debug!(
            threshold = self.active.threshold,
            ratio = self.active.ratio,
            attack = self.active.attack,
            release = self.active.release,
            "dynamics settings updated"
        );
        Ok(())
    }

    /// Return the effective ratio to neutral.
    pub fn reset(&mut self) {
        self.effective_ratio = 1.0;
        self.knee_mod = 0.0;
    }

    /// Process `src` into `dst`.
    ///
    /// The block level is taken from `sidechain` when given, else from
    /// `src`. Processes `min(dst.len(), src.len())` samples.
    pub fn process(&mut self, dst: &mut [f64], sidechain: Option<&[f64]>, src: &[f64]) {
        let s = &self.active;
        let level = summary_level(sidechain.unwrap_or(src), s.detector);
        let engaged = level > s.threshold;

        if engaged {
            self.knee_mod = if s.knee > 0.0 {
                ((level - s.threshold) / s.knee).clamp(0.0, 1.0)
            } else {
                1.0
            };
        }
        let (target, step) = if engaged {
            (s.ratio, self.attack_step)
        } else {
            (1.0, self.release_step)
        };

        for (out, &x) in dst.iter_mut().zip(src.iter()) {
            self.effective_ratio = approach(self.effective_ratio, target, step);
            let gain = 1.0 + self.knee_mod * (self.effective_ratio - 1.0);
            *out = s.makeup * gain * x;
        }
    }

    fn compute_steps(&mut self) {
        let span = (self.active.ratio - 1.0).abs();
        self.attack_step = span / self.active.attack;
        self.release_step = span / self.active.release;
    }
}

/// Move `current` toward `target` by at most `step`.
#[inline]
fn approach(current: f64, target: f64, step: f64) -> f64 {
    if current < target {
        (current + step).min(target)
    } else {
        (current - step).max(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    const SR: f64 = 48000.0;

    fn processor(ratio: f64, attack: f64, release: f64) -> DynamicsProcessor {
        let mut d = DynamicsProcessor::new(SR).unwrap();
        d.set_threshold(0.5)
            .set_ratio(ratio)
            .set_attack(attack)
            .set_release(release);
        d.update_settings().unwrap();
        d
    }

    #[test]
    fn neutral_ratio_applies_makeup_only() {
        let mut d = processor(1.0, 10.0, 10.0);
        d.set_makeup(2.0);
        d.update_settings().unwrap();
        let src = [0.9, -0.7, 0.3, 0.0];
        let mut dst = [0.0; 4];
        d.process(&mut dst, None, &src);
        assert_eq!(dst, [1.8, -1.4, 0.6, 0.0]);
    }

    #[test]
    fn compressor_attack_is_linear() {
        let mut d = processor(0.5, 4.0, 8.0);
        let src = [1.0; 6];
        let mut dst = [0.0; 6];
        d.process(&mut dst, None, &src);
        assert_eq!(dst, [0.875, 0.75, 0.625, 0.5, 0.5, 0.5]);
        assert_eq!(d.effective_ratio(), 0.5);
    }

    #[test]
    fn release_glides_back_to_unity() {
        let mut d = processor(0.5, 4.0, 8.0);
        let mut dst = [0.0; 4];
        d.process(&mut dst, None, &[1.0; 4]);

        let quiet = [0.25; 10];
        let mut out = [0.0; 10];
        d.process(&mut out, None, &quiet);
        // 0.5 -> 1 in 8 steps of 1/16
        assert_approx_eq!(f64, out[0], 0.25 * 0.5625, ulps = 2);
        assert_approx_eq!(f64, out[7], 0.25, ulps = 2);
        assert_eq!(out[9], 0.25);
        assert_eq!(d.effective_ratio(), 1.0);
    }

    #[test]
    fn limiter_reaches_zero() {
        let mut d = processor(0.0, 3.0, 3.0);
        let mut dst = [0.0; 4];
        d.process(&mut dst, None, &[0.8; 4]);
        assert_eq!(dst[3], 0.0);
        assert_eq!(d.effective_ratio(), 0.0);
    }

    #[test]
    fn expander_boosts() {
        let mut d = processor(2.0, 2.0, 2.0);
        let mut dst = [0.0; 3];
        d.process(&mut dst, None, &[0.6; 3]);
        assert_approx_eq!(f64, dst[0], 0.6 * 1.5, ulps = 2);
        assert_approx_eq!(f64, dst[2], 1.2, ulps = 2);
    }

    #[test]
    fn knee_scales_engagement() {
        let mut d = processor(0.5, 1.0, 1.0);
        d.set_knee(0.2);
        d.update_settings().unwrap();
        let mut dst = [0.0; 2];
        // level 0.6: k = (0.6 - 0.5) / 0.2 = 0.5, g = 1 - 0.25
        d.process(&mut dst, None, &[0.6, 0.6]);
        assert_approx_eq!(f64, dst[1], 0.6 * 0.75, epsilon = 1e-12);
    }

    #[test]
    fn sidechain_drives_level() {
        let mut d = processor(0.5, 1.0, 1.0);
        let src = [0.1; 4];
        let mut dst = [0.0; 4];
        d.process(&mut dst, Some(&[1.0; 4]), &src);
        assert_approx_eq!(f64, dst[0], 0.05, ulps = 2);

        d.reset();
        let mut dst = [0.0; 4];
        d.process(&mut dst, Some(&[0.0; 4]), &[1.0; 4]);
        assert_eq!(dst, [1.0; 4]);
    }

    #[test]
    fn invalid_settings_keep_active() {
        let mut d = processor(0.5, 4.0, 8.0);
        let before = *d.settings();
        d.set_attack(0.0).set_ratio(0.25);
        assert!(d.update_settings().unwrap_err().is_invalid_parameter());
        assert_eq!(*d.settings(), before);
        assert_eq!(d.pending().ratio, 0.25);

        d.set_attack(2.0);
        d.update_settings().unwrap();
        assert_eq!(d.settings().ratio, 0.25);
    }

    #[test]
    fn unit_setters_convert() {
        let mut d = DynamicsProcessor::new(SR).unwrap();
        d.set_attack_ms(10.0)
            .set_release_ms(100.0)
            .set_threshold_db(-20.0)
            .set_makeup_db(0.0);
        d.update_settings().unwrap();
        let s = d.settings();
        assert_approx_eq!(f64, s.attack, 480.0, ulps = 2);
        assert_approx_eq!(f64, s.release, 4800.0, ulps = 2);
        assert_approx_eq!(f64, s.threshold, 0.1, ulps = 4);
        assert_eq!(s.makeup, 1.0);
    }

    #[test]
    fn sample_rate_change_affects_ms_setters() {
        let mut d = DynamicsProcessor::new(SR).unwrap();
        d.set_attack(480.0);
        d.update_settings().unwrap();

        assert!(d.set_sample_rate(0.0).is_err());
        assert!(d.set_sample_rate(f64::NAN).is_err());
        assert_eq!(d.sample_rate(), SR);

        d.set_sample_rate(96000.0).unwrap();
        assert_eq!(d.sample_rate(), 96000.0);
        assert_eq!(d.settings().attack, 480.0);

        d.set_attack_ms(10.0).set_release_ms(50.0);
        d.update_settings().unwrap();
        assert_approx_eq!(f64, d.settings().attack, 960.0, ulps = 2);
        assert_approx_eq!(f64, d.settings().release, 4800.0, ulps = 2);
    }

    #[test]
    fn rejects_bad_construction() {
        assert!(DynamicsProcessor::new(0.0).is_err());
        let bad = DynamicsSettings {
            knee: -1.0,
            ..DynamicsSettings::default()
        };
        assert!(DynamicsProcessor::with_settings(SR, bad).is_err());
    }
}
