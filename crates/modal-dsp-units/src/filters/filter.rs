// SPDX-License-Identifier: LGPL-3.0-or-later

//! Validated biquad filter with parameter management.
//!
//! Wraps the direct-form I kernel from `modal-dsp-lib` with parameter
//! validation, dirty-flag recalculation, and frequency response evaluation.

use modal_dsp_lib::filters::{biquad_process, biquad_process_inplace, biquad_step};
use modal_dsp_lib::types::{BiquadCoeffs, BiquadHistory};
use tracing::debug;

use super::coeffs::{
    BandwidthSpec, FilterParameters, FilterResponse, derive, derive_validated, response_at,
};
use crate::error::Result;

/// Second-order recursive filter with a fixed response.
///
/// Parameters are validated when they are assigned, so a constructed
/// filter is always in a processable state. Coefficients are recomputed
/// lazily: [`set_parameters`](BiquadFilter::set_parameters) with
/// `propagate = false` marks them stale, and the next call to
/// [`update_settings`](BiquadFilter::update_settings) or to any processing
/// method recomputes them in one step.
///
/// The response is fixed for the life of the filter. Use
/// [`rebuild`](BiquadFilter::rebuild) to change topology.
///
/// # Examples
///
/// ```
/// use modal_dsp_units::filters::coeffs::{BandwidthSpec, FilterParameters, FilterResponse};
/// use modal_dsp_units::filters::filter::BiquadFilter;
///
/// let params = FilterParameters::new(48000.0, 1000.0, BandwidthSpec::QFactor(0.707));
/// let mut filt = BiquadFilter::new(FilterResponse::LowPass, params).unwrap();
///
/// filt.edit()
///     .center_frequency(2000.0)
///     .bandwidth(BandwidthSpec::QFactor(1.0))
///     .commit()
///     .unwrap();
///
/// let input = [1.0, 0.0, 0.0, 0.0];
/// let output = filt.process_buffer(&input);
/// assert_eq!(output.len(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct BiquadFilter {
    response: FilterResponse,
    params: FilterParameters,
    coeffs: BiquadCoeffs,
    history: BiquadHistory,
    dirty: bool,
}

impl BiquadFilter {
    /// Create a filter with zeroed history.
    pub fn new(response: FilterResponse, params: FilterParameters) -> Result<Self> {
        let coeffs = derive(&params, response)?;
        debug!(
            ?response,
            center_freq_hz = params.center_freq_hz,
            sample_rate_hz = params.sample_rate_hz,
            "biquad created"
        );
        Ok(Self {
            response,
            params,
            coeffs,
            history: BiquadHistory::default(),
            dirty: false,
        })
    }

    /// Build a filter with a different topology, carrying this filter's
    /// history over.
    pub fn rebuild(&self, response: FilterResponse, params: FilterParameters) -> Result<Self> {
        let mut filter = Self::new(response, params)?;
        filter.history = self.history;
        Ok(filter)
    }

    pub fn response(&self) -> FilterResponse {
        self.response
    }

    /// Last accepted parameters (committed or pending).
    pub fn parameters(&self) -> &FilterParameters {
        &self.params
    }

    /// Coefficients currently used for processing.
    ///
    /// These lag [`parameters`](BiquadFilter::parameters) while
    /// [`is_stale`](BiquadFilter::is_stale) is true.
    pub fn coefficients(&self) -> &BiquadCoeffs {
        &self.coeffs
    }

    pub fn history(&self) -> &BiquadHistory {
        &self.history
    }

    /// True when parameters were accepted without recomputing coefficients.
    pub fn is_stale(&self) -> bool {
        self.dirty
    }

    /// Replace all parameters at once.
    ///
    /// `params` is validated first; on error nothing changes. With
    /// `propagate = false` the coefficient recomputation is deferred until
    /// [`update_settings`](BiquadFilter::update_settings) or the next
    /// processing call.
    pub fn set_parameters(&mut self, params: FilterParameters, propagate: bool) -> Result<()> {
        params.validate(self.response)?;
        self.params = params;
        self.dirty = true;
        if propagate {
            self.update_settings();
        }
        Ok(())
    }

    /// Start a two-phase parameter change.
    ///
    /// Changes accumulate in the returned [`ParameterEdit`] and reach the
    /// filter only through [`ParameterEdit::commit`].
    pub fn edit(&mut self) -> ParameterEdit<'_> {
        let pending = self.params;
        ParameterEdit {
            filter: self,
            pending,
        }
    }

    /// Recalculate coefficients if parameters have changed.
    pub fn update_settings(&mut self) {
        if !self.dirty {
            return;
        }

        let (coeffs, trace) = derive_validated(&self.params, self.response);
        self.coeffs = coeffs;
        self.dirty = false;
        debug!(
            response = ?self.response,
            center_freq_hz = self.params.center_freq_hz,
            alpha = trace.alpha,
            "biquad coefficients committed"
        );
    }

    /// Zero the history. Parameters and coefficients are kept.
    pub fn reset(&mut self) {
        self.history.reset();
    }

    /// Filter one sample.
    #[inline]
    pub fn process_sample(&mut self, x: f64) -> f64 {
        if self.dirty {
            self.update_settings();
        }
        biquad_step(&self.coeffs, &mut self.history, x)
    }

    /// Filter `input` into a new buffer of the same length.
    pub fn process_buffer(&mut self, input: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; input.len()];
        self.process(&mut out, input);
        out
    }

    /// Filter `src` into `dst`.
    ///
    /// Processes `min(dst.len(), src.len())` samples.
    pub fn process(&mut self, dst: &mut [f64], src: &[f64]) {
        if self.dirty {
            self.update_settings();
        }
        biquad_process(dst, src, &self.coeffs, &mut self.history);
    }

    /// Filter `buf` in place.
    pub fn process_inplace(&mut self, buf: &mut [f64]) {
        if self.dirty {
            self.update_settings();
        }
        biquad_process_inplace(buf, &self.coeffs, &mut self.history);
    }

    /// Frequency response of the current parameters at `freq` Hz.
    ///
    /// Returns `(magnitude, phase)` where magnitude is linear (not dB)
    /// and phase is in radians. Pending parameters are evaluated as if
    /// they had been committed.
    pub fn freq_response(&self, freq: f64) -> (f64, f64) {
        let coeffs = if self.dirty {
            derive_validated(&self.params, self.response).0
        } else {
            self.coeffs
        };
        response_at(&coeffs, self.params.sample_rate_hz, freq)
    }
}

/// Pending parameter change for a [`BiquadFilter`].
///
/// Setters only record values. [`commit`](ParameterEdit::commit) validates
/// the combined result and applies it with a single coefficient
/// recomputation, or leaves the filter untouched on error. Dropping the
/// edit without committing discards it.
#[derive(Debug)]
pub struct ParameterEdit<'a> {
    filter: &'a mut BiquadFilter,
    pending: FilterParameters,
}

impl ParameterEdit<'_> {
    pub fn sample_rate(&mut self, hz: f64) -> &mut Self {
        self.pending.sample_rate_hz = hz;
        self
    }

    pub fn center_frequency(&mut self, hz: f64) -> &mut Self {
        self.pending.center_freq_hz = hz;
        self
    }

    pub fn bandwidth(&mut self, bandwidth: BandwidthSpec) -> &mut Self {
        self.pending.bandwidth = bandwidth;
        self
    }

    pub fn gain_db(&mut self, db: f64) -> &mut Self {
        self.pending.gain_db = db;
        self
    }

    /// Parameters that `commit` would apply.
    pub fn pending(&self) -> &FilterParameters {
        &self.pending
    }

    /// Validate and apply the pending parameters.
    pub fn commit(&mut self) -> Result<()> {
        self.filter.set_parameters(self.pending, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DspError;
    use float_cmp::assert_approx_eq;

    const SR: f64 = 48000.0;

    fn lowpass() -> BiquadFilter {
        let params = FilterParameters::new(SR, 1000.0, BandwidthSpec::QFactor(0.707));
        BiquadFilter::new(FilterResponse::LowPass, params).unwrap()
    }

    #[test]
    fn construction_zeroes_history() {
        let f = lowpass();
        assert_eq!(*f.history(), BiquadHistory::default());
        assert!(!f.is_stale());
        assert_eq!(f.response(), FilterResponse::LowPass);
    }

    #[test]
    fn construction_rejects_invalid() {
        let bad = FilterParameters::new(SR, SR / 2.0, BandwidthSpec::QFactor(1.0));
        assert!(BiquadFilter::new(FilterResponse::LowPass, bad).is_err());
        let bad = FilterParameters::new(SR, 1000.0, BandwidthSpec::QFactor(0.0));
        assert!(BiquadFilter::new(FilterResponse::LowPass, bad).is_err());
        let bad = FilterParameters::new(SR, 10000.0, BandwidthSpec::QFactor(0.7))
            .with_gain_db(6300.0);
        let err = BiquadFilter::new(FilterResponse::HighShelf, bad).unwrap_err();
        assert!(err.is_numeric_domain());
    }

    #[test]
    fn overflowing_shelf_gain_keeps_filter_finite() {
        let params =
            FilterParameters::new(SR, 10000.0, BandwidthSpec::QFactor(0.7)).with_gain_db(6.0);
        let mut f = BiquadFilter::new(FilterResponse::LowShelf, params).unwrap();
        assert!(f.edit().gain_db(6300.0).commit().is_err());
        assert_eq!(f.parameters().gain_db, 6.0);
        let mut impulse = [0.0; 4];
        impulse[0] = 1.0;
        assert!(f.process_buffer(&impulse).iter().all(|y| y.is_finite()));
    }

    #[test]
    fn deferred_update_marks_stale() {
        let mut f = lowpass();
        let before = *f.coefficients();
        let mut p = *f.parameters();
        p.center_freq_hz = 4000.0;
        f.set_parameters(p, false).unwrap();
        assert!(f.is_stale());
        assert_eq!(*f.coefficients(), before);

        f.update_settings();
        assert!(!f.is_stale());
        assert_ne!(*f.coefficients(), before);
        assert_eq!(*f.coefficients(), derive(&p, FilterResponse::LowPass).unwrap());
    }

    #[test]
    fn processing_commits_pending_parameters() {
        let mut f = lowpass();
        let mut p = *f.parameters();
        p.center_freq_hz = 300.0;
        f.set_parameters(p, false).unwrap();

        let y = f.process_sample(1.0);
        assert!(!f.is_stale());
        let c = derive(&p, FilterResponse::LowPass).unwrap();
        assert_approx_eq!(f64, y, c.b0 / c.a0, ulps = 2);
    }

    #[test]
    fn rejected_update_keeps_state() {
        let mut f = lowpass();
        f.process_sample(1.0);
        let params = *f.parameters();
        let coeffs = *f.coefficients();
        let history = *f.history();

        let mut bad = params;
        bad.center_freq_hz = 30000.0;
        assert!(f.set_parameters(bad, true).is_err());
        let mut bad = params;
        bad.bandwidth = BandwidthSpec::ShelfSlope(1.0);
        assert!(matches!(
            f.set_parameters(bad, false),
            Err(DspError::BandwidthMismatch { .. })
        ));

        assert_eq!(*f.parameters(), params);
        assert_eq!(*f.coefficients(), coeffs);
        assert_eq!(*f.history(), history);
        assert!(!f.is_stale());
    }

    #[test]
    fn edit_commits_atomically() {
        let mut f = lowpass();
        f.edit()
            .center_frequency(2000.0)
            .bandwidth(BandwidthSpec::QFactor(2.0))
            .commit()
            .unwrap();
        assert_eq!(f.parameters().center_freq_hz, 2000.0);
        assert_eq!(f.parameters().bandwidth, BandwidthSpec::QFactor(2.0));
        assert!(!f.is_stale());

        // Invalid sample rate for the pending frequency: nothing is applied.
        let before = *f.parameters();
        let err = f
            .edit()
            .center_frequency(5000.0)
            .sample_rate(8000.0)
            .commit()
            .unwrap_err();
        assert!(err.is_invalid_parameter());
        assert_eq!(*f.parameters(), before);
    }

    #[test]
    fn dropped_edit_changes_nothing() {
        let mut f = lowpass();
        let before = *f.parameters();
        {
            let mut edit = f.edit();
            edit.center_frequency(100.0);
            assert_eq!(edit.pending().center_freq_hz, 100.0);
        }
        assert_eq!(*f.parameters(), before);
    }

    #[test]
    fn reset_keeps_coefficients() {
        let mut f = lowpass();
        f.process_buffer(&[1.0, 0.5, -0.25]);
        let coeffs = *f.coefficients();
        f.reset();
        assert_eq!(*f.history(), BiquadHistory::default());
        assert_eq!(*f.coefficients(), coeffs);
        for _ in 0..64 {
            assert_eq!(f.process_sample(0.0), 0.0);
        }
    }

    #[test]
    fn buffer_matches_sample_loop() {
        let input: Vec<f64> = (0..32).map(|i| ((i * 7) % 5) as f64 - 2.0).collect();
        let mut a = lowpass();
        let mut b = lowpass();
        let buffered = a.process_buffer(&input);
        let looped: Vec<f64> = input.iter().map(|&x| b.process_sample(x)).collect();
        assert_eq!(buffered, looped);

        let mut c = lowpass();
        let mut inplace = input.clone();
        c.process_inplace(&mut inplace);
        assert_eq!(inplace, buffered);
    }

    #[test]
    fn rebuild_carries_history() {
        let mut f = lowpass();
        f.process_buffer(&[1.0, -1.0, 0.5]);
        let params = FilterParameters::new(SR, 1000.0, BandwidthSpec::QFactor(0.707));
        let g = f.rebuild(FilterResponse::HighPass, params).unwrap();
        assert_eq!(g.response(), FilterResponse::HighPass);
        assert_eq!(*g.history(), *f.history());
        assert_eq!(f.response(), FilterResponse::LowPass);

        let bad = FilterParameters::new(SR, 1000.0, BandwidthSpec::ShelfSlope(1.0));
        assert!(f.rebuild(FilterResponse::HighPass, bad).is_err());
    }

    #[test]
    fn freq_response_tracks_pending_parameters() {
        let mut f = lowpass();
        let (dc, _) = f.freq_response(0.0);
        assert_approx_eq!(f64, dc, 1.0, epsilon = 1e-12);

        let mut p = *f.parameters();
        p.center_freq_hz = 100.0;
        f.set_parameters(p, false).unwrap();
        let (mag, _) = f.freq_response(100.0);
        assert_approx_eq!(f64, mag, 0.707, epsilon = 1e-3);
    }
}
