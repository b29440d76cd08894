// SPDX-License-Identifier: LGPL-3.0-or-later

//! Modal resonator: eight band-pass modes excited by one impulse.
//!
//! A note retunes every mode to `ratio * fundamental`, clears its history,
//! runs a unit impulse through it, and mixes the impulse responses by the
//! voice amplitudes in table order. A linear fade-out closes the note so
//! that the last sample is exactly zero.

use modal_dsp_lib::math::scalar::linear_fade_out;
use modal_dsp_lib::mix::mix_add;
use tracing::debug;

use super::voices::{VOICE_COUNT, VOICES, VoiceDescriptor, max_ratio};
use crate::error::{DspError, Result, ensure_positive};
use crate::filters::coeffs::{BandwidthSpec, FilterParameters, FilterResponse};
use crate::filters::filter::BiquadFilter;

/// Bank of [`VOICE_COUNT`] band-pass filters tuned to a fixed partial table.
///
/// The bank is the only owner of its filters; they can be inspected through
/// [`filter`](ResonatorBank::filter) but only retuned by playing a note.
///
/// # Examples
///
/// ```
/// use modal_dsp_units::modal::bank::ResonatorBank;
///
/// let mut bank = ResonatorBank::new(44100.0).unwrap();
/// let note = bank.play_note(220.0, 512).unwrap();
/// assert_eq!(note.len(), 512);
/// assert_eq!(note[511], 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct ResonatorBank {
    sample_rate_hz: f64,
    fundamental_hz: Option<f64>,
    filters: Vec<BiquadFilter>,
    impulse: Vec<f64>,
    response: Vec<f64>,
}

impl ResonatorBank {
    /// Create a bank for `sample_rate_hz`.
    ///
    /// Every mode starts at a quarter of the sample rate and stays inert
    /// until the first note.
    pub fn new(sample_rate_hz: f64) -> Result<Self> {
        ensure_positive("sample rate", sample_rate_hz)?;

        let placeholder = sample_rate_hz / 4.0;
        let filters = VOICES
            .iter()
            .map(|voice| {
                BiquadFilter::new(
                    FilterResponse::BandPass,
                    voice_parameters(voice, sample_rate_hz, placeholder),
                )
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            sample_rate_hz,
            fundamental_hz: None,
            filters,
            impulse: Vec::new(),
            response: Vec::new(),
        })
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate_hz
    }

    /// Fundamental of the last note played, if any.
    pub fn fundamental(&self) -> Option<f64> {
        self.fundamental_hz
    }

    pub fn voices(&self) -> &'static [VoiceDescriptor; VOICE_COUNT] {
        &VOICES
    }

    /// Read access to the filter of voice `index`.
    pub fn filter(&self, index: usize) -> Option<&BiquadFilter> {
        self.filters.get(index)
    }

    /// Fundamentals must stay below this so every partial is under Nyquist.
    ///
    /// This is an upper bound, not a guarantee. Just below it the top
    /// partial sits so close to Nyquist that its octave bandwidth can no
    /// longer be expressed, and `play_note` fails with
    /// [`DspError::NumericDomain`].
    pub fn max_fundamental(&self) -> f64 {
        self.sample_rate_hz / 2.0 / max_ratio()
    }

    /// Clear the history of every mode.
    pub fn reset(&mut self) {
        for filter in &mut self.filters {
            filter.reset();
        }
    }

    /// Render a note of `n_frames` samples.
    pub fn play_note(&mut self, fundamental_hz: f64, n_frames: usize) -> Result<Vec<f64>> {
        if n_frames == 0 {
            return Err(DspError::invalid(
                "frame count",
                0.0,
                "must be greater than zero",
            ));
        }
        let mut out = vec![0.0; n_frames];
        self.play_note_into(fundamental_hz, &mut out)?;
        Ok(out)
    }

    /// Render a note into `out`, overwriting its contents.
    ///
    /// All eight modes are validated before any of them is retuned, so an
    /// error leaves the bank exactly as it was. Scratch buffers are reused
    /// across calls; no allocation happens once they are large enough.
    pub fn play_note_into(&mut self, fundamental_hz: f64, out: &mut [f64]) -> Result<()> {
        let n = out.len();
        if n == 0 {
            return Err(DspError::invalid(
                "frame count",
                0.0,
                "must be greater than zero",
            ));
        }
        ensure_positive("fundamental", fundamental_hz)?;

        let params = VOICES.map(|voice| {
            voice_parameters(
                &voice,
                self.sample_rate_hz,
                voice.frequency(fundamental_hz),
            )
        });
        for p in &params {
            p.validate(FilterResponse::BandPass)?;
        }

        for (filter, p) in self.filters.iter_mut().zip(params) {
            filter.set_parameters(p, true)?;
            filter.reset();
        }
        self.fundamental_hz = Some(fundamental_hz);
        debug!(fundamental_hz, n_frames = n, "resonator retuned");

        self.impulse.clear();
        self.impulse.resize(n, 0.0);
        self.impulse[0] = 1.0;
        self.response.resize(n, 0.0);

        out.fill(0.0);
        for (filter, voice) in self.filters.iter_mut().zip(VOICES.iter()) {
            filter.process(&mut self.response[..n], &self.impulse[..n]);
            mix_add(out, &self.response[..n], voice.amplitude);
        }

        linear_fade_out(out);
        Ok(())
    }
}

fn voice_parameters(voice: &VoiceDescriptor, sample_rate_hz: f64, freq: f64) -> FilterParameters {
    FilterParameters::new(
        sample_rate_hz,
        freq,
        BandwidthSpec::HalfPowerBandwidthOctaves(voice.bandwidth_octaves),
    )
}
