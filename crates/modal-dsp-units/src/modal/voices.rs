// SPDX-License-Identifier: LGPL-3.0-or-later

//! Partial table of the modal resonator.
//!
//! Each voice is one band-pass mode: its center frequency relative to the
//! fundamental, its half-power bandwidth, and its weight in the mix. The
//! ratios are the measured partials of the modelled object expressed over
//! a 220 Hz reference (`n / 220`).

/// Number of modes in a [`ResonatorBank`](super::bank::ResonatorBank).
pub const VOICE_COUNT: usize = 8;

/// One mode of the resonator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceDescriptor {
    /// Center frequency divided by the fundamental.
    pub ratio: f64,
    /// Half-power bandwidth in octaves.
    pub bandwidth_octaves: f64,
    /// Mixing weight of the mode's impulse response.
    pub amplitude: f64,
}

impl VoiceDescriptor {
    const fn new(ratio: f64, bandwidth_octaves: f64, amplitude: f64) -> Self {
        Self {
            ratio,
            bandwidth_octaves,
            amplitude,
        }
    }

    /// Center frequency of this mode for `fundamental_hz`.
    #[inline]
    pub fn frequency(&self, fundamental_hz: f64) -> f64 {
        self.ratio * fundamental_hz
    }
}

/// The voice table, in mixing order.
pub const VOICES: [VoiceDescriptor; VOICE_COUNT] = [
    VoiceDescriptor::new(0.4863636364, 3.0, 0.0885),
    VoiceDescriptor::new(0.9318181818, 1.0, 0.3393),
    VoiceDescriptor::new(1.0, 2.0, 0.5523),
    VoiceDescriptor::new(1.0136363636, 2.0, 0.4367),
    VoiceDescriptor::new(2.0045454545, 2.0, 0.9),
    VoiceDescriptor::new(3.0136363636, 2.0, 0.121),
    VoiceDescriptor::new(6.0090909091, 4.0, 0.2951),
    VoiceDescriptor::new(5.0181818182, 3.0, 0.0369),
];

/// Largest ratio in [`VOICES`]; it decides the highest playable fundamental.
pub fn max_ratio() -> f64 {
    VOICES.iter().map(|v| v.ratio).fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn ratios_are_partials_over_220() {
        let partials = [107.0, 205.0, 220.0, 223.0, 441.0, 663.0, 1322.0, 1104.0];
        for (v, p) in VOICES.iter().zip(partials) {
            assert_approx_eq!(f64, v.ratio, p / 220.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn table_is_positive() {
        for v in &VOICES {
            assert!(v.ratio > 0.0);
            assert!(v.bandwidth_octaves > 0.0);
            assert!(v.amplitude > 0.0);
        }
    }

    #[test]
    fn fundamental_voice_is_unit_ratio() {
        assert_eq!(VOICES[2].frequency(220.0), 220.0);
        assert_eq!(max_ratio(), VOICES[6].ratio);
    }
}
