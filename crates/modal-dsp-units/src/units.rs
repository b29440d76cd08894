// SPDX-License-Identifier: LGPL-3.0-or-later

//! Unit conversion functions.
//!
//! Gain/decibel conversions, the shelving amplitude used by the
//! coefficient model, and time conversions used by the dynamics setters.

/// Convert milliseconds to sample count.
///
/// # Arguments
/// * `sr` - Sample rate in Hz
/// * `time` - Time in milliseconds
///
/// # Returns
/// Number of samples
#[inline]
pub fn millis_to_samples(sr: f64, time: f64) -> f64 {
    time * sr / 1000.0
}

/// Convert sample count to milliseconds.
#[inline]
pub fn samples_to_millis(sr: f64, samples: f64) -> f64 {
    samples * 1000.0 / sr
}

/// Convert decibels to linear gain (amplitude).
///
/// # Arguments
/// * `db` - Value in decibels
///
/// # Returns
/// Linear amplitude, `10^(db/20)`
#[inline]
pub fn db_to_gain(db: f64) -> f64 {
    10.0f64.powf(db / 20.0)
}

/// Convert linear gain (amplitude) to decibels.
///
/// Returns negative infinity for a zero gain.
#[inline]
pub fn gain_to_db(gain: f64) -> f64 {
    20.0 * gain.log10()
}

/// Square root of the linear gain for `db`, `10^(db/40)`.
///
/// This is the amplitude `A` of the shelving cookbook forms: the shelf
/// reaches `A^2` on its boosted side and `1` on the other.
#[inline]
pub fn shelf_amplitude(db: f64) -> f64 {
    10.0f64.powf(db / 40.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_millis_samples_conversion() {
        assert_approx_eq!(f64, millis_to_samples(48000.0, 10.0), 480.0, ulps = 2);
        assert_approx_eq!(f64, samples_to_millis(48000.0, 480.0), 10.0, ulps = 2);
        assert_eq!(millis_to_samples(44100.0, 0.0), 0.0);
    }

    #[test]
    fn test_db_gain_conversion() {
        assert_eq!(db_to_gain(0.0), 1.0);
        assert_approx_eq!(f64, db_to_gain(20.0), 10.0, ulps = 4);
        assert_approx_eq!(f64, db_to_gain(-6.0), 0.501_187_233_627_272_3, epsilon = 1e-12);
        assert_approx_eq!(f64, gain_to_db(10.0), 20.0, ulps = 4);
        assert_eq!(gain_to_db(0.0), f64::NEG_INFINITY);
    }

    #[test]
    fn test_shelf_amplitude_squares_to_gain() {
        for db in [-24.0, -3.0, 0.0, 6.0, 18.0] {
            let a = shelf_amplitude(db);
            assert_approx_eq!(f64, a * a, db_to_gain(db), epsilon = 1e-12);
        }
    }
}
