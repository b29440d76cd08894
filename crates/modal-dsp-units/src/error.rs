// SPDX-License-Identifier: LGPL-3.0-or-later

//! Error type shared by every validated processor in this crate.

use std::fmt;

use crate::filters::coeffs::{BandwidthKind, FilterResponse};

/// Errors returned when a parameter assignment is rejected.
///
/// Every error is raised synchronously at the point of assignment; a
/// rejected assignment leaves the previously committed state untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum DspError {
    /// A numeric input is outside its domain (non-positive, non-finite,
    /// at or above Nyquist, ...).
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    /// The bandwidth convention cannot be used with the filter response.
    BandwidthMismatch {
        response: FilterResponse,
        bandwidth: BandwidthKind,
    },
    /// An intermediate value of the coefficient math has no real result.
    NumericDomain { what: &'static str },
}

impl DspError {
    /// Build an [`DspError::InvalidParameter`].
    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value,
            reason,
        }
    }

    /// True for out-of-domain inputs, including bandwidth/response mismatches.
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter { .. } | Self::BandwidthMismatch { .. }
        )
    }

    /// True for failures of the coefficient math itself.
    pub fn is_numeric_domain(&self) -> bool {
        matches!(self, Self::NumericDomain { .. })
    }
}

impl fmt::Display for DspError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter {
                name,
                value,
                reason,
            } => write!(f, "invalid {name} ({value}): {reason}"),
            Self::BandwidthMismatch {
                response,
                bandwidth,
            } => write!(f, "{bandwidth:?} bandwidth cannot be used with a {response:?} response"),
            Self::NumericDomain { what } => write!(f, "numeric domain error: {what}"),
        }
    }
}

impl std::error::Error for DspError {}

/// Result alias for fallible operations in this crate.
pub type Result<T> = std::result::Result<T, DspError>;

/// Require `value` to be finite and strictly positive.
pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(DspError::invalid(name, value, "must be finite"));
    }
    if value <= 0.0 {
        return Err(DspError::invalid(name, value, "must be greater than zero"));
    }
    Ok(())
}

/// Require `0 < freq < sample_rate / 2`, with a valid sample rate.
pub(crate) fn ensure_below_nyquist(name: &'static str, freq: f64, sample_rate: f64) -> Result<()> {
    ensure_positive("sample rate", sample_rate)?;
    ensure_positive(name, freq)?;
    if freq >= sample_rate / 2.0 {
        return Err(DspError::invalid(name, freq, "must be below the Nyquist frequency"));
    }
    Ok(())
}
