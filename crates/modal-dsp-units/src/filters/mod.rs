// SPDX-License-Identifier: LGPL-3.0-or-later

//! Biquad coefficient model and the validated filter built on it.
//!
//! Coefficients follow the RBJ Audio EQ Cookbook in canonical,
//! un-normalized form.

pub mod coeffs;
pub mod filter;

pub use coeffs::{BandwidthKind, BandwidthSpec, FilterParameters, FilterResponse};
pub use filter::{BiquadFilter, ParameterEdit};
