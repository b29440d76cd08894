// SPDX-License-Identifier: LGPL-3.0-or-later

//! # modal-dsp-lib
//!
//! Low-level DSP primitives for the modal synthesis toolkit.
//!
//! This crate provides the plain-data types and buffer kernels used by
//! `modal-dsp-units` to build validated processors. It includes:
//!
//! - **Filters**: direct-form I biquad recurrence, fourth-order
//!   Linkwitz-Riley split
//! - **Math**: horizontal reductions and the linear fade-out envelope
//! - **Mixing**: weighted add-mix
//! - **Correlation**: squared-difference function and its cumulative-mean
//!   normalization
//!
//! ## Design
//!
//! Everything here works in `f64` and trusts its inputs: coefficients are
//! assumed to come from a validated source. Reduction and mixing kernels
//! use runtime SIMD dispatch via the `multiversion` crate. Recursive
//! kernels are plain loops; their loop-carried dependency leaves nothing
//! for the vectorizer.

pub mod correlation;
pub mod filters;
pub mod math;
pub mod mix;
pub mod types;
