// SPDX-License-Identifier: LGPL-3.0-or-later

//! # modal-dsp-units
//!
//! Validated audio processors built on top of [`modal_dsp_lib`].
//!
//! This crate provides:
//!
//! - **Filters**: RBJ cookbook biquad coefficient model and [`BiquadFilter`]
//! - **Modal**: eight-mode [`ResonatorBank`] rendering struck-object notes
//! - **Meters**: block level statistics and YIN pitch detection
//! - **Dynamics**: block-level compressor / limiter / expander
//! - **Utilities**: fourth-order Linkwitz-Riley crossover
//!
//! ## Errors
//!
//! Every parameter assignment is validated when it is made and reports a
//! [`DspError`]. A rejected assignment leaves the processor unchanged;
//! processing itself never fails.
//!
//! ## Logging
//!
//! Parameter commits are reported through [`tracing`] at `debug` level.
//! Nothing is logged from per-sample paths and no subscriber is installed.
//!
//! [`BiquadFilter`]: filters::BiquadFilter
//! [`ResonatorBank`]: modal::ResonatorBank
//! [`DspError`]: error::DspError

pub mod error;
pub mod units;

pub mod dynamics;
pub mod filters;
pub mod meters;
pub mod modal;
pub mod util;

pub use error::{DspError, Result};
