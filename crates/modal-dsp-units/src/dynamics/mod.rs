// SPDX-License-Identifier: LGPL-3.0-or-later

//! Dynamics processing driven by block level statistics.

pub mod processor;

pub use processor::{DynamicsProcessor, DynamicsSettings};
