// SPDX-License-Identifier: LGPL-3.0-or-later

//! Utility processing modules.
//!
//! - **LinkwitzRiley**: fourth-order two-band crossover

pub mod crossover;

pub use crossover::LinkwitzRiley;
