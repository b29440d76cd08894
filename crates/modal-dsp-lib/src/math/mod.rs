// SPDX-License-Identifier: LGPL-3.0-or-later

//! Mathematical operations on float buffers.
//!
//! - [`scalar`]: per-element scalar math operations
//! - [`horizontal`]: horizontal reductions (sum, min, max, etc.)

pub mod horizontal;
pub mod scalar;
