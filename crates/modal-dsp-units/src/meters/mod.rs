// SPDX-License-Identifier: LGPL-3.0-or-later

//! Signal analysis.
//!
//! - **level**: block statistics and the detectors used by the dynamics processor
//! - **Yin**: fundamental-frequency estimation

pub mod level;
pub mod pitch;

pub use level::{LevelKind, summary_level};
pub use pitch::{PitchEstimate, Yin};
