// SPDX-License-Identifier: LGPL-3.0-or-later

//! Modal synthesis: a fixed set of resonant modes rendered from an impulse.

pub mod bank;
pub mod voices;

pub use bank::ResonatorBank;
pub use voices::{VOICE_COUNT, VOICES, VoiceDescriptor};
