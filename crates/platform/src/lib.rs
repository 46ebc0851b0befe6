//! Hardware Abstraction Layer (HAL) for the amplifier driver workspace
//!
//! This crate provides the trait-based seams between an amplifier driver and
//! the two things it cannot own: the control bus and the audio framework.
//! Both sides can be replaced by mocks, so driver logic is tested on the host
//! without physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Audio framework (stream setup, pipeline power events, mixer controls)
//!         ↓  CodecDai / PipelinePower
//! Amplifier driver (tas5720 crate)
//!         ↓  RegisterMap
//! Platform HAL (this crate - register map over I²C)
//!         ↓  embedded_hal_async::i2c::I2c
//! Hardware Layer (Embassy HAL + PAC)
//! ```
//!
//! # Modules
//!
//! - [`regmap`] - byte-addressed register map with a volatile-aware cache
//! - [`audio`] - serial-audio format types and the framework-facing ports
//! - [`audio_types`] - control-surface newtypes (dB scales, ranges)
//! - [`mocks`] - in-memory register map for tests (`test` or `std`)
//!
//! # Features
//!
//! - `std`: Enable standard library support (error impls, mocks)
//! - `defmt`: Enable defmt::Format derives
//!
//! # Example
//!
//! ```no_run
//! use platform::RegisterMap;
//!
//! async fn wake<R: RegisterMap>(regs: &mut R) -> Result<(), R::Error> {
//!     regs.update_bits(0x01, 0x01, 0x01).await.map(|_| ())
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
// Pedantic lints suppressed for this hardware HAL crate:
#![allow(clippy::doc_markdown)] // hex addresses and register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors, callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(async_fn_in_trait)] // Embassy no_std: single-threaded, Send bounds not needed

#[cfg(all(feature = "std", not(test)))]
extern crate std;

pub mod audio;
pub mod audio_types;
pub mod mocks;
pub mod regmap;

// Re-export main high-level traits
pub use audio::{
    ClockInversion, ClockRole, CodecDai, DaiCapabilities, DaiFormat, PipelinePower, SampleFormat,
    SerialFormat, StreamParams,
};
pub use audio_types::{DbScale, OutOfRangeError};
pub use regmap::{I2cRegmap, RegisterMap, RegmapConfig, RegmapError};
