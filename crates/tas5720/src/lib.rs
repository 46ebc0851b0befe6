//! TI TAS5720 mono Class-D amplifier driver
//!
//! Controls the amplifier over I²C and presents it to the audio framework as
//! a playback endpoint. The audio samples themselves travel over the serial
//! audio port and never pass through this crate.
//!
//! # Architecture
//!
//! ```text
//! Audio framework
//!     │  CodecDai (rate, format, mute)   PipelinePower (activate/deactivate)
//!     ▼
//! Tas5720 ──────────────────────────────► PeriodicTask ──► FaultMonitor
//!     │            (start / stop)             (every 200 ms while active)
//!     ▼
//! Mutex<RegisterMap>  (shared by framework callbacks and the monitor)
//!     │
//!     ▼
//! I2cRegmap (write-through cache, volatile FAULT / DEVICE_ID)
//! ```
//!
//! # Modules
//!
//! - [`driver`] - the device instance, probe/remove and framework ports
//! - [`fault`] - edge-triggered fault reporting and SDZ recovery pulse
//! - [`monitor`] - cancelable fixed-period task
//! - [`format`] - sample rate and serial format mapping
//! - [`power`] - power state and SDZ control
//! - [`controls`] - volume and analog gain mixer controls
//! - [`registers`] - register addresses and bitfields
//! - [`config`] - timing and identity constants
//!
//! # Features
//!
//! - `std`: `std::error::Error` impls
//! - `defmt`: log through defmt and derive `defmt::Format` (hardware builds)
//! - `tracing`: log through tracing (host builds)

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
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![allow(clippy::doc_markdown)] // register names in doc comments
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(async_fn_in_trait)] // Embassy no_std: single-threaded, Send bounds not needed

#[cfg(all(feature = "std", not(test)))]
extern crate std;

// Must come first: the logging macros are textually scoped.
#[macro_use]
mod fmt;

pub mod config;
pub mod controls;
pub mod driver;
pub mod error;
pub mod fault;
pub mod format;
pub mod monitor;
pub mod power;
pub mod registers;

pub use controls::{AnalogGain, StereoVolume, CONTROLS};
pub use driver::{Tas5720, DAI_CAPS};
pub use error::Error;
pub use fault::{FaultCheck, FaultMonitor, RecoveryPulse};
pub use monitor::{PeriodicTask, TaskState};
pub use power::PowerState;
pub use registers::{FaultStatus, REG_COUNT};
