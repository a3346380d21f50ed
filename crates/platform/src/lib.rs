//! Hardware Abstraction Layer (HAL) for codec accessory detection
//!
//! This crate expresses the collaborators of the jack-detection engine as
//! traits, so the engine can be developed and tested without the codec.
//!
//! # Architecture Layers
//!
//! ```text
//! Jack-detection engine (codec crate)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Register transport (I²C / SoundWire) + runtime power management
//! ```
//!
//! # Collaborators
//!
//! - [`RegisterPort`] - read / update-bits access to 32-bit codec registers
//! - [`PowerGate`] - scoped "resume and keep alive" around register access
//! - [`JackSink`] - receives the final jack status bitmask
//!
//! # Features
//!
//! - `std`: Enable the recording mocks in [`mocks`] (for testing)
//! - `defmt`: Enable defmt logging derives
//!
//! # Example
//!
//! ```no_run
//! use platform::{PortError, RegisterPort};
//!
//! async fn headset_bias_mode<R: RegisterPort>(regs: &mut R) -> Result<u32, PortError> {
//!     let val = regs.read(0x0002_B00C).await?;
//!     Ok(val & 0x3)
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
#![allow(clippy::must_use_candidate)] // hardware accessors: callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(async_fn_in_trait)] // Embassy no_std: single-threaded, Send bounds not needed

#[cfg(feature = "std")]
extern crate std;

pub mod jack;
pub mod jack_types;
pub mod mocks;
pub mod power;
pub mod register;

// Re-export main high-level traits
pub use jack::{JackSink, NullSink};
pub use power::{AlwaysOn, PowerGate};
pub use register::{I2cRegisterPort, PortError, RegisterPort};

// Re-export jack types
pub use jack_types::{ButtonKey, JackButton, JackStatus, Ohms};
