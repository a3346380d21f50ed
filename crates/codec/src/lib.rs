//! Headset / headphone accessory detection for mixed-signal audio codecs
//!
//! The engine watches tip and ring sense edges, classifies whatever was
//! plugged in (4-pole headset in either pinout, headphone, line-out, passive
//! extension, optical adapter), decodes inline-remote buttons from a
//! comb-filter impedance reading and reports the result as a
//! [`platform::JackStatus`] bitmask.
//!
//! # Architecture
//!
//! ```text
//! interrupt glue ──► JackDetect::handle_irq ──► sense / button handlers
//!       │                                         │
//!       └──► Completions (static) ◄── waits ──────┤
//!                                                 ▼
//!                            RegisterPort · PowerGate · JackSink (platform)
//! ```
//!
//! # Features
//!
//! - `std`: `std::error::Error` impls
//! - `defmt`: log through defmt, derive `defmt::Format`
//! - `tracing`: log through `tracing` (host builds)
//!
//! # Example
//!
//! ```no_run
//! use codec::{Completions, DetectionConfig, JackDetect};
//! use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
//! use platform::{AlwaysOn, NullSink, RegisterPort};
//!
//! static JACK_IRQS: Completions<CriticalSectionRawMutex> = Completions::new();
//!
//! async fn start<R: RegisterPort>(regs: R) -> Result<(), codec::DetectError> {
//!     let engine = JackDetect::new(regs, AlwaysOn, NullSink, &JACK_IRQS, DetectionConfig::default())?;
//!     engine.init().await?;
//!     engine.run().await
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unreachable)]
#![deny(unused_must_use)]
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::print_stdout)]
#![allow(clippy::doc_markdown)] // register and field names in doc comments
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(async_fn_in_trait)]

#[cfg(feature = "std")]
extern crate std;

// Must come first: the logging macros are textually scoped.
#[macro_use]
mod fmt;

pub mod completion;
pub mod config;
pub mod error;
pub mod jack;
pub mod registers;
pub mod work;

pub use completion::{Completion, Completions};
pub use config::{
    button_table, BiasRamp, BiasSenseTrip, ButtonThreshold, Debounce, DetectTime,
    DetectionConfig, EncodedConfig, SenseLine,
};
pub use error::{DetectError, WaitStage};
pub use jack::{
    comb_to_ohms, DetectionState, HsdetType, IrqOutcome, IrqSource, JackDetect, JackOverride,
    LoadResult, RawCategory,
};
pub use work::DelayedWork;
