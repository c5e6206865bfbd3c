//! Hysteresis-filtered scanner for analog inputs behind an 8-way multiplexer.
//!
//! This crate drives a 4051-style analog multiplexer (three select lines,
//! one shared analog output) and turns the noisy potentiometer readings on
//! its inputs into a stream of *stable, significant* changes.
//!
//! # Architecture
//!
//! The crate is split into two layers:
//!
//! - **`driver`** (crate-private) — Low-level primitives that put an address
//!   on the select lines and take an averaged, polarity-corrected sample.
//! - **[`MuxScanner`]** (public) — Round-robin scan gate, per-channel
//!   hysteresis state and change notification.
//!
//! # Quick start
//!
//! ```ignore
//! use mux_scanner::{MuxScanner, ScannerConfig};
//!
//! // Selector pins are any `embedded-hal` output pins; the analog source
//! // implements `mux_scanner::AnalogSource`.
//! let mut scanner: MuxScanner<_, _, 8> =
//!     MuxScanner::with_config([s0, s1, s2], pots, ScannerConfig::default());
//!
//! scanner.set_change_handler(Some(|channel, value| {
//!     // forward to the synth engine
//! }));
//!
//! loop {
//!     scanner.tick(now_ms())?;
//! }
//! ```
//!
//! # Features
//!
//! - **`defmt`** — Enable [`defmt::Format`] implementations and structured
//!   logging of reported changes.
//! - **`task`** — Enable [`scan_task`], an Embassy loop that forwards changes
//!   into an `embassy_sync` channel.

#![no_std]

pub use analog::AnalogSource;
pub use channel::{Channel, ChannelChange};
pub use config::ScannerConfig;
pub use error::ScanError;
pub use mux::{select_levels, DEFAULT_FULL_SCALE, MUX_WIDTH, SELECT_LINES};
pub use scanner::{ChangeHandler, MuxScanner};

#[cfg(feature = "task")]
pub use scan_task::scan_task;

mod analog;
mod channel;
mod config;
mod driver;
mod error;
mod mux;
#[cfg(feature = "task")]
mod scan_task;
mod scanner;
