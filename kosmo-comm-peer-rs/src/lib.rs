//! Register block shared with a parent controller over I2C.
//!
//! See [`comm_peer`] for the protocol and the [`BusRegisterPeer`] state
//! machine.
//!
//! # Features
//!
//! - **`defmt`** — [`defmt::Format`] on public types and structured logging
//!   of protocol transitions.
//!
//! [`BusRegisterPeer`]: comm_peer::BusRegisterPeer

#![no_std]

pub mod comm_peer;
