//! Transactional register block served to an I2C controller.
//!
//! This module provides [`BusRegisterPeer`], the responder side of the
//! sampler's programming protocol. The parent controller writes short ASCII
//! commands (and, inside a set transaction, one binary [`RegisterSet`]) and
//! reads back the committed register set.
//!
//! # Protocol
//!
//! ```text
//! controller write            peer state after
//! ──────────────────────────  ─────────────────────────────────────────
//! "prg"                       ProgrammingOpen
//! "set"                       Setting  (next write carries the payload)
//! <11-byte RegisterSet>       Setting  (payload stored in staging)
//! "endset"                    Idle     (staging → active, atomically)
//! "end"                       Idle
//! "get"                       unchanged, arms the read path
//!
//! controller read             response
//! ──────────────────────────  ─────────────────────────────────────────
//! after "get"                 [1, <active RegisterSet>]
//! otherwise                   [0]
//! ```
//!
//! The payload may also share a write with the following command
//! (`<payload>"endset"`): the record is consumed first and the remaining
//! bytes form the next command.
//!
//! # Concurrency
//!
//! The transport calls [`BusRegisterPeer::on_data_received`] and
//! [`BusRegisterPeer::on_read_requested`] from its interrupt handlers. All
//! peer state lives behind a [`critical_section::Mutex`], so the read path
//! sees the active set either entirely before or entirely after a commit.
//! The peer is `const`-constructible and meant to live in a `static`.
//!
//! # `no_std` Compatibility
//!
//! No heap allocation. The command token is a bounded [`heapless::Vec`]
//! of [`TOKEN_CAPACITY`] bytes. The optional `defmt` feature enables
//! structured logging for embedded targets.

mod error;
mod peer;
mod register_set;
mod transaction;
mod transport;

pub use error::RegisterSetError;
pub use peer::BusRegisterPeer;
pub use register_set::{RegisterSet, MIX_CHANNELS, REGISTER_SET_LEN};
pub use transaction::{CommandToken, TransactionState, TOKEN_CAPACITY};
pub use transport::{BusTransport, FrameTransport, RESPONSE_LEN};

/// 7-bit bus address the peer answers on.
pub const DEFAULT_ADDRESS: u8 = 10;

/// Bus clock requested when attaching (fast mode).
pub const BUS_CLOCK_HZ: u32 = 400_000;

/// Read-response status: no `"get"` pending, nothing follows.
pub const STATUS_NOT_READY: u8 = 0;

/// Read-response status: the active [`RegisterSet`] follows.
pub const STATUS_READY: u8 = 1;
