//! Multiplexer addressing constants.
//!
//! A 4051-style multiplexer routes one of eight inputs to its common pin.
//! The input is selected by a 3-bit address driven onto the S0–S2 lines:
//! bit 0 → S0, bit 1 → S1, bit 2 → S2.

// ---------------------------------------------------------------------------
// Addressing
// ---------------------------------------------------------------------------

/// Number of select lines on the multiplexer.
pub const SELECT_LINES: usize = 3;

/// Number of addressable multiplexer inputs (`2^SELECT_LINES`).
///
/// The scan index always cycles through all of them, even when fewer
/// channels are tracked.
pub const MUX_WIDTH: usize = 1 << SELECT_LINES;

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

/// Full-scale raw reading of a 10-bit ADC.
///
/// Readings are inverted against this value because the pots are wired
/// with reversed polarity.
pub const DEFAULT_FULL_SCALE: u16 = 1023;

/// Levels for the S0, S1 and S2 lines that select `address`.
///
/// Only the low three bits of `address` are used.
///
/// # Example
/// ```
/// use mux_scanner::select_levels;
///
/// assert_eq!(select_levels(5), [true, false, true]);
/// assert_eq!(select_levels(8), [false, false, false]);
/// ```
pub fn select_levels(address: u8) -> [bool; SELECT_LINES] {
    core::array::from_fn(|bit| (address >> bit) & 1 == 1)
}
