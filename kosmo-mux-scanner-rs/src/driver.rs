//! Low-level multiplexer driver.
//!
//! Owns the three select lines and the analog source, and implements the
//! two primitives a scan step needs: putting an address on S0–S2 and taking
//! an averaged, polarity-corrected reading.
//!
//! This module is crate-private — consumers interact with [`MuxScanner`]
//! in `scanner.rs` instead.
//!
//! [`MuxScanner`]: crate::MuxScanner

use embedded_hal::digital::{OutputPin, PinState};

use crate::analog::AnalogSource;
use crate::mux::{select_levels, SELECT_LINES};

/// Select lines plus the shared analog pin of one multiplexer.
pub(crate) struct MuxDriver<S, A> {
    select: [S; SELECT_LINES],
    source: A,
}

impl<S, A> MuxDriver<S, A>
where
    S: OutputPin,
    A: AnalogSource,
{
    /// Create a new driver.
    ///
    /// # Arguments
    /// * `select` — output pins wired to S0, S1 and S2, in that order
    /// * `source` — analog input wired to the multiplexer's common pin
    pub fn new(select: [S; SELECT_LINES], source: A) -> Self {
        Self { select, source }
    }

    /// Drive the select lines to `address` (low three bits only).
    pub fn select(&mut self, address: u8) -> Result<(), S::Error> {
        for (pin, level) in self.select.iter_mut().zip(select_levels(address)) {
            pin.set_state(PinState::from(level))?;
        }
        Ok(())
    }

    /// Read the selected input as a logical magnitude.
    ///
    /// Takes `samples` raw readings (at least one), averages them with
    /// integer truncation and inverts the result against
    /// [`AnalogSource::FULL_SCALE`]. The pots report reversed polarity, so
    /// this turns "fully clockwise" into the largest value.
    pub fn read_inverted(&mut self, samples: u8) -> Result<u16, A::Error> {
        let samples = samples.max(1);

        let mut sum: u32 = 0;
        for _ in 0..samples {
            sum += u32::from(self.source.read_raw()?);
        }

        // The average of u16 samples always fits in a u16.
        let average = (sum / u32::from(samples)) as u16;
        Ok(A::FULL_SCALE.saturating_sub(average))
    }

    /// Give back the pins and the analog source.
    pub fn release(self) -> ([S; SELECT_LINES], A) {
        (self.select, self.source)
    }
}
