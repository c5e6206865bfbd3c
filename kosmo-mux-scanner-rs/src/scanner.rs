//! Round-robin scanner over the multiplexer inputs.
//!
//! [`MuxScanner`] wraps the low-level mux driver with the scan-interval
//! gate, per-channel hysteresis state and change notification.

use embedded_hal::digital::OutputPin;

use crate::analog::AnalogSource;
use crate::channel::{Channel, ChannelChange};
use crate::config::ScannerConfig;
use crate::driver::MuxDriver;
use crate::error::ScanError;
use crate::mux::{MUX_WIDTH, SELECT_LINES};

/// Handler invoked synchronously from [`MuxScanner::tick`] with
/// `(channel, value)` for every reported change.
pub type ChangeHandler = fn(usize, u16);

/// Scanner for up to eight analog inputs behind a 3-bit multiplexer.
///
/// Each executed [`tick`](Self::tick) selects one multiplexer input, samples
/// it, and reports the reading if it is the channel's first or if it moved
/// at least `hysteresis` counts away from the last reported value. The
/// address then advances to the next input, wrapping after 7.
///
/// `N` is the number of tracked channels. Addresses `N..8` are still
/// visited (the hardware counts through them) but never stored or
/// reported. `N > 8` fails to compile.
///
/// # Example
///
/// ```ignore
/// use mux_scanner::MuxScanner;
///
/// // Four pots on inputs 0–3 of the multiplexer.
/// let mut scanner: MuxScanner<_, _, 4> = MuxScanner::new([s0, s1, s2], adc_pin);
/// scanner.set_hysteresis(4);
///
/// loop {
///     if let Some(change) = scanner.tick(now_ms())? {
///         set_level(change.channel, change.value);
///     }
/// }
/// ```
pub struct MuxScanner<S, A, const N: usize> {
    driver: MuxDriver<S, A>,
    channels: [Channel; N],
    config: ScannerConfig,
    /// Address selected by the next executed scan step (0–7).
    mux: u8,
    /// `now` of the last executed scan step.
    last_scan_ms: u32,
    on_change: Option<ChangeHandler>,
}

impl<S, A, const N: usize> MuxScanner<S, A, N> {
    const FITS_MUX: () = assert!(
        N <= MUX_WIDTH,
        "channel count exceeds the 8-way multiplexer"
    );
}

impl<S, A, const N: usize> MuxScanner<S, A, N>
where
    S: OutputPin,
    A: AnalogSource,
{
    /// Create a scanner with [`ScannerConfig::default()`].
    ///
    /// # Arguments
    /// * `select` — output pins wired to S0, S1 and S2, in that order
    /// * `source` — analog input wired to the multiplexer's common pin
    pub fn new(select: [S; SELECT_LINES], source: A) -> Self {
        Self::with_config(select, source, ScannerConfig::default())
    }

    /// Create a scanner with explicit timing and filtering parameters.
    ///
    /// Out-of-range values are clamped (see [`ScannerConfig::sanitized`]).
    pub fn with_config(select: [S; SELECT_LINES], source: A, config: ScannerConfig) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::FITS_MUX;

        Self {
            driver: MuxDriver::new(select, source),
            channels: [Channel::new(); N],
            config: config.sanitized(),
            mux: 0,
            last_scan_ms: 0,
            on_change: None,
        }
    }

    // -----------------------------------------------------------------------
    // Scanning
    // -----------------------------------------------------------------------

    /// Run one scan step if the scan interval has elapsed.
    ///
    /// `now` is a free-running millisecond counter. Elapsed time is computed
    /// with wrapping subtraction, so the counter may overflow.
    ///
    /// Returns the reported change, if any. The registered
    /// [`ChangeHandler`] has already been called with it.
    ///
    /// Within the interval this is a full no-op: no pin writes, no
    /// sampling, no callback.
    ///
    /// # Errors
    /// * [`ScanError::Select`] if a select line could not be driven
    /// * [`ScanError::Sample`] if the analog source failed
    ///
    /// A failed step still consumes the interval, but leaves the channel
    /// state and the multiplexer address untouched; the same input is
    /// retried on the next step.
    pub fn tick(
        &mut self,
        now: u32,
    ) -> Result<Option<ChannelChange>, ScanError<S::Error, A::Error>> {
        if now.wrapping_sub(self.last_scan_ms) < u32::from(self.config.scan_interval_ms) {
            return Ok(None);
        }
        self.last_scan_ms = now;

        let address = self.mux;
        self.driver.select(address).map_err(ScanError::Select)?;
        let value = self
            .driver
            .read_inverted(self.config.samples_per_read)
            .map_err(ScanError::Sample)?;

        self.mux = (address + 1) % MUX_WIDTH as u8;

        // Addresses beyond the tracked channels fall through here.
        let channel = usize::from(address);
        let hysteresis = self.config.hysteresis;
        let change = self
            .channels
            .get_mut(channel)
            .and_then(|state| state.observe(value, hysteresis))
            .map(|value| ChannelChange { channel, value });

        if let Some(change) = change {
            #[cfg(feature = "defmt")]
            defmt::debug!("mux input {}: {}", change.channel, change.value);

            if let Some(handler) = self.on_change {
                handler(change.channel, change.value);
            }
        }

        Ok(change)
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    /// Set the minimum time between two scan steps.
    pub fn set_scan_interval(&mut self, ms: u16) {
        self.config.scan_interval_ms = ms;
    }

    /// Set the minimum change (in raw counts) that is reported.
    pub fn set_hysteresis(&mut self, counts: u16) {
        self.config.hysteresis = counts;
    }

    /// Set how many samples are averaged per reading. `0` is treated as `1`.
    pub fn set_samples_per_read(&mut self, samples: u8) {
        self.config.samples_per_read = samples.max(1);
    }

    /// Register the change handler, replacing any previous one.
    ///
    /// With `None`, changes are still tracked and returned from
    /// [`tick`](Self::tick) but nobody is called.
    pub fn set_change_handler(&mut self, handler: Option<ChangeHandler>) {
        self.on_change = handler;
    }

    /// Current timing and filtering parameters.
    pub fn config(&self) -> ScannerConfig {
        self.config
    }

    // -----------------------------------------------------------------------
    // Inspection
    // -----------------------------------------------------------------------

    /// Address the next executed scan step will select (0–7).
    pub fn mux_index(&self) -> u8 {
        self.mux
    }

    /// Last reported value of `channel`, or `None` if it has not reported
    /// yet or is not tracked.
    pub fn stable_value(&self, channel: usize) -> Option<u16> {
        self.channels.get(channel).and_then(Channel::stable_value)
    }

    /// Number of tracked channels (`N`).
    pub const fn channel_count(&self) -> usize {
        N
    }

    /// Consume the scanner and give back the select pins and analog source.
    pub fn release(self) -> ([S; SELECT_LINES], A) {
        self.driver.release()
    }
}
