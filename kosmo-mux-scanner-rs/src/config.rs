//! Live-tunable scan parameters.

/// Timing and filtering parameters for [`MuxScanner`](crate::MuxScanner).
///
/// Pins, the analog source and the channel count are fixed at construction;
/// these three values can be changed at any time through the scanner's
/// setters and take effect on the next tick.
///
/// [`ScannerConfig::default()`] reproduces the values the pots were tuned
/// with (5 ms, 3 counts, single sample).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScannerConfig {
    /// Minimum time between two scan steps, in milliseconds. Default: 5.
    pub scan_interval_ms: u16,
    /// Minimum change in raw counts that is reported. Default: 3.
    pub hysteresis: u16,
    /// Samples averaged per reading. Default: 1. Never below 1.
    pub samples_per_read: u8,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            scan_interval_ms: 5,
            hysteresis: 3,
            samples_per_read: 1,
        }
    }
}

impl ScannerConfig {
    /// Clamp out-of-range values instead of rejecting them.
    ///
    /// Zero samples-per-read becomes one.
    pub fn sanitized(self) -> Self {
        Self {
            samples_per_read: self.samples_per_read.max(1),
            ..self
        }
    }
}
