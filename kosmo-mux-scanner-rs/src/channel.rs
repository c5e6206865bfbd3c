//! Per-channel stability state.

/// A change reported by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelChange {
    /// Multiplexer input the value was read from (0-based).
    pub channel: usize,
    /// New stable value, already averaged and polarity-corrected.
    pub value: u16,
}

/// Stability state of one multiplexer input.
///
/// `None` until the first reading is reported. After that it holds the last
/// reported value, which stays authoritative until a reading moves at least
/// `hysteresis` counts away from it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Channel {
    stable: Option<u16>,
}

impl Channel {
    /// A channel that has never reported.
    pub const fn new() -> Self {
        Self { stable: None }
    }

    /// The last reported value, or `None` if nothing was reported yet.
    pub fn stable_value(&self) -> Option<u16> {
        self.stable
    }

    /// Returns `true` once the channel has reported at least once.
    pub fn has_stable(&self) -> bool {
        self.stable.is_some()
    }

    /// Feed a new reading through the hysteresis filter.
    ///
    /// Returns `Some(value)` when the reading must be reported: always for
    /// the first reading, afterwards only if `|value - stable| >= hysteresis`.
    /// The stable value is updated exactly when `Some` is returned.
    pub fn observe(&mut self, value: u16, hysteresis: u16) -> Option<u16> {
        match self.stable {
            Some(stable) if value.abs_diff(stable) < hysteresis => None,
            _ => {
                self.stable = Some(value);
                Some(value)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_channel_has_no_stable_value() {
        let channel = Channel::new();
        assert!(!channel.has_stable());
        assert_eq!(channel.stable_value(), None);
    }

    #[test]
    fn first_reading_is_always_reported() {
        let mut channel = Channel::new();
        assert_eq!(channel.observe(42, u16::MAX), Some(42));
        assert_eq!(channel.stable_value(), Some(42));
    }

    #[test]
    fn jitter_below_threshold_is_suppressed() {
        let mut channel = Channel::new();
        channel.observe(500, 3);

        assert_eq!(channel.observe(502, 3), None);
        assert_eq!(channel.observe(498, 3), None);
        assert_eq!(channel.stable_value(), Some(500));
    }

    #[test]
    fn change_at_threshold_is_reported_in_both_directions() {
        let mut channel = Channel::new();
        channel.observe(500, 3);

        assert_eq!(channel.observe(503, 3), Some(503));
        assert_eq!(channel.observe(500, 3), Some(500));
    }

    #[test]
    fn zero_hysteresis_reports_every_reading() {
        let mut channel = Channel::new();
        channel.observe(7, 0);
        assert_eq!(channel.observe(7, 0), Some(7));
    }

    #[test]
    fn drift_is_measured_against_last_reported_value() {
        let mut channel = Channel::new();
        channel.observe(500, 3);

        // Creeping up one count at a time never reaches the threshold
        // relative to the previous reading, but does relative to 500.
        assert_eq!(channel.observe(501, 3), None);
        assert_eq!(channel.observe(502, 3), None);
        assert_eq!(channel.observe(503, 3), Some(503));
    }
}
