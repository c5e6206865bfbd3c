use core::fmt;

/// Errors that can occur when decoding a [`RegisterSet`](super::RegisterSet).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterSetError {
    /// Fewer bytes than a full record (must be [`REGISTER_SET_LEN`](super::REGISTER_SET_LEN)).
    Truncated {
        /// Bytes a record needs.
        expected: usize,
        /// Bytes actually available.
        actual: usize,
    },
}

impl fmt::Display for RegisterSetError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RegisterSetError::Truncated { expected, actual } => {
                write!(f, "register set truncated: {} of {} bytes", actual, expected)
            }
        }
    }
}
