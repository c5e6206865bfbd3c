//! Error types for the mux scanner.

use core::fmt;

/// Collaborator failures that abort a single scan step.
///
/// The scanner itself never fails; these only wrap errors from the select
/// pins (`PE`) or the analog source (`AE`). With HALs whose pins and ADC are
/// infallible both parameters are [`Infallible`](core::convert::Infallible)
/// and this error cannot occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanError<PE, AE> {
    /// Driving one of the S0–S2 select lines failed.
    Select(PE),

    /// Sampling the shared analog pin failed.
    Sample(AE),
}

impl<PE: fmt::Debug, AE: fmt::Debug> fmt::Display for ScanError<PE, AE> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScanError::Select(e) => write!(f, "select line error: {:?}", e),
            ScanError::Sample(e) => write!(f, "analog sample error: {:?}", e),
        }
    }
}

#[cfg(feature = "defmt")]
impl<PE: defmt::Format, AE: defmt::Format> defmt::Format for ScanError<PE, AE> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ScanError::Select(e) => defmt::write!(f, "select line error: {}", e),
            ScanError::Sample(e) => defmt::write!(f, "analog sample error: {}", e),
        }
    }
}
