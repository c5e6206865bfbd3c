//! The analog source behind the multiplexer's common pin.

use crate::mux::DEFAULT_FULL_SCALE;

/// A single-pin analog input that the multiplexer is wired to.
///
/// `embedded-hal` 1.0 has no ADC trait, so HAL adapters implement this
/// directly. Implementations must return raw samples in
/// `0..=Self::FULL_SCALE`; larger values are saturated by the scanner.
///
/// # Example
///
/// ```
/// use core::convert::Infallible;
/// use mux_scanner::AnalogSource;
///
/// /// A 12-bit converter that always reads mid-scale.
/// struct MidScale;
///
/// impl AnalogSource for MidScale {
///     type Error = Infallible;
///     const FULL_SCALE: u16 = 4095;
///
///     fn read_raw(&mut self) -> Result<u16, Infallible> {
///         Ok(2048)
///     }
/// }
/// ```
pub trait AnalogSource {
    /// Error reported by the underlying converter.
    type Error;

    /// Largest raw sample the converter produces. Default: 1023 (10-bit).
    const FULL_SCALE: u16 = DEFAULT_FULL_SCALE;

    /// Take one raw sample from the analog pin.
    fn read_raw(&mut self) -> Result<u16, Self::Error>;
}

impl<T> AnalogSource for &mut T
where
    T: AnalogSource,
{
    type Error = T::Error;
    const FULL_SCALE: u16 = T::FULL_SCALE;

    fn read_raw(&mut self) -> Result<u16, Self::Error> {
        T::read_raw(self)
    }
}
