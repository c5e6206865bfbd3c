//! Embassy scan loop.
//!
//! [`scan_task`] drives [`MuxScanner::tick`] from the Embassy timer and
//! forwards every reported change into an `embassy_sync` channel, so the
//! consumer can live in a different task.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Sender;
use embassy_time::{Duration, Instant, Timer};
use embedded_hal::digital::OutputPin;

use crate::analog::AnalogSource;
use crate::channel::ChannelChange;
use crate::scanner::MuxScanner;

/// Periodic scan loop.
///
/// This is a regular `async fn` — **not** an Embassy `#[task]`. Callers
/// should create a thin, concrete task wrapper that calls this function,
/// since Embassy tasks cannot be generic:
///
/// ```ignore
/// #[embassy_executor::task]
/// async fn pots_task(
///     scanner: MuxScanner<Output<'static>, PotSource<'static>, 8>,
///     changes: Sender<'static, CriticalSectionRawMutex, ChannelChange, 16>,
/// ) {
///     scan_task(scanner, Duration::from_millis(1), changes).await;
/// }
/// ```
///
/// `period` is how often the loop wakes up; the scanner's own interval
/// still decides whether a wake-up executes a scan step. The millisecond
/// clock handed to the scanner is the low 32 bits of
/// [`Instant::as_millis`] and wraps after ~49 days, which the scanner
/// tolerates.
///
/// A full channel drops the change (the consumer is too slow); a failed
/// scan step is logged and the loop continues.
pub async fn scan_task<S, A, M, const N: usize, const CAP: usize>(
    mut scanner: MuxScanner<S, A, N>,
    period: Duration,
    changes: Sender<'_, M, ChannelChange, CAP>,
) where
    S: OutputPin,
    A: AnalogSource,
    M: RawMutex,
{
    #[cfg(feature = "defmt")]
    defmt::info!("mux scan loop started ({} channels)", N);

    loop {
        Timer::after(period).await;

        let now = Instant::now().as_millis() as u32;
        match scanner.tick(now) {
            Ok(Some(change)) => {
                if changes.try_send(change).is_err() {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("change queue full, dropped input {}", change.channel);
                }
            }
            Ok(None) => {}
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("scan step failed at mux address {}", scanner.mux_index());
            }
        }
    }
}
