// src/common/hal_traits.rs

use chrono::NaiveDateTime;
use core::fmt::Debug;

/// Abstraction for the wall clock the station reads dates and times from.
///
/// Only the calendar part drives behaviour (day-boundary checks, date codes);
/// the time part is carried for journal rows and the live clock display.
pub trait Clock {
    /// Current local date and time.
    fn now(&self) -> NaiveDateTime;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}

/// Abstraction for the serial channel to the test fixture.
///
/// Every call must return promptly. Reads are zero-wait polls: when nothing is
/// pending the transport answers `Err(nb::Error::WouldBlock)` instead of waiting.
pub trait Transport {
    /// Associated error type for communication errors.
    type Error: Debug;

    /// Whether a channel is currently open.
    fn is_open(&self) -> bool;

    /// Opens the named channel (e.g. `COM3`, `/dev/ttyUSB0`), closing any open one first.
    fn open(&mut self, channel: &str) -> Result<(), Self::Error>;

    /// Number of received bytes waiting to be read.
    fn available_byte_count(&mut self) -> Result<usize, Self::Error>;

    /// Reads whatever is pending into `buf`, returning how many bytes were copied.
    ///
    /// Returns `Err(nb::Error::WouldBlock)` if no byte is available yet. Other errors
    /// are returned as `Err(nb::Error::Other(Self::Error))`.
    fn read_available(&mut self, buf: &mut [u8]) -> nb::Result<usize, Self::Error>;

    /// Writes all of `bytes` and flushes them out.
    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Closes the channel. Closing an already closed channel is a no-op.
    fn close(&mut self);
}
