//! Serial bus transaction primitive used by the driver.
//!
//! The driver never talks to an SPI peripheral directly; it goes through
//! [`SerialBus`], where every transfer carries a deadline. [`HalBus`] adapts
//! any `embedded-hal` 1.0 [`SpiBus`] to it.

use core::time::Duration;

use embedded_hal::spi::{Mode, Phase, Polarity, SpiBus};

/// SPI mode used by the ADS1246 (CPOL = 0, data captured on the first edge).
pub const MODE: Mode = Mode {
    phase: Phase::CaptureOnFirstTransition,
    polarity: Polarity::IdleLow,
};

/// Why a single bus transfer did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferError<E> {
    /// The transfer did not finish within its deadline.
    Timeout,
    /// The underlying bus reported an error.
    Bus(E),
}

/// Blocking, MSB-first, 8-bit clocked link with a mandatory timeout.
pub trait SerialBus {
    type Error: core::fmt::Debug;

    /// Clock `bytes` out to the device.
    fn transmit(&mut self, bytes: &[u8], timeout: Duration) -> Result<(), TransferError<Self::Error>>;

    /// Clock `buffer.len()` bytes in from the device. The bytes already in
    /// `buffer` go out while the reply comes in and are overwritten by it.
    fn receive(&mut self, buffer: &mut [u8], timeout: Duration) -> Result<(), TransferError<Self::Error>>;
}

/// Monotonic time source for deadline checks.
pub trait Clock {
    /// Time elapsed since an arbitrary, fixed origin.
    fn now(&self) -> Duration;
}

/// [`Clock`] backed by `std::time::Instant`.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    pub fn new() -> Self {
        StdClock { origin: std::time::Instant::now() }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// [`SerialBus`] over an `embedded-hal` SPI bus.
///
/// `embedded-hal` transfers cannot be aborted, so the deadline is checked
/// once the HAL call returns: a transfer that overran `timeout` is reported
/// as [`TransferError::Timeout`]. Platforms with abortable transfers should
/// implement [`SerialBus`] directly.
pub struct HalBus<SPI, C> {
    spi: SPI,
    clock: C,
}

impl<SPI, C> HalBus<SPI, C>
where
    SPI: SpiBus<u8>,
    C: Clock,
{
    pub fn new(spi: SPI, clock: C) -> Self {
        HalBus { spi, clock }
    }

    /// Give back the wrapped SPI bus and clock.
    pub fn release(self) -> (SPI, C) {
        (self.spi, self.clock)
    }

    fn timed<F>(&mut self, timeout: Duration, op: F) -> Result<(), TransferError<SPI::Error>>
    where
        F: FnOnce(&mut SPI) -> Result<(), SPI::Error>,
    {
        let started = self.clock.now();
        op(&mut self.spi).map_err(TransferError::Bus)?;
        let elapsed = self.clock.now().saturating_sub(started);
        if elapsed > timeout {
            log::warn!("SPI transfer took {:?}, deadline was {:?}", elapsed, timeout);
            return Err(TransferError::Timeout);
        }
        Ok(())
    }
}

impl<SPI, C> SerialBus for HalBus<SPI, C>
where
    SPI: SpiBus<u8>,
    C: Clock,
{
    type Error = SPI::Error;

    fn transmit(&mut self, bytes: &[u8], timeout: Duration) -> Result<(), TransferError<Self::Error>> {
        self.timed(timeout, |spi| {
            spi.write(bytes)?;
            spi.flush() // CS must not rise before the last bit is out
        })
    }

    fn receive(&mut self, buffer: &mut [u8], timeout: Duration) -> Result<(), TransferError<Self::Error>> {
        self.timed(timeout, |spi| {
            spi.transfer_in_place(buffer)?;
            spi.flush()
        })
    }
}
