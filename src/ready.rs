//! Waiting for the data-ready (DRDY) line.

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error as _, InputPin};

use crate::error::ReadyError;

/// Blocks until the ADC signals a fresh conversion.
pub trait WaitReady {
    fn wait_ready(&mut self, timeout: Duration) -> Result<(), ReadyError>;
}

/// Busy-polls an active-low, level-sensitive DRDY input.
pub struct PollingReady<PIN, D> {
    pin: PIN,
    delay: D,
    interval: Duration,
}

impl<PIN, D> PollingReady<PIN, D>
where
    PIN: InputPin,
    D: DelayNs,
{
    /// `interval` is the pause between two reads of the pin.
    pub fn new(pin: PIN, delay: D, interval: Duration) -> Self {
        PollingReady { pin, delay, interval }
    }

    pub fn release(self) -> (PIN, D) {
        (self.pin, self.delay)
    }
}

impl<PIN, D> WaitReady for PollingReady<PIN, D>
where
    PIN: InputPin,
    D: DelayNs,
{
    fn wait_ready(&mut self, timeout: Duration) -> Result<(), ReadyError> {
        let step = u32::try_from(self.interval.as_micros()).unwrap_or(u32::MAX).max(1);
        let mut waited = Duration::ZERO;
        loop {
            if self.pin.is_low().map_err(|e| ReadyError::Pin(e.kind()))? {
                return Ok(());
            }
            if waited >= timeout {
                return Err(ReadyError::Timeout);
            }
            self.delay.delay_us(step);
            waited += Duration::from_micros(step as u64);
        }
    }
}
