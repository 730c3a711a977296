use core::fmt;

use embedded_hal::digital::ErrorKind as PinErrorKind;

use crate::bus::TransferError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Everything the ADS1246 driver can report back.
pub enum Error<E> {
    /// Transferring data on the serial bus failed
    Bus(E),
    /// A bus transfer did not finish within the configured timeout
    Timeout,
    /// Setting the chip select or reset line failed
    Pin(PinErrorKind),
    /// Register access attempted while the device is streaming, or before
    /// SDATAC followed power-up or reset
    NotIdle,
    /// Sample read attempted while the device is not streaming
    NotStreaming,
    /// Register address does not fit the 4-bit address field
    InvalidRegister(u8),
    /// A register read back a different value than was written
    VerifyMismatch { address: u8, written: u8, read: u8 },
}

impl<E> From<TransferError<E>> for Error<E> {
    fn from(e: TransferError<E>) -> Self {
        match e {
            TransferError::Timeout => Error::Timeout,
            TransferError::Bus(e) => Error::Bus(e),
        }
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Bus(e) => write!(f, "SPI transfer failed: {:?}", e),
            Error::Timeout => f.write_str("SPI transfer timed out"),
            Error::Pin(kind) => write!(f, "GPIO line could not be driven: {:?}", kind),
            Error::NotIdle => f.write_str("register access while streaming (send SDATAC first)"),
            Error::NotStreaming => f.write_str("sample read while idle (send RDATAC first)"),
            Error::InvalidRegister(address) => write!(f, "register address 0x{:02X} out of range", address),
            Error::VerifyMismatch { address, written, read } => write!(
                f,
                "register 0x{:02X} reads back 0x{:02X}, wrote 0x{:02X}",
                address, read, written
            ),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for Error<E> {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Failure while waiting for the data-ready line.
pub enum ReadyError {
    /// No conversion became ready within the timeout
    Timeout,
    /// Reading the ready line failed
    Pin(PinErrorKind),
}

impl fmt::Display for ReadyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadyError::Timeout => f.write_str("timed out waiting for DRDY"),
            ReadyError::Pin(kind) => write!(f, "DRDY line could not be read: {:?}", kind),
        }
    }
}

impl core::error::Error for ReadyError {}
