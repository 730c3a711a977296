//! A simplified driver for the ADS1246 24-bit delta-sigma ADC reading an NTC
//! thermistor (Raspberry Pi focus)
//!
//! The driver speaks the ADS1246 command protocol (reset, WAKEUP, SDATAC,
//! WREG/RREG, RDATAC) over any [`bus::SerialBus`]; the conversion pipeline
//! turns each 24-bit sample into volts, Ohms and °C with the Beta equation.
//!
//! ```no_run
//! # #[cfg(feature = "rpi")]
//! # fn main() -> Result<(), simple_ads1246::thermistor_reader::ReaderError> {
//! use simple_ads1246::thermistor_reader::{PiConfig, ThermistorReader};
//!
//! let mut reader = ThermistorReader::new(PiConfig::default())?;
//! println!("{:.2} °C", reader.get_temperature()?);
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "rpi"))]
//! # fn main() {}
//! ```
//!
//! # References
//! - Datasheet: https://www.ti.com/lit/ds/symlink/ads1246.pdf

#![cfg_attr(not(feature = "std"), no_std)]

pub mod bus;
pub mod driver;
pub mod error;
pub mod monitor;
pub mod ready;
pub mod report;
pub mod temp_conversion;

#[cfg(feature = "rpi")]
pub mod thermistor_reader;

pub use bus::{HalBus, SerialBus, TransferError, MODE};
pub use driver::{Ads1246, DriverConfig, Mode, RawSample, RegisterWrite, THERMISTOR_REGISTERS};
pub use error::{Error, ReadyError};
pub use monitor::{Monitor, MonitorConfig, MonitorError};
pub use ready::{PollingReady, WaitReady};
pub use report::{write_report, Sample};
pub use temp_conversion::{Calibration, ConversionError, Measurement, Thermistor};

#[cfg(feature = "rpi")]
pub use thermistor_reader::ThermistorReader;
