//! Start-up sequence and the single poll loop.

use core::fmt;
use core::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_io::Write;

use crate::bus::SerialBus;
use crate::driver::{Ads1246, RegisterWrite, THERMISTOR_REGISTERS};
use crate::error::{Error, ReadyError};
use crate::ready::WaitReady;
use crate::report::{write_report, Sample};
use crate::temp_conversion::{self as conversion, Calibration, Thermistor};

#[derive(Debug, Clone)]
/// What the poll loop measures and how long it waits.
pub struct MonitorConfig {
    pub registers: [RegisterWrite; 3],
    pub thermistor: Thermistor,
    pub calibration: Calibration,
    /// Longest wait for DRDY before giving up
    pub ready_timeout: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            registers: THERMISTOR_REGISTERS,
            thermistor: Thermistor::default(),
            calibration: Calibration::default(),
            ready_timeout: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Failures that stop the poll loop.
pub enum MonitorError<E> {
    Driver(Error<E>),
    Ready(ReadyError),
    Console(embedded_io::ErrorKind),
}

impl<E> From<Error<E>> for MonitorError<E> {
    fn from(e: Error<E>) -> Self {
        MonitorError::Driver(e)
    }
}

impl<E> From<ReadyError> for MonitorError<E> {
    fn from(e: ReadyError) -> Self {
        MonitorError::Ready(e)
    }
}

impl<E: fmt::Debug> fmt::Display for MonitorError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorError::Driver(e) => write!(f, "ADS1246: {}", e),
            MonitorError::Ready(e) => write!(f, "ready line: {}", e),
            MonitorError::Console(kind) => write!(f, "console write failed: {:?}", kind),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for MonitorError<E> {}

/// Owns the driver, the ready wait and the console.
pub struct Monitor<BUS, CS, RST, D, RDY, CON> {
    adc: Ads1246<BUS, CS, RST, D>,
    ready: RDY,
    console: CON,
    config: MonitorConfig,
}

impl<BUS, CS, RST, D, RDY, CON> Monitor<BUS, CS, RST, D, RDY, CON>
where
    BUS: SerialBus,
    CS: OutputPin,
    RST: OutputPin,
    D: DelayNs,
    RDY: WaitReady,
    CON: Write,
{
    pub fn new(adc: Ads1246<BUS, CS, RST, D>, ready: RDY, console: CON, config: MonitorConfig) -> Self {
        Monitor {
            adc,
            ready,
            console,
            config,
        }
    }

    pub fn adc(&mut self) -> &mut Ads1246<BUS, CS, RST, D> {
        &mut self.adc
    }

    pub fn release(self) -> (Ads1246<BUS, CS, RST, D>, RDY, CON) {
        (self.adc, self.ready, self.console)
    }

    /// Bring the ADC up and start streaming.
    pub fn start(&mut self) -> Result<(), MonitorError<BUS::Error>> {
        self.adc.initialize(&self.config.registers)?;
        Ok(())
    }

    /// Wait for one conversion, convert it and report it.
    pub fn poll_once(&mut self) -> Result<Sample, MonitorError<BUS::Error>> {
        self.ready.wait_ready(self.config.ready_timeout)?;
        let raw = self.adc.read_sample()?;

        let voltage = conversion::sample_to_voltage(raw, self.config.calibration.reference_voltage);
        let outcome = conversion::convert(raw, &self.config.thermistor, &self.config.calibration);
        if let Err(fault) = &outcome {
            log::warn!("sensor fault at raw {}: {}", raw.value(), fault);
        }

        let sample = Sample { raw, voltage, outcome };
        write_report(&mut self.console, &sample).map_err(MonitorError::Console)?;
        Ok(sample)
    }

    /// Poll forever. Sensor faults are reported and skipped; anything else
    /// ends the loop.
    pub fn run(&mut self) -> Result<(), MonitorError<BUS::Error>> {
        loop {
            self.poll_once()?;
        }
    }
}
