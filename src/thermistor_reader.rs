//! Raspberry Pi wiring of the driver (rppal).
//!
//! [`ThermistorReader`] hides SPI/GPIO/UART setup behind a small API in the
//! same spirit as a one-call sensor reader: pick pins, get temperatures.

use std::fmt;
use std::time::Duration;

use rppal::gpio::{Gpio, InputPin, OutputPin, Trigger};
use rppal::hal::Delay;
use rppal::spi::{Bus, Mode as SpiMode, SlaveSelect, Spi};
use rppal::uart::{Parity, Uart};

use crate::bus::{HalBus, StdClock};
use crate::driver::{Ads1246, DriverConfig, RawSample};
use crate::error::{Error, ReadyError};
use crate::monitor::{Monitor, MonitorConfig};
use crate::ready::{PollingReady, WaitReady};
use crate::temp_conversion::{self as conversion, ConversionError, Measurement};

/// Driver type on a Raspberry Pi.
pub type PiAds1246 = Ads1246<HalBus<Spi, StdClock>, OutputPin, OutputPin, Delay>;

/// Monitor type on a Raspberry Pi.
pub type PiMonitor<CON> = Monitor<HalBus<Spi, StdClock>, OutputPin, OutputPin, Delay, PiReady, CON>;

#[derive(Debug)]
/// Errors of the high-level reader.
pub enum ReaderError {
    /// Setting up GPIO, SPI, UART or the ADC failed
    Init(String),
    /// Talking to the ADC failed
    Read(String),
    /// The reading does not map to a temperature
    Fault(ConversionError),
}

impl fmt::Display for ReaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReaderError::Init(msg) => write!(f, "initialization failed: {}", msg),
            ReaderError::Read(msg) => write!(f, "read failed: {}", msg),
            ReaderError::Fault(e) => write!(f, "sensor fault: {}", e),
        }
    }
}

impl std::error::Error for ReaderError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How the reader waits for DRDY.
pub enum ReadyStrategy {
    /// Read the pin level every `interval`
    Polling { interval: Duration },
    /// Block on a falling-edge GPIO interrupt
    FallingEdge,
}

#[derive(Debug, Clone)]
/// Pins and bus settings of the board.
pub struct PiConfig {
    /// GPIO (BCM) driving chip select, active low
    pub cs_pin: u8,
    /// GPIO (BCM) driving RESET, active low
    pub reset_pin: u8,
    /// GPIO (BCM) reading DRDY, active low
    pub drdy_pin: u8,
    pub spi_bus: Bus,
    pub slave_select: SlaveSelect,
    pub spi_clock_hz: u32,
    pub ready: ReadyStrategy,
    pub driver: DriverConfig,
    pub monitor: MonitorConfig,
}

impl Default for PiConfig {
    fn default() -> Self {
        PiConfig {
            cs_pin: 24,
            reset_pin: 25,
            drdy_pin: 23,
            spi_bus: Bus::Spi0,
            slave_select: SlaveSelect::Ss0,
            spi_clock_hz: 656_250,
            ready: ReadyStrategy::Polling {
                interval: Duration::from_micros(100),
            },
            driver: DriverConfig::default(),
            monitor: MonitorConfig::default(),
        }
    }
}

/// DRDY wait backed by the kernel's GPIO edge detection.
pub struct EdgeReady {
    pin: InputPin,
}

impl EdgeReady {
    pub fn new(mut pin: InputPin) -> Result<Self, ReaderError> {
        pin.set_interrupt(Trigger::FallingEdge, None)
            .map_err(|e| ReaderError::Init(format!("DRDY interrupt setup failed: {}", e)))?;
        Ok(EdgeReady { pin })
    }
}

impl WaitReady for EdgeReady {
    fn wait_ready(&mut self, timeout: Duration) -> Result<(), ReadyError> {
        if self.pin.is_low() {
            return Ok(()); // conversion already pending, the edge is gone
        }
        match self.pin.poll_interrupt(true, Some(timeout)) {
            Ok(Some(_)) => Ok(()),
            Ok(None) if self.pin.is_low() => Ok(()), // fell between the level check and the flush
            Ok(None) => Err(ReadyError::Timeout),
            Err(e) => {
                log::error!("DRDY interrupt poll failed: {}", e);
                Err(ReadyError::Pin(embedded_hal::digital::ErrorKind::Other))
            }
        }
    }
}

/// Either DRDY wait strategy.
pub enum PiReady {
    Polling(PollingReady<InputPin, Delay>),
    Edge(EdgeReady),
}

impl WaitReady for PiReady {
    fn wait_ready(&mut self, timeout: Duration) -> Result<(), ReadyError> {
        match self {
            PiReady::Polling(r) => r.wait_ready(timeout),
            PiReady::Edge(r) => r.wait_ready(timeout),
        }
    }
}

/// Simplified high-level interface for Raspberry Pi (continuous mode only).
pub struct ThermistorReader {
    adc: PiAds1246,
    ready: PiReady,
    monitor: MonitorConfig,
}

impl ThermistorReader {
    /// Set up SPI and GPIO, reset and configure the ADC and start streaming.
    pub fn new(config: PiConfig) -> Result<Self, ReaderError> {
        let gpio = Gpio::new().map_err(|e| ReaderError::Init(format!("GPIO init failed: {}", e)))?;
        let cs = gpio
            .get(config.cs_pin)
            .map_err(|e| ReaderError::Init(format!("CS pin {} invalid: {}", config.cs_pin, e)))?
            .into_output_high();
        let reset = gpio
            .get(config.reset_pin)
            .map_err(|e| ReaderError::Init(format!("RESET pin {} invalid: {}", config.reset_pin, e)))?
            .into_output_high();
        let drdy = gpio
            .get(config.drdy_pin)
            .map_err(|e| ReaderError::Init(format!("DRDY pin {} invalid: {}", config.drdy_pin, e)))?
            .into_input();
        let spi = Spi::new(config.spi_bus, config.slave_select, config.spi_clock_hz, SpiMode::Mode0)
            .map_err(|e| ReaderError::Init(format!("SPI init failed: {}", e)))?;

        let ready = match config.ready {
            ReadyStrategy::Polling { interval } => PiReady::Polling(PollingReady::new(drdy, Delay::new(), interval)),
            ReadyStrategy::FallingEdge => PiReady::Edge(EdgeReady::new(drdy)?),
        };

        let bus = HalBus::new(spi, StdClock::new());
        let mut adc = Ads1246::new(bus, cs, reset, Delay::new(), config.driver).map_err(init_error)?;
        adc.initialize(&config.monitor.registers).map_err(init_error)?;
        log::info!(
            "ADS1246 up on {:?}/{:?} at {} Hz (CS {}, RESET {}, DRDY {})",
            config.spi_bus,
            config.slave_select,
            config.spi_clock_hz,
            config.cs_pin,
            config.reset_pin,
            config.drdy_pin
        );

        Ok(ThermistorReader {
            adc,
            ready,
            monitor: config.monitor,
        })
    }

    /// Wait for the next conversion and read it.
    pub fn get_raw_data(&mut self) -> Result<RawSample, ReaderError> {
        self.ready
            .wait_ready(self.monitor.ready_timeout)
            .map_err(|e| ReaderError::Read(e.to_string()))?;
        self.adc.read_sample().map_err(read_error)
    }

    /// Read and convert the next conversion.
    pub fn get_measurement(&mut self) -> Result<Measurement, ReaderError> {
        let raw = self.get_raw_data()?;
        conversion::convert(raw, &self.monitor.thermistor, &self.monitor.calibration).map_err(ReaderError::Fault)
    }

    /// Temperature of the next conversion in °C.
    pub fn get_temperature(&mut self) -> Result<f64, ReaderError> {
        self.get_measurement().map(|m| m.temperature)
    }

    /// Thermistor resistance of the next conversion in Ohms.
    pub fn get_resistance(&mut self) -> Result<f64, ReaderError> {
        self.get_measurement().map(|m| m.resistance)
    }

    /// Check if an error is a sensor fault rather than a bus problem.
    pub fn is_sensor_fault(&self, e: &ReaderError) -> bool {
        matches!(e, ReaderError::Fault(_))
    }

    /// Turn the reader into a report loop on `console`.
    pub fn into_monitor<CON: embedded_io::Write>(self, console: CON) -> PiMonitor<CON> {
        Monitor::new(self.adc, self.ready, console, self.monitor)
    }
}

fn init_error(e: Error<rppal::spi::Error>) -> ReaderError {
    ReaderError::Init(format!("ADS1246 setup failed: {}", e))
}

fn read_error(e: Error<rppal::spi::Error>) -> ReaderError {
    ReaderError::Read(e.to_string())
}

#[derive(Debug)]
/// UART failure in console form.
pub struct ConsoleError(pub rppal::uart::Error);

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UART: {}", self.0)
    }
}

impl embedded_io::Error for ConsoleError {
    fn kind(&self) -> embedded_io::ErrorKind {
        embedded_io::ErrorKind::Other
    }
}

/// Blocking UART console (8N1).
pub struct UartConsole {
    uart: Uart,
}

impl UartConsole {
    /// Open the primary UART at `baud_rate`, 8 data bits, no parity, 1 stop bit.
    pub fn new(baud_rate: u32) -> Result<Self, ReaderError> {
        let mut uart = Uart::new(baud_rate, Parity::None, 8, 1)
            .map_err(|e| ReaderError::Init(format!("UART init failed: {}", e)))?;
        uart.set_write_mode(true)
            .map_err(|e| ReaderError::Init(format!("UART write mode failed: {}", e)))?;
        Ok(UartConsole { uart })
    }
}

impl embedded_io::ErrorType for UartConsole {
    type Error = ConsoleError;
}

impl embedded_io::Write for UartConsole {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.uart.write(buf).map_err(ConsoleError)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.uart.drain().map_err(ConsoleError)
    }
}

/// Console on any `std::io::Write`, e.g. stdout.
pub struct StdConsole<W>(pub W);

#[derive(Debug)]
pub struct StdConsoleError(pub std::io::Error);

impl fmt::Display for StdConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl embedded_io::Error for StdConsoleError {
    fn kind(&self) -> embedded_io::ErrorKind {
        embedded_io::ErrorKind::Other
    }
}

impl<W: std::io::Write> embedded_io::ErrorType for StdConsole<W> {
    type Error = StdConsoleError;
}

impl<W: std::io::Write> embedded_io::Write for StdConsole<W> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.0.write(buf).map_err(StdConsoleError)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.0.flush().map_err(StdConsoleError)
    }
}
