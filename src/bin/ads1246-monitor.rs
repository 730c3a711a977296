//! Thermistor monitor for the ADS1246 on a Raspberry Pi.
//! Prints one Raw/Voltage/Resistance/Temp block per conversion.
//!
//! Every option has an env var twin (e.g. `--cs-pin 24` or `ADS1246_CS_PIN=24`).
//! Precedence: CLI arg > env var > default.
//!
//! ```text
//! cargo run --features rpi --bin ads1246-monitor -- --console uart --gain 1.34
//! RUST_LOG=debug ADS1246_READY=edge cargo run --features rpi --bin ads1246-monitor
//! ```

use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use simple_ads1246::thermistor_reader::{PiConfig, ReadyStrategy, StdConsole, ThermistorReader, UartConsole};
use simple_ads1246::{Calibration, DriverConfig, MonitorConfig, Thermistor, THERMISTOR_REGISTERS};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ConsoleKind {
    /// Primary UART, 8N1
    Uart,
    /// Standard output
    Stdout,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReadyKind {
    /// Busy-poll the DRDY level
    Poll,
    /// Wait on a falling-edge interrupt
    Edge,
}

#[derive(Debug, Parser)]
#[command(version, about = "Report NTC thermistor temperatures read through an ADS1246")]
struct Args {
    /// GPIO (BCM) for chip select
    #[arg(long, env = "ADS1246_CS_PIN", default_value_t = 24)]
    cs_pin: u8,
    /// GPIO (BCM) for the RESET line
    #[arg(long, env = "ADS1246_RESET_PIN", default_value_t = 25)]
    reset_pin: u8,
    /// GPIO (BCM) for DRDY
    #[arg(long, env = "ADS1246_DRDY_PIN", default_value_t = 23)]
    drdy_pin: u8,
    /// SPI clock in Hz
    #[arg(long, env = "ADS1246_SPI_HZ", default_value_t = 656_250)]
    spi_hz: u32,
    /// How to wait for DRDY
    #[arg(long, env = "ADS1246_READY", value_enum, default_value_t = ReadyKind::Poll)]
    ready: ReadyKind,
    /// DRDY poll interval in microseconds
    #[arg(long, env = "ADS1246_POLL_US", default_value_t = 100)]
    poll_us: u64,
    /// Give up after this long without DRDY, in milliseconds
    #[arg(long, env = "ADS1246_READY_TIMEOUT_MS", default_value_t = 2_000)]
    ready_timeout_ms: u64,
    /// Deadline of a single SPI transfer, in milliseconds
    #[arg(long, env = "ADS1246_BUS_TIMEOUT_MS", default_value_t = 10)]
    bus_timeout_ms: u64,
    /// Read every start-up register back after writing it
    #[arg(long, env = "ADS1246_VERIFY")]
    verify: bool,
    /// Where reports go
    #[arg(long, env = "ADS1246_CONSOLE", value_enum, default_value_t = ConsoleKind::Stdout)]
    console: ConsoleKind,
    /// UART baud rate
    #[arg(long, env = "ADS1246_BAUD", default_value_t = 9_600)]
    baud: u32,
    /// ADC reference voltage in V
    #[arg(long, env = "ADS1246_VREF", default_value_t = 3.3)]
    vref: f64,
    /// Divider supply voltage in V
    #[arg(long, env = "ADS1246_SUPPLY", default_value_t = 3.3)]
    supply: f64,
    /// Empirical gain applied to the ADC voltage
    #[arg(long, env = "ADS1246_GAIN", default_value_t = 1.34)]
    gain: f64,
    /// Series resistor in Ohms
    #[arg(long, env = "ADS1246_SERIES_OHMS", default_value_t = 10_000.0)]
    series_ohms: f64,
    /// Thermistor resistance at the nominal temperature, Ohms
    #[arg(long, env = "ADS1246_NOMINAL_OHMS", default_value_t = 10_000.0)]
    nominal_ohms: f64,
    /// Nominal temperature in °C
    #[arg(long, env = "ADS1246_NOMINAL_C", default_value_t = 25.0)]
    nominal_c: f64,
    /// Beta constant in K
    #[arg(long, env = "ADS1246_BETA", default_value_t = 3950.0)]
    beta: f64,
}

impl Args {
    fn pi_config(&self) -> PiConfig {
        let ready = match self.ready {
            ReadyKind::Poll => ReadyStrategy::Polling {
                interval: Duration::from_micros(self.poll_us),
            },
            ReadyKind::Edge => ReadyStrategy::FallingEdge,
        };
        PiConfig {
            cs_pin: self.cs_pin,
            reset_pin: self.reset_pin,
            drdy_pin: self.drdy_pin,
            spi_clock_hz: self.spi_hz,
            ready,
            driver: DriverConfig {
                bus_timeout: Duration::from_millis(self.bus_timeout_ms),
                verify_writes: self.verify,
                ..DriverConfig::default()
            },
            monitor: MonitorConfig {
                registers: THERMISTOR_REGISTERS,
                thermistor: Thermistor {
                    series_resistance: self.series_ohms,
                    supply_voltage: self.supply,
                    nominal_resistance: self.nominal_ohms,
                    nominal_temperature: self.nominal_c,
                    beta: self.beta,
                },
                calibration: Calibration {
                    reference_voltage: self.vref,
                    correction_gain: self.gain,
                },
                ready_timeout: Duration::from_millis(self.ready_timeout_ms),
            },
            ..PiConfig::default()
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    log::debug!("{:?}", args);

    // Bring-up failures halt the monitor; nothing is retried
    let reader = match ThermistorReader::new(args.pi_config()) {
        Ok(reader) => reader,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match args.console {
        ConsoleKind::Uart => match UartConsole::new(args.baud) {
            Ok(console) => reader.into_monitor(console).run().map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        },
        ConsoleKind::Stdout => reader
            .into_monitor(StdConsole(std::io::stdout()))
            .run()
            .map_err(|e| e.to_string()),
    };

    if let Err(e) = result {
        log::error!("monitor stopped: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
