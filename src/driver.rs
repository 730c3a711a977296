//! Low-level ADS1246 command protocol.
//!
//! # References
//! - Datasheet: https://www.ti.com/lit/ds/symlink/ads1246.pdf

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error as _, OutputPin};

use crate::bus::SerialBus;
use crate::error::Error;

/// Exit power-down mode
pub const CMD_WAKEUP: u8 = 0x00;
/// Read data continuously: one result per conversion, no command needed
pub const CMD_RDATAC: u8 = 0x14;
/// Stop read data continuously so the device accepts commands
pub const CMD_SDATAC: u8 = 0x16;
/// Read register base (0x20 | address)
pub const CMD_RREG: u8 = 0x20;
/// Write register base (0x40 | address)
pub const CMD_WREG: u8 = 0x40;
/// No operation, clocked out while reading
pub const CMD_NOP: u8 = 0xFF;

/// Second byte of RREG/WREG: register count minus one
const ONE_REGISTER: u8 = 0x00;
const MAX_REGISTER: u8 = 0x0F;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Whether the device accepts commands or streams conversions.
pub enum Mode {
    Idle,
    Streaming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// One register write, `(address, value)`.
pub struct RegisterWrite {
    pub address: u8,
    pub value: u8,
}

impl RegisterWrite {
    pub const fn new(address: u8, value: u8) -> Self {
        RegisterWrite { address, value }
    }
}

/// Input multiplexer register
pub const REG_MUX: u8 = 0x00;
/// Bias voltage register
pub const REG_BIAS: u8 = 0x01;
/// Gain and data rate register
pub const REG_GAIN_RATE: u8 = 0x02;

/// Start-up configuration for the thermistor on AIN0.
pub const THERMISTOR_REGISTERS: [RegisterWrite; 3] = [
    RegisterWrite::new(REG_MUX, 0x08),       // AIN0 positive, AINCOM negative
    RegisterWrite::new(REG_BIAS, 0x04),      // bias voltage on AIN0
    RegisterWrite::new(REG_GAIN_RATE, 0x00), // gain 1, slowest data rate
];

#[derive(Debug, Clone, Copy)]
/// Timing knobs of the driver.
pub struct DriverConfig {
    /// Deadline for every single bus transfer
    pub bus_timeout: Duration,
    /// Time the reset line is held low, and then high
    pub reset_hold: Duration,
    /// Wait after a register write before the next command
    pub settle: Duration,
    /// Read every configured register back after writing it
    pub verify_writes: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            bus_timeout: Duration::from_millis(10),
            reset_hold: Duration::from_millis(1),
            settle: Duration::from_millis(1),
            verify_writes: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A 24-bit conversion result.
pub struct RawSample(u32);

impl RawSample {
    pub const MAX: u32 = 0x00FF_FFFF;

    /// Returns `None` for values wider than 24 bits.
    pub const fn new(value: u32) -> Option<Self> {
        if value > Self::MAX {
            None
        } else {
            Some(RawSample(value))
        }
    }

    /// Pack three bus bytes, MSB first.
    pub const fn from_be_bytes(bytes: [u8; 3]) -> Self {
        RawSample(((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | bytes[2] as u32)
    }

    /// Unsigned magnitude, as used by the conversion pipeline.
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Two's-complement reading of the same 24 bits.
    pub const fn as_signed(self) -> i32 {
        ((self.0 << 8) as i32) >> 8
    }
}

/// ADS1246 on a chip-select-gated serial bus.
pub struct Ads1246<BUS, CS, RST, D> {
    bus: BUS,
    cs: CS,
    reset: RST,
    delay: D,
    config: DriverConfig,
    mode: Mode,
    /// Set by power-up and reset, when the device may still be streaming;
    /// only SDATAC clears it
    needs_sdatac: bool,
}

impl<BUS, CS, RST, D> Ads1246<BUS, CS, RST, D>
where
    BUS: SerialBus,
    CS: OutputPin,
    RST: OutputPin,
    D: DelayNs,
{
    /// Take ownership of the bus and lines; chip select is driven high.
    pub fn new(bus: BUS, mut cs: CS, reset: RST, delay: D, config: DriverConfig) -> Result<Self, Error<BUS::Error>> {
        cs.set_high().map_err(|e| Error::Pin(e.kind()))?;
        Ok(Ads1246 {
            bus,
            cs,
            reset,
            delay,
            config,
            mode: Mode::Idle,
            needs_sdatac: true,
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Give back the bus, chip select, reset line and delay.
    pub fn release(self) -> (BUS, CS, RST, D) {
        (self.bus, self.cs, self.reset, self.delay)
    }

    /// Pulse the reset line (active low).
    pub fn reset(&mut self) -> Result<(), Error<BUS::Error>> {
        log::debug!("ADS1246 hardware reset");
        let hold = self.config.reset_hold;
        self.reset.set_low().map_err(|e| Error::Pin(e.kind()))?;
        pause(&mut self.delay, hold);
        self.reset.set_high().map_err(|e| Error::Pin(e.kind()))?;
        pause(&mut self.delay, hold);
        self.mode = Mode::Idle;
        self.needs_sdatac = true;
        Ok(())
    }

    /// Bring the device out of power-down.
    pub fn wake(&mut self) -> Result<(), Error<BUS::Error>> {
        self.require(Mode::Idle)?;
        log::debug!("WAKEUP");
        self.command(&[CMD_WAKEUP])
    }

    /// Leave continuous mode; harmless when already idle.
    pub fn stop_streaming(&mut self) -> Result<(), Error<BUS::Error>> {
        log::debug!("SDATAC");
        self.command(&[CMD_SDATAC])?;
        self.mode = Mode::Idle;
        self.needs_sdatac = false;
        Ok(())
    }

    /// Enter continuous mode. DRDY falls once per conversion from here on.
    pub fn start_streaming(&mut self) -> Result<(), Error<BUS::Error>> {
        self.require(Mode::Idle)?;
        log::debug!("RDATAC");
        self.command(&[CMD_RDATAC])?;
        self.mode = Mode::Streaming;
        Ok(())
    }

    /// Write a single register and wait for it to settle.
    ///
    /// Fails with [`Error::NotIdle`] until [`Self::stop_streaming`] has been
    /// sent since construction or the last reset.
    pub fn write_register(&mut self, address: u8, value: u8) -> Result<(), Error<BUS::Error>> {
        self.require_registers()?;
        let frame = [CMD_WREG | register_field(address)?, ONE_REGISTER, value];
        log::debug!("WREG 0x{:02X} <- 0x{:02X}", address, value);
        self.command(&frame)?;
        pause(&mut self.delay, self.config.settle);
        Ok(())
    }

    /// Read a single register back.
    pub fn read_register(&mut self, address: u8) -> Result<u8, Error<BUS::Error>> {
        self.require_registers()?;
        let frame = [CMD_RREG | register_field(address)?, ONE_REGISTER];
        let mut value = [CMD_NOP];
        let timeout = self.config.bus_timeout;

        self.select()?;
        let result = self
            .bus
            .transmit(&frame, timeout)
            .and_then(|()| self.bus.receive(&mut value, timeout));
        self.deselect()?;
        result?;

        log::debug!("RREG 0x{:02X} -> 0x{:02X}", address, value[0]);
        Ok(value[0])
    }

    /// Write a register, then read it back and compare.
    pub fn write_register_verified(&mut self, address: u8, value: u8) -> Result<(), Error<BUS::Error>> {
        self.write_register(address, value)?;
        let read = self.read_register(address)?;
        if read != value {
            return Err(Error::VerifyMismatch {
                address,
                written: value,
                read,
            });
        }
        Ok(())
    }

    /// Apply register writes in order.
    pub fn configure(&mut self, registers: &[RegisterWrite]) -> Result<(), Error<BUS::Error>> {
        for reg in registers {
            if self.config.verify_writes {
                self.write_register_verified(reg.address, reg.value)?;
            } else {
                self.write_register(reg.address, reg.value)?;
            }
        }
        Ok(())
    }

    /// Reset, wake, configure and start streaming.
    pub fn initialize(&mut self, registers: &[RegisterWrite]) -> Result<(), Error<BUS::Error>> {
        self.reset()?;
        self.wake()?;
        self.stop_streaming()?;
        self.configure(registers)?;
        self.start_streaming()?;
        log::info!("ADS1246 streaming, {} registers configured", registers.len());
        Ok(())
    }

    /// Clock out the latest conversion. Only call once DRDY is low.
    pub fn read_sample(&mut self) -> Result<RawSample, Error<BUS::Error>> {
        self.require(Mode::Streaming)?;
        let mut buffer = [CMD_NOP; 3];
        let timeout = self.config.bus_timeout;

        self.select()?;
        let result = self.bus.receive(&mut buffer, timeout);
        self.deselect()?;
        result?;

        Ok(RawSample::from_be_bytes(buffer))
    }

    fn require(&self, mode: Mode) -> Result<(), Error<BUS::Error>> {
        match (mode, self.mode) {
            (Mode::Idle, Mode::Streaming) => Err(Error::NotIdle),
            (Mode::Streaming, Mode::Idle) => Err(Error::NotStreaming),
            _ => Ok(()),
        }
    }

    fn require_registers(&self) -> Result<(), Error<BUS::Error>> {
        self.require(Mode::Idle)?;
        if self.needs_sdatac {
            return Err(Error::NotIdle);
        }
        Ok(())
    }

    fn command(&mut self, bytes: &[u8]) -> Result<(), Error<BUS::Error>> {
        self.select()?;
        let result = self.bus.transmit(bytes, self.config.bus_timeout);
        self.deselect()?; // release CS even if the transfer failed
        result.map_err(Error::from)
    }

    fn select(&mut self) -> Result<(), Error<BUS::Error>> {
        self.cs.set_low().map_err(|e| Error::Pin(e.kind()))
    }

    fn deselect(&mut self) -> Result<(), Error<BUS::Error>> {
        self.cs.set_high().map_err(|e| Error::Pin(e.kind()))
    }
}

fn register_field<E>(address: u8) -> Result<u8, Error<E>> {
    if address > MAX_REGISTER {
        return Err(Error::InvalidRegister(address));
    }
    Ok(address)
}

fn pause<D: DelayNs>(delay: &mut D, d: Duration) {
    match u32::try_from(d.as_nanos()) {
        Ok(ns) => delay.delay_ns(ns),
        // delay_ns tops out near 4.29 s
        Err(_) => delay.delay_us(u32::try_from(d.as_micros()).unwrap_or(u32::MAX)),
    }
}
