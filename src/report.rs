//! Human readable report lines on the console link.

use embedded_io::{Error as _, ErrorKind, Write, WriteFmtError};

use crate::driver::RawSample;
use crate::temp_conversion::{ConversionError, Measurement};

#[derive(Debug, Clone, Copy, PartialEq)]
/// One ready cycle: the sample, its ADC voltage and the conversion outcome.
pub struct Sample {
    pub raw: RawSample,
    /// Uncorrected ADC voltage, V
    pub voltage: f64,
    pub outcome: Result<Measurement, ConversionError>,
}

/// Write the report block for one sample:
///
/// ```text
/// Raw: 8388607
/// Voltage: 1.65 V
/// Resistance: 20303.03 Ohms
/// Temp: 9.87 *C
/// ```
///
/// A sensor fault replaces the last two lines with `Fault: <reason>`.
pub fn write_report<W: Write>(console: &mut W, sample: &Sample) -> Result<(), ErrorKind> {
    emit(console, format_args!("Raw: {}\r\n", sample.raw.value()))?;
    emit(console, format_args!("Voltage: {:.2} V\r\n", sample.voltage))?;
    match &sample.outcome {
        Ok(m) => {
            emit(console, format_args!("Resistance: {:.2} Ohms\r\n", m.resistance))?;
            emit(console, format_args!("Temp: {:.2} *C\r\n", m.temperature))?;
        }
        Err(fault) => emit(console, format_args!("Fault: {}\r\n", fault))?,
    }
    console.flush().map_err(|e| e.kind())
}

fn emit<W: Write>(console: &mut W, args: core::fmt::Arguments<'_>) -> Result<(), ErrorKind> {
    console.write_fmt(args).map_err(|e| match e {
        WriteFmtError::Other(e) => e.kind(),
        _ => ErrorKind::Other,
    })
}
