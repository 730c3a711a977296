//! Raw sample to temperature for an NTC thermistor in a voltage divider.
//!
//! The thermistor sits on the low side of the divider, the series resistor
//! on the high side:
//!
//! ```text
//! Vsupply ── Rseries ──┬── Rntc ── GND
//!                      └── AIN0
//! ```
//!
//! Temperatures follow the Beta equation `1/T = 1/T0 + ln(R/R0)/B`.

use core::fmt;

use crate::driver::RawSample;

const KELVIN_OFFSET: f64 = 273.15;
const FULL_SCALE: f64 = RawSample::MAX as f64;

#[derive(Debug, Clone, Copy, PartialEq)]
/// Why a sample could not be turned into a temperature.
pub enum ConversionError {
    /// Measured voltage at or above the divider supply (open thermistor)
    VoltageAtSupply { measured: f64, supply: f64 },
    /// Resistance zero or negative (shorted thermistor)
    NonPositiveResistance(f64),
    /// Intermediate result is not a finite, physical value
    OutOfRange,
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::VoltageAtSupply { measured, supply } => write!(
                f,
                "divider voltage {:.3} V at or above supply {:.3} V (open circuit?)",
                measured, supply
            ),
            ConversionError::NonPositiveResistance(r) => {
                write!(f, "thermistor resistance {:.2} Ohms not positive (short circuit?)", r)
            }
            ConversionError::OutOfRange => f.write_str("reading out of range"),
        }
    }
}

impl core::error::Error for ConversionError {}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Divider and thermistor parameters.
pub struct Thermistor {
    /// Fixed resistor between supply and the ADC input, Ohms
    pub series_resistance: f64,
    /// Voltage across the whole divider, V
    pub supply_voltage: f64,
    /// Thermistor resistance at `nominal_temperature`, Ohms
    pub nominal_resistance: f64,
    /// Temperature at which `nominal_resistance` holds, °C
    pub nominal_temperature: f64,
    /// Beta constant, K
    pub beta: f64,
}

impl Thermistor {
    pub fn nominal_temperature_kelvin(&self) -> f64 {
        self.nominal_temperature + KELVIN_OFFSET
    }
}

impl Default for Thermistor {
    /// Generic 10k NTC (B = 3950) behind a 10k resistor on 3.3 V.
    fn default() -> Self {
        Thermistor {
            series_resistance: 10_000.0,
            supply_voltage: 3.3,
            nominal_resistance: 10_000.0,
            nominal_temperature: 25.0,
            beta: 3950.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// ADC side calibration of one hardware assembly.
pub struct Calibration {
    /// ADC reference voltage, V
    pub reference_voltage: f64,
    /// Multiplicative gain applied to the ADC voltage before divider inversion
    pub correction_gain: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Calibration {
            reference_voltage: 3.3,
            correction_gain: 1.34,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// A converted reading.
pub struct Measurement {
    /// Corrected divider voltage fed to the resistance calculation, V
    pub corrected_voltage: f64,
    pub resistance: f64,
    pub temperature: f64,
}

/// Scale a 24-bit sample to volts. Result lies in `[0, reference]`.
pub fn sample_to_voltage(raw: RawSample, reference: f64) -> f64 {
    raw.value() as f64 / FULL_SCALE * reference
}

/// Invert the divider: `Rntc = Rseries * Vm / (Vs - Vm)`.
pub fn voltage_to_resistance(measured_voltage: f64, supply_voltage: f64, series_resistance: f64) -> Result<f64, ConversionError> {
    if !measured_voltage.is_finite() || measured_voltage < 0.0 {
        return Err(ConversionError::OutOfRange);
    }
    if measured_voltage >= supply_voltage {
        return Err(ConversionError::VoltageAtSupply {
            measured: measured_voltage,
            supply: supply_voltage,
        });
    }
    let resistance = series_resistance * measured_voltage / (supply_voltage - measured_voltage);
    if !resistance.is_finite() || resistance < 0.0 {
        return Err(ConversionError::OutOfRange);
    }
    Ok(resistance)
}

/// Beta equation, returns °C.
pub fn resistance_to_temperature(
    resistance: f64,
    nominal_resistance: f64,
    nominal_temp_kelvin: f64,
    beta: f64,
) -> Result<f64, ConversionError> {
    if !resistance.is_finite() || resistance <= 0.0 {
        return Err(ConversionError::NonPositiveResistance(resistance));
    }
    let inverse_t = 1.0 / nominal_temp_kelvin + libm::log(resistance / nominal_resistance) / beta;
    let temperature = 1.0 / inverse_t - KELVIN_OFFSET;
    if !temperature.is_finite() || inverse_t <= 0.0 {
        return Err(ConversionError::OutOfRange);
    }
    Ok(temperature)
}

/// Run the whole chain: raw → voltage → correction → resistance → °C.
pub fn convert(raw: RawSample, thermistor: &Thermistor, calibration: &Calibration) -> Result<Measurement, ConversionError> {
    let voltage = sample_to_voltage(raw, calibration.reference_voltage);
    let corrected_voltage = voltage * calibration.correction_gain;
    let resistance = voltage_to_resistance(corrected_voltage, thermistor.supply_voltage, thermistor.series_resistance)?;
    let temperature = resistance_to_temperature(
        resistance,
        thermistor.nominal_resistance,
        thermistor.nominal_temperature_kelvin(),
        thermistor.beta,
    )?;
    Ok(Measurement {
        corrected_voltage,
        resistance,
        temperature,
    })
}
