//! Quantity families.
//!
//! A family groups units that measure the same kind of quantity and convert
//! into a single base unit. Formula variables are tagged with a family so the
//! solver knows which units are acceptable for each input.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of physical quantity a value measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityFamily {
    Length,
    Area,
    Volume,
    Angle,
    Dimensionless,
    Mass,
    Time,
    Velocity,
    Momentum,
    Force,
    /// Pressure differences. Linear units only.
    Pressure,
    /// Pressure measured from vacuum. Gauge units are affine.
    AbsolutePressure,
    Density,
    FlowRate,
    MassFlowRate,
    MassFlux,
    /// Absolute temperature. Celsius and Fahrenheit are affine.
    Temperature,
    /// Temperature intervals. Every unit is linear.
    TemperatureDifference,
    Voltage,
    Resistance,
    Capacitance,
    Frequency,
}

impl QuantityFamily {
    /// Every family, in table order.
    pub const ALL: [QuantityFamily; 22] = [
        QuantityFamily::Length,
        QuantityFamily::Area,
        QuantityFamily::Volume,
        QuantityFamily::Angle,
        QuantityFamily::Dimensionless,
        QuantityFamily::Mass,
        QuantityFamily::Time,
        QuantityFamily::Velocity,
        QuantityFamily::Momentum,
        QuantityFamily::Force,
        QuantityFamily::Pressure,
        QuantityFamily::AbsolutePressure,
        QuantityFamily::Density,
        QuantityFamily::FlowRate,
        QuantityFamily::MassFlowRate,
        QuantityFamily::MassFlux,
        QuantityFamily::Temperature,
        QuantityFamily::TemperatureDifference,
        QuantityFamily::Voltage,
        QuantityFamily::Resistance,
        QuantityFamily::Capacitance,
        QuantityFamily::Frequency,
    ];

    /// Table key, identical to the serde name.
    pub fn key(&self) -> &'static str {
        match self {
            QuantityFamily::Length => "length",
            QuantityFamily::Area => "area",
            QuantityFamily::Volume => "volume",
            QuantityFamily::Angle => "angle",
            QuantityFamily::Dimensionless => "dimensionless",
            QuantityFamily::Mass => "mass",
            QuantityFamily::Time => "time",
            QuantityFamily::Velocity => "velocity",
            QuantityFamily::Momentum => "momentum",
            QuantityFamily::Force => "force",
            QuantityFamily::Pressure => "pressure",
            QuantityFamily::AbsolutePressure => "absolute_pressure",
            QuantityFamily::Density => "density",
            QuantityFamily::FlowRate => "flow_rate",
            QuantityFamily::MassFlowRate => "mass_flow_rate",
            QuantityFamily::MassFlux => "mass_flux",
            QuantityFamily::Temperature => "temperature",
            QuantityFamily::TemperatureDifference => "temperature_difference",
            QuantityFamily::Voltage => "voltage",
            QuantityFamily::Resistance => "resistance",
            QuantityFamily::Capacitance => "capacitance",
            QuantityFamily::Frequency => "frequency",
        }
    }

    /// Look up a family by its table key.
    pub fn from_key(key: &str) -> Option<QuantityFamily> {
        QuantityFamily::ALL.iter().copied().find(|f| f.key() == key)
    }

    /// Human-readable name for messages and documentation
    pub fn display_name(&self) -> &'static str {
        match self {
            QuantityFamily::Length => "length",
            QuantityFamily::Area => "area",
            QuantityFamily::Volume => "volume",
            QuantityFamily::Angle => "angle",
            QuantityFamily::Dimensionless => "dimensionless",
            QuantityFamily::Mass => "mass",
            QuantityFamily::Time => "time",
            QuantityFamily::Velocity => "velocity",
            QuantityFamily::Momentum => "momentum",
            QuantityFamily::Force => "force",
            QuantityFamily::Pressure => "pressure difference",
            QuantityFamily::AbsolutePressure => "absolute pressure",
            QuantityFamily::Density => "density",
            QuantityFamily::FlowRate => "volumetric flow rate",
            QuantityFamily::MassFlowRate => "mass flow rate",
            QuantityFamily::MassFlux => "mass flux",
            QuantityFamily::Temperature => "temperature",
            QuantityFamily::TemperatureDifference => "temperature difference",
            QuantityFamily::Voltage => "voltage",
            QuantityFamily::Resistance => "resistance",
            QuantityFamily::Capacitance => "capacitance",
            QuantityFamily::Frequency => "frequency",
        }
    }
}

impl fmt::Display for QuantityFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
