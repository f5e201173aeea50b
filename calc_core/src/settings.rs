//! # Solver Settings
//!
//! Presentation knobs for results and traces. Settings never influence the
//! arithmetic: values are computed at full precision and only formatted
//! according to these settings.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::settings::SolverSettings;
//!
//! let settings = SolverSettings::from_toml_str(r#"
//!     include_given_values = false
//!
//!     [number_format]
//!     significant_digits = 4
//! "#).unwrap();
//!
//! assert_eq!(settings.number_format.significant_digits, 4);
//! assert!(!settings.include_given_values);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// How numbers are written in results and traces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NumberFormat {
    /// Significant digits kept when formatting (1 to 17)
    pub significant_digits: usize,

    /// Magnitudes below this (other than zero) use scientific notation
    pub scientific_below: f64,

    /// Magnitudes at or above this use scientific notation
    pub scientific_at_or_above: f64,
}

impl Default for NumberFormat {
    fn default() -> Self {
        NumberFormat {
            significant_digits: 6,
            scientific_below: 1e-4,
            scientific_at_or_above: 1e6,
        }
    }
}

/// Settings for a solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverSettings {
    pub number_format: NumberFormat,

    /// List the given and defaulted inputs at the top of the trace
    pub include_given_values: bool,
}

impl Default for SolverSettings {
    fn default() -> Self {
        SolverSettings {
            number_format: NumberFormat::default(),
            include_given_values: true,
        }
    }
}

impl SolverSettings {
    /// Parse settings from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> CalcResult<Self> {
        let settings: SolverSettings =
            toml::from_str(source).map_err(|e| CalcError::configuration("solver settings", e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> CalcResult<()> {
        let format = &self.number_format;
        if !(1..=17).contains(&format.significant_digits) {
            return Err(CalcError::configuration(
                "solver settings",
                format!("significant_digits must be 1 to 17, got {}", format.significant_digits),
            ));
        }
        if !(format.scientific_below >= 0.0 && format.scientific_below < format.scientific_at_or_above) {
            return Err(CalcError::configuration(
                "solver settings",
                "scientific_below must be non-negative and below scientific_at_or_above",
            ));
        }
        Ok(())
    }
}
