//! # Standard Gas Flow
//!
//! Converts actual volumetric gas flow at line conditions to standard flow
//! (SCFM) with the ideal gas law:
//!
//! ```text
//! SCFM = ACFM·(P/P_std)·(T_std/T)
//! ```
//!
//! Pressures and temperatures must be absolute. Gauge pressure units are
//! accepted on input and converted by adding 14.7 psi, so 0 psig sits at
//! the default standard pressure.
//! Standard conditions default to 14.7 psia and 60 °F.

use crate::errors::CalcResult;
use crate::units::QuantityFamily;

use super::derivation::{Derivation, StepUnit};
use super::descriptor::{Constraint, FormulaDescriptor, FormulaVariable, Rearrangement};
use super::registry::Formula;

/// Standard pressure in psia
pub const STANDARD_PRESSURE_PSIA: f64 = 14.7;

/// Standard temperature in °F
pub const STANDARD_TEMPERATURE_F: f64 = 60.0;

fn record_pressure_ratio(d: &mut Derivation) -> CalcResult<f64> {
    let ratio = d.get("P")? / d.get("P_std")?;
    d.step("Pr", "Pressure ratio", "{P}/{P_std}", ratio, StepUnit::None)
}

fn record_temperature_ratio(d: &mut Derivation) -> CalcResult<f64> {
    let ratio = d.get("T_std")? / d.get("T")?;
    d.step("Tr", "Temperature ratio", "{T_std}/{T}", ratio, StepUnit::None)
}

fn flow(symbol: &'static str, name: &'static str) -> FormulaVariable {
    FormulaVariable::new(symbol, name, QuantityFamily::FlowRate, Constraint::Positive, "cfm")
}

/// Actual to standard flow, `SCFM = ACFM·(P/P_std)·(T_std/T)`.
pub fn standard_flow() -> FormulaDescriptor {
    FormulaDescriptor::new(Formula::StandardFlow)
        .variable(flow("scfm", "Standard flow"))
        .variable(flow("acfm", "Actual flow"))
        .variable(FormulaVariable::new(
            "P",
            "Line pressure",
            QuantityFamily::AbsolutePressure,
            Constraint::Positive,
            "psia",
        ))
        .variable(FormulaVariable::new(
            "T",
            "Line temperature",
            QuantityFamily::Temperature,
            Constraint::Positive,
            "°F",
        ))
        .variable(
            FormulaVariable::new(
                "P_std",
                "Standard pressure",
                QuantityFamily::AbsolutePressure,
                Constraint::Positive,
                "psia",
            )
            .with_default(STANDARD_PRESSURE_PSIA, "psia"),
        )
        .variable(
            FormulaVariable::new(
                "T_std",
                "Standard temperature",
                QuantityFamily::Temperature,
                Constraint::Positive,
                "°F",
            )
            .with_default(STANDARD_TEMPERATURE_F, "°F"),
        )
        .rearrangement(Rearrangement::new("scfm", "{acfm}·{Pr}·{Tr}", |d| {
            let pr = record_pressure_ratio(d)?;
            let tr = record_temperature_ratio(d)?;
            Ok(d.get("acfm")? * pr * tr)
        }))
        .rearrangement(Rearrangement::new("acfm", "{scfm}/({Pr}·{Tr})", |d| {
            let pr = record_pressure_ratio(d)?;
            let tr = record_temperature_ratio(d)?;
            Ok(d.get("scfm")? / (pr * tr))
        }))
        .rearrangement(Rearrangement::new("P", "{P_std}·{scfm}·{T}/({acfm}·{T_std})", |d| {
            Ok(d.get("P_std")? * d.get("scfm")? * d.get("T")? / (d.get("acfm")? * d.get("T_std")?))
        }))
        .rearrangement(Rearrangement::new("T", "{T_std}·{acfm}·{P}/({scfm}·{P_std})", |d| {
            Ok(d.get("T_std")? * d.get("acfm")? * d.get("P")? / (d.get("scfm")? * d.get("P_std")?))
        }))
        .sample(&[
            ("scfm", 0.35460029327002723),
            ("acfm", 0.04719474432),
            ("P", 790_828.661526411),
            ("T", 299.81666666666666),
            ("P_std", 101_352.9322095749),
            ("T_std", 288.7055555555555),
        ])
}
