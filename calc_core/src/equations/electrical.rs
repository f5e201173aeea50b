//! # Electrical Circuits
//!
//! Resistive voltage divider and first-order RC network formulas.
//!
//! ## Voltage divider
//!
//! ```text
//! Vout = Vin·R2/(R1 + R2)
//! ```
//!
//! The output of an unloaded divider is always below its input, so solving
//! for a resistor with `Vout >= Vin` is rejected. Every divider trace also
//! shows the divider current and the power dissipated in each resistor.
//!
//! ## RC networks
//!
//! - Cutoff frequency: `fc = 1/(2π·R·C)`
//! - Time constant: `τ = R·C`
//! - Capacitive reactance: `Xc = 1/(2π·f·C)`

use std::f64::consts::PI;

use crate::errors::CalcResult;
use crate::units::QuantityFamily;

use super::derivation::{BaseValues, Derivation, StepUnit};
use super::descriptor::{Constraint, FormulaDescriptor, FormulaVariable, Rearrangement};
use super::registry::Formula;

// ============================================================================
// Voltage divider
// ============================================================================

/// Output voltage of an unloaded divider.
///
/// # Example
///
/// ```rust
/// use calc_core::equations::electrical::divider_output;
///
/// assert!((divider_output(12.0, 1000.0, 2000.0) - 8.0).abs() < 1e-12);
/// ```
#[inline]
pub fn divider_output(v_in: f64, r1: f64, r2: f64) -> f64 {
    v_in * r2 / (r1 + r2)
}

/// Top resistor for a target output, `R1 = R2·(Vin - Vout)/Vout`
#[inline]
pub fn divider_top_resistor(v_in: f64, v_out: f64, r2: f64) -> f64 {
    r2 * (v_in - v_out) / v_out
}

/// Bottom resistor for a target output, `R2 = R1·Vout/(Vin - Vout)`
#[inline]
pub fn divider_bottom_resistor(v_in: f64, v_out: f64, r1: f64) -> f64 {
    r1 * v_out / (v_in - v_out)
}

fn output_below_input(v: &BaseValues) -> CalcResult<bool> {
    Ok(v.get("Vout")? < v.get("Vin")?)
}

/// Divider current and resistor dissipation, recorded after the unknown is known.
fn record_divider_power(d: &mut Derivation) -> CalcResult<()> {
    let (v_in, r1, r2) = (d.get("Vin")?, d.get("R1")?, d.get("R2")?);
    let current = v_in / (r1 + r2);
    d.step("I", "Divider current", "{Vin}/({R1} + {R2})", current, StepUnit::Custom("A"))?;
    let p1 = d.step("P1", "Power in R1", "{I}²·{R1}", current * current * r1, StepUnit::Custom("W"))?;
    let p2 = d.step("P2", "Power in R2", "{I}²·{R2}", current * current * r2, StepUnit::Custom("W"))?;
    d.step("P", "Total power", "{P1} + {P2}", p1 + p2, StepUnit::Custom("W"))?;
    Ok(())
}

fn voltage(symbol: &'static str, name: &'static str) -> FormulaVariable {
    FormulaVariable::new(symbol, name, QuantityFamily::Voltage, Constraint::Positive, "V")
}

fn resistance(symbol: &'static str, name: &'static str, unit: &'static str) -> FormulaVariable {
    FormulaVariable::new(symbol, name, QuantityFamily::Resistance, Constraint::Positive, unit)
}

fn capacitance() -> FormulaVariable {
    FormulaVariable::new("C", "Capacitance", QuantityFamily::Capacitance, Constraint::Positive, "nF")
}

/// Unloaded resistive divider, `Vout = Vin·R2/(R1 + R2)`.
pub fn voltage_divider() -> FormulaDescriptor {
    FormulaDescriptor::new(Formula::VoltageDivider)
        .variable(voltage("Vin", "Input voltage"))
        .variable(resistance("R1", "Top resistor", "kΩ"))
        .variable(resistance("R2", "Bottom resistor", "kΩ"))
        .variable(voltage("Vout", "Output voltage"))
        .rearrangement(
            Rearrangement::new("Vout", "{Vin}·{R2}/({R1} + {R2})", |d| {
                Ok(divider_output(d.get("Vin")?, d.get("R1")?, d.get("R2")?))
            })
            .then(record_divider_power),
        )
        .rearrangement(
            Rearrangement::new("Vin", "{Vout}·({R1} + {R2})/{R2}", |d| {
                Ok(d.get("Vout")? * (d.get("R1")? + d.get("R2")?) / d.get("R2")?)
            })
            .nonzero("R2", |v| v.get("R2"))
            .then(record_divider_power),
        )
        .rearrangement(
            Rearrangement::new("R1", "{R2}·({Vin} - {Vout})/{Vout}", |d| {
                Ok(divider_top_resistor(d.get("Vin")?, d.get("Vout")?, d.get("R2")?))
            })
            .requires("Vout", "output voltage must be lower than input voltage", output_below_input)
            .then(record_divider_power),
        )
        .rearrangement(
            Rearrangement::new("R2", "{R1}·{Vout}/({Vin} - {Vout})", |d| {
                Ok(divider_bottom_resistor(d.get("Vin")?, d.get("Vout")?, d.get("R1")?))
            })
            .requires("Vout", "output voltage must be lower than input voltage", output_below_input)
            .then(record_divider_power),
        )
        .sample(&[("Vin", 12.0), ("R1", 1000.0), ("R2", 2000.0), ("Vout", 8.0)])
}

// ============================================================================
// RC networks
// ============================================================================

/// Cutoff frequency of a first-order RC filter.
///
/// # Formula
///
/// `fc = 1/(2π·R·C)`
///
/// # Example
///
/// ```rust
/// use calc_core::equations::electrical::rc_cutoff;
///
/// // 1 kΩ with 100 nF
/// let fc = rc_cutoff(1000.0, 100e-9);
/// assert!((fc - 1591.549).abs() < 1e-3);
/// ```
#[inline]
pub fn rc_cutoff(r: f64, c: f64) -> f64 {
    1.0 / (2.0 * PI * r * c)
}

/// Reactance of a capacitor at frequency `f`, `Xc = 1/(2π·f·C)`
#[inline]
pub fn capacitive_reactance_at(f: f64, c: f64) -> f64 {
    1.0 / (2.0 * PI * f * c)
}

fn record_time_constant(d: &mut Derivation) -> CalcResult<()> {
    let tau = d.get("R")? * d.get("C")?;
    d.step("tau", "Time constant", "{R}·{C}", tau, StepUnit::Family(QuantityFamily::Time))?;
    Ok(())
}

fn record_cutoff(d: &mut Derivation) -> CalcResult<()> {
    let fc = 1.0 / (2.0 * PI * d.get("tau")?);
    d.step("fc", "Cutoff frequency", "1/(2π·{tau})", fc, StepUnit::Family(QuantityFamily::Frequency))?;
    Ok(())
}

/// RC low/high-pass corner, `fc = 1/(2π·R·C)`.
pub fn rc_cutoff_frequency() -> FormulaDescriptor {
    FormulaDescriptor::new(Formula::RcCutoffFrequency)
        .variable(resistance("R", "Resistance", "kΩ"))
        .variable(capacitance())
        .variable(FormulaVariable::new(
            "fc",
            "Cutoff frequency",
            QuantityFamily::Frequency,
            Constraint::Positive,
            "Hz",
        ))
        .rearrangement(
            Rearrangement::new("fc", "1/(2π·{R}·{C})", |d| Ok(rc_cutoff(d.get("R")?, d.get("C")?)))
                .then(record_time_constant),
        )
        .rearrangement(
            Rearrangement::new("R", "1/(2π·{fc}·{C})", |d| Ok(rc_cutoff(d.get("fc")?, d.get("C")?)))
                .then(record_time_constant),
        )
        .rearrangement(
            Rearrangement::new("C", "1/(2π·{fc}·{R})", |d| Ok(rc_cutoff(d.get("fc")?, d.get("R")?)))
                .then(record_time_constant),
        )
        .sample(&[("R", 1000.0), ("C", 1.0e-7), ("fc", 1591.5494309189537)])
}

/// RC time constant, `τ = R·C`.
pub fn rc_time_constant() -> FormulaDescriptor {
    FormulaDescriptor::new(Formula::RcTimeConstant)
        .variable(resistance("R", "Resistance", "kΩ"))
        .variable(capacitance())
        .variable(FormulaVariable::new(
            "tau",
            "Time constant",
            QuantityFamily::Time,
            Constraint::Positive,
            "ms",
        ))
        .rearrangement(
            Rearrangement::new("tau", "{R}·{C}", |d| Ok(d.get("R")? * d.get("C")?)).then(record_cutoff),
        )
        .rearrangement(
            Rearrangement::new("R", "{tau}/{C}", |d| Ok(d.get("tau")? / d.get("C")?)).then(record_cutoff),
        )
        .rearrangement(
            Rearrangement::new("C", "{tau}/{R}", |d| Ok(d.get("tau")? / d.get("R")?)).then(record_cutoff),
        )
        .sample(&[("R", 1000.0), ("C", 1.0e-6), ("tau", 1.0e-3)])
}

/// Capacitive reactance, `Xc = 1/(2π·f·C)`.
pub fn capacitive_reactance() -> FormulaDescriptor {
    FormulaDescriptor::new(Formula::CapacitiveReactance)
        .variable(resistance("Xc", "Capacitive reactance", "Ω"))
        .variable(FormulaVariable::new(
            "f",
            "Frequency",
            QuantityFamily::Frequency,
            Constraint::Positive,
            "kHz",
        ))
        .variable(capacitance())
        .rearrangement(Rearrangement::new("Xc", "1/(2π·{f}·{C})", |d| {
            Ok(capacitive_reactance_at(d.get("f")?, d.get("C")?))
        }))
        .rearrangement(Rearrangement::new("f", "1/(2π·{Xc}·{C})", |d| {
            Ok(capacitive_reactance_at(d.get("Xc")?, d.get("C")?))
        }))
        .rearrangement(Rearrangement::new("C", "1/(2π·{f}·{Xc})", |d| {
            Ok(capacitive_reactance_at(d.get("f")?, d.get("Xc")?))
        }))
        .sample(&[("Xc", 159.15494309189535), ("f", 1000.0), ("C", 1.0e-6)])
}
