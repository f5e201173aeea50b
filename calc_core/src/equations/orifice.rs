//! # Orifice Flow
//!
//! Volumetric flow of an incompressible fluid through a sharp-edged orifice:
//!
//! ```text
//! Q = Cd·A·√(2·ΔP/ρ),   A = π·(d/2)²
//! ```
//!
//! The discharge coefficient `Cd` is always supplied (0.61 for a sharp-edged
//! plate when left blank) and is never solved for.

use std::f64::consts::PI;

use crate::errors::CalcResult;
use crate::units::QuantityFamily;

use super::derivation::{Derivation, StepUnit};
use super::descriptor::{Constraint, FormulaDescriptor, FormulaVariable, Rearrangement};
use super::registry::Formula;

/// Discharge coefficient of a sharp-edged orifice plate
pub const SHARP_EDGE_CD: f64 = 0.61;

/// Area of a circular orifice from its diameter.
///
/// # Example
///
/// ```rust
/// use calc_core::equations::orifice::orifice_area;
///
/// let area = orifice_area(0.05);
/// assert!((area - 0.0019634954).abs() < 1e-9);
/// ```
#[inline]
pub fn orifice_area(diameter: f64) -> f64 {
    PI * (diameter / 2.0).powi(2)
}

/// Diameter of a circular orifice from its area
#[inline]
pub fn orifice_diameter(area: f64) -> f64 {
    2.0 * (area / PI).sqrt()
}

/// Ideal jet velocity, `√(2·ΔP/ρ)`
#[inline]
pub fn jet_velocity(pressure_drop: f64, density: f64) -> f64 {
    (2.0 * pressure_drop / density).sqrt()
}

fn record_area(d: &mut Derivation) -> CalcResult<f64> {
    let area = orifice_area(d.get("d")?);
    d.step("A", "Orifice area", "π·({d}/2)²", area, StepUnit::Family(QuantityFamily::Area))
}

fn record_jet_velocity(d: &mut Derivation) -> CalcResult<f64> {
    let v = jet_velocity(d.get("dP")?, d.get("rho")?);
    d.step(
        "v",
        "Ideal jet velocity",
        "√(2·{dP}/{rho})",
        v,
        StepUnit::Family(QuantityFamily::Velocity),
    )
}

/// Jet velocity implied by a known flow through a known area
fn record_velocity_from_flow(d: &mut Derivation) -> CalcResult<f64> {
    let area = record_area(d)?;
    let v = d.get("Q")? / (d.get("Cd")? * area);
    d.step(
        "v",
        "Jet velocity",
        "{Q}/({Cd}·{A})",
        v,
        StepUnit::Family(QuantityFamily::Velocity),
    )
}

/// Sharp-edged orifice, `Q = Cd·A·√(2·ΔP/ρ)`.
pub fn orifice_flow() -> FormulaDescriptor {
    FormulaDescriptor::new(Formula::OrificeFlow)
        .variable(FormulaVariable::new(
            "Q",
            "Volumetric flow rate",
            QuantityFamily::FlowRate,
            Constraint::Positive,
            "L/s",
        ))
        .variable(FormulaVariable::new(
            "d",
            "Orifice diameter",
            QuantityFamily::Length,
            Constraint::Positive,
            "mm",
        ))
        .variable(FormulaVariable::new(
            "dP",
            "Pressure drop across the orifice",
            QuantityFamily::Pressure,
            Constraint::Positive,
            "kPa",
        ))
        .variable(FormulaVariable::new(
            "rho",
            "Fluid density",
            QuantityFamily::Density,
            Constraint::Positive,
            "kg/m³",
        ))
        .variable(
            FormulaVariable::new(
                "Cd",
                "Discharge coefficient",
                QuantityFamily::Dimensionless,
                Constraint::Coefficient,
                "1",
            )
            .with_default(SHARP_EDGE_CD, "1"),
        )
        .rearrangement(Rearrangement::new("Q", "{Cd}·{A}·{v}", |d| {
            let area = record_area(d)?;
            let v = record_jet_velocity(d)?;
            Ok(d.get("Cd")? * area * v)
        }))
        .rearrangement(Rearrangement::new("dP", "{rho}·{v}²/2", |d| {
            let v = record_velocity_from_flow(d)?;
            Ok(d.get("rho")? * v * v / 2.0)
        }))
        .rearrangement(Rearrangement::new("rho", "2·{dP}/{v}²", |d| {
            let v = record_velocity_from_flow(d)?;
            Ok(2.0 * d.get("dP")? / (v * v))
        }))
        .rearrangement(Rearrangement::new("d", "2·√({A}/π)", |d| {
            let v = record_jet_velocity(d)?;
            let area = d.get("Q")? / (d.get("Cd")? * v);
            d.step(
                "A",
                "Required orifice area",
                "{Q}/({Cd}·{v})",
                area,
                StepUnit::Family(QuantityFamily::Area),
            )?;
            Ok(orifice_diameter(area))
        }))
        .sample(&[
            ("Q", 0.01695545514308777),
            ("d", 0.05),
            ("dP", 100_000.0),
            ("rho", 998.0),
            ("Cd", SHARP_EDGE_CD),
        ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::BaseValues;
    use crate::units::UnitRegistry;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_descriptor_validates() {
        orifice_flow().validate(UnitRegistry::global()).unwrap();
    }

    #[test]
    fn test_flow_rate() {
        let values = BaseValues::from_pairs(&[("d", 0.05), ("dP", 1.0e5), ("rho", 998.0), ("Cd", 0.61)]);
        let q = orifice_flow().rearrangement_for("Q").unwrap().evaluate(&values).unwrap();
        assert!(approx_eq(q, 0.016955, 1e-6));
    }

    #[test]
    fn test_area_diameter_inverse() {
        for &d in &[0.001, 0.05, 1.2] {
            assert!(approx_eq(orifice_diameter(orifice_area(d)), d, 1e-12));
        }
    }

    #[test]
    fn test_discharge_coefficient_is_not_solvable() {
        let err = orifice_flow().rearrangement_for("Cd").unwrap_err();
        assert_eq!(err.error_code(), "NOT_SOLVABLE");
    }

    #[test]
    fn test_default_coefficient() {
        let descriptor = orifice_flow();
        let cd = descriptor.find_variable("Cd").unwrap();
        assert_eq!(cd.default.map(|d| d.value), Some(0.61));
    }
}
