//! # Evaporation Rate
//!
//! Average evaporation rate from a measured loss over a time interval, in
//! three forms:
//!
//! - Mass loss: `E = m/t`
//! - Volume loss of a liquid of known density: `E = V·ρ/t` (water when blank)
//! - Area-specific flux from an open surface: `J = m/(A·t)`
//!
//! Rates may be zero; a zero rate cannot be inverted for a time or an area.

use crate::units::QuantityFamily;

use super::derivation::StepUnit;
use super::descriptor::{Constraint, FormulaDescriptor, FormulaVariable, Rearrangement};
use super::registry::Formula;

/// Density of water used when the liquid density is left blank (kg/L)
pub const WATER_DENSITY_KG_PER_L: f64 = 1.0;

fn rate() -> FormulaVariable {
    FormulaVariable::new(
        "E",
        "Evaporation rate",
        QuantityFamily::MassFlowRate,
        Constraint::NonNegative,
        "kg/h",
    )
}

fn mass() -> FormulaVariable {
    FormulaVariable::new("m", "Mass evaporated", QuantityFamily::Mass, Constraint::Positive, "kg")
}

fn elapsed() -> FormulaVariable {
    FormulaVariable::new("t", "Elapsed time", QuantityFamily::Time, Constraint::Positive, "h")
}

/// Mass loss over time, `E = m/t`.
pub fn evaporation_rate() -> FormulaDescriptor {
    FormulaDescriptor::new(Formula::EvaporationRate)
        .variable(rate())
        .variable(mass())
        .variable(elapsed())
        .rearrangement(
            Rearrangement::new("E", "{m}/{t}", |d| Ok(d.get("m")? / d.get("t")?))
                .nonzero("t", |v| v.get("t")),
        )
        .rearrangement(Rearrangement::new("m", "{E}·{t}", |d| Ok(d.get("E")? * d.get("t")?)))
        .rearrangement(
            Rearrangement::new("t", "{m}/{E}", |d| Ok(d.get("m")? / d.get("E")?))
                .nonzero("E", |v| v.get("E")),
        )
        .sample(&[("E", 12.0 / 14_400.0), ("m", 12.0), ("t", 14_400.0)])
}

/// Volume loss of a liquid, `E = V·ρ/t`.
pub fn evaporation_volume() -> FormulaDescriptor {
    FormulaDescriptor::new(Formula::EvaporationVolume)
        .variable(rate())
        .variable(FormulaVariable::new(
            "V",
            "Volume evaporated",
            QuantityFamily::Volume,
            Constraint::Positive,
            "L",
        ))
        .variable(elapsed())
        .variable(
            FormulaVariable::new("rho", "Liquid density", QuantityFamily::Density, Constraint::Positive, "kg/L")
                .with_default(WATER_DENSITY_KG_PER_L, "kg/L"),
        )
        .rearrangement(
            Rearrangement::new("E", "{m}/{t}", |d| {
                let m = d.get("V")? * d.get("rho")?;
                d.step("m", "Mass evaporated", "{V}·{rho}", m, StepUnit::Family(QuantityFamily::Mass))?;
                Ok(m / d.get("t")?)
            })
            .nonzero("t", |v| v.get("t")),
        )
        .rearrangement(
            Rearrangement::new("V", "{E}·{t}/{rho}", |d| Ok(d.get("E")? * d.get("t")? / d.get("rho")?))
                .nonzero("rho", |v| v.get("rho")),
        )
        .rearrangement(
            Rearrangement::new("t", "{V}·{rho}/{E}", |d| Ok(d.get("V")? * d.get("rho")? / d.get("E")?))
                .nonzero("E", |v| v.get("E")),
        )
        .rearrangement(
            Rearrangement::new("rho", "{E}·{t}/{V}", |d| Ok(d.get("E")? * d.get("t")? / d.get("V")?))
                .nonzero("V", |v| v.get("V")),
        )
        .sample(&[("E", 10.0 / 14_400.0), ("V", 0.01), ("t", 14_400.0), ("rho", 1000.0)])
}

/// Evaporation per unit surface, `J = m/(A·t)`.
pub fn evaporation_flux() -> FormulaDescriptor {
    FormulaDescriptor::new(Formula::EvaporationFlux)
        .variable(FormulaVariable::new(
            "J",
            "Evaporation flux",
            QuantityFamily::MassFlux,
            Constraint::NonNegative,
            "kg/(m²·h)",
        ))
        .variable(mass())
        .variable(FormulaVariable::new(
            "A",
            "Surface area",
            QuantityFamily::Area,
            Constraint::Positive,
            "m²",
        ))
        .variable(elapsed())
        .rearrangement(
            Rearrangement::new("J", "{m}/({A}·{t})", |d| {
                Ok(d.get("m")? / (d.get("A")? * d.get("t")?))
            })
            .nonzero("A·t", |v| Ok(v.get("A")? * v.get("t")?)),
        )
        .rearrangement(Rearrangement::new("m", "{J}·{A}·{t}", |d| {
            Ok(d.get("J")? * d.get("A")? * d.get("t")?)
        }))
        .rearrangement(
            Rearrangement::new("A", "{m}/({J}·{t})", |d| {
                Ok(d.get("m")? / (d.get("J")? * d.get("t")?))
            })
            .nonzero("J", |v| v.get("J")),
        )
        .rearrangement(
            Rearrangement::new("t", "{m}/({J}·{A})", |d| {
                Ok(d.get("m")? / (d.get("J")? * d.get("A")?))
            })
            .nonzero("J", |v| v.get("J")),
        )
        .sample(&[("J", 12.0 / 28_800.0), ("m", 12.0), ("A", 2.0), ("t", 14_400.0)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::BaseValues;
    use crate::units::UnitRegistry;

    #[test]
    fn test_descriptors_validate() {
        let units = UnitRegistry::global();
        evaporation_rate().validate(units).unwrap();
        evaporation_volume().validate(units).unwrap();
        evaporation_flux().validate(units).unwrap();
    }

    #[test]
    fn test_zero_rate_cannot_give_time() {
        let values = BaseValues::from_pairs(&[("m", 5.0), ("E", 0.0)]);
        let err = evaporation_rate().rearrangement_for("t").unwrap().evaluate(&values).unwrap_err();
        assert_eq!(err.error_code(), "DIVISION_BY_ZERO");
    }

    #[test]
    fn test_volume_form_records_mass() {
        // 3 L of water over 2 h
        let values = BaseValues::from_pairs(&[("V", 0.003), ("rho", 1000.0), ("t", 7200.0)]);
        let (e, steps) = evaporation_volume()
            .rearrangement_for("E")
            .unwrap()
            .evaluate_traced(&values)
            .unwrap();
        assert!((e * 3600.0 - 1.5).abs() < 1e-12);
        assert_eq!(steps.len(), 2);
    }

    #[test]
    fn test_flux_area() {
        let values = BaseValues::from_pairs(&[("m", 6.0), ("J", 1.0e-4), ("t", 3600.0)]);
        let area = evaporation_flux().rearrangement_for("A").unwrap().evaluate(&values).unwrap();
        assert!((area - 6.0 / 0.36).abs() < 1e-9);
    }
}
