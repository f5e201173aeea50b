//! # Petroleum Gravity
//!
//! API gravity and specific gravity of crude oils and products. Both are
//! referenced to water at 60 °F.
//!
//! ```text
//! °API = 141.5/SG − 131.5
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::CalcResult;
use crate::units::QuantityFamily;

use super::derivation::Derivation;
use super::descriptor::{Constraint, FormulaDescriptor, FormulaVariable, Rearrangement};
use super::registry::Formula;

/// Density of water at 60 °F in kg/m³
pub const WATER_DENSITY_60F: f64 = 999.016;

/// API gravity from specific gravity.
///
/// # Example
///
/// ```rust
/// use calc_core::equations::petroleum::api_from_specific_gravity;
///
/// // Water is 10 °API by definition
/// assert!((api_from_specific_gravity(1.0) - 10.0).abs() < 1e-12);
/// ```
#[inline]
pub fn api_from_specific_gravity(sg: f64) -> f64 {
    141.5 / sg - 131.5
}

/// Specific gravity from API gravity
#[inline]
pub fn specific_gravity_from_api(api: f64) -> f64 {
    141.5 / (api + 131.5)
}

/// Crude oil grade by API gravity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrudeClass {
    /// Above 31.1 °API
    Light,
    /// 22.3 to 31.1 °API
    Medium,
    /// 10 to 22.3 °API
    Heavy,
    /// Below 10 °API (denser than water)
    ExtraHeavy,
}

impl CrudeClass {
    pub fn from_api(api: f64) -> Self {
        if api > 31.1 {
            CrudeClass::Light
        } else if api >= 22.3 {
            CrudeClass::Medium
        } else if api >= 10.0 {
            CrudeClass::Heavy
        } else {
            CrudeClass::ExtraHeavy
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CrudeClass::Light => "light crude",
            CrudeClass::Medium => "medium crude",
            CrudeClass::Heavy => "heavy crude",
            CrudeClass::ExtraHeavy => "extra heavy crude",
        }
    }
}

impl fmt::Display for CrudeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

fn note_class(d: &mut Derivation) -> CalcResult<()> {
    let class = CrudeClass::from_api(d.get("api")?);
    d.note(format!("Classified as {}", class));
    Ok(())
}

/// API gravity, `°API = 141.5/SG − 131.5`.
pub fn api_gravity() -> FormulaDescriptor {
    FormulaDescriptor::new(Formula::ApiGravity)
        .variable(FormulaVariable::new(
            "api",
            "API gravity",
            QuantityFamily::Dimensionless,
            Constraint::Signed,
            "°API",
        ))
        .variable(FormulaVariable::new(
            "sg",
            "Specific gravity at 60 °F",
            QuantityFamily::Dimensionless,
            Constraint::Positive,
            "1",
        ))
        .rearrangement(
            Rearrangement::new("api", "141.5/{sg} − 131.5", |d| Ok(api_from_specific_gravity(d.get("sg")?)))
                .then(note_class),
        )
        .rearrangement(
            Rearrangement::new("sg", "141.5/({api} + 131.5)", |d| {
                Ok(specific_gravity_from_api(d.get("api")?))
            })
            .nonzero("api + 131.5", |v| Ok(v.get("api")? + 131.5))
            .then(note_class),
        )
        .sample(&[("api", 34.970588235294116), ("sg", 0.85)])
}

/// Specific gravity, `SG = ρ/ρ_ref`.
pub fn specific_gravity() -> FormulaDescriptor {
    FormulaDescriptor::new(Formula::SpecificGravity)
        .variable(FormulaVariable::new(
            "sg",
            "Specific gravity",
            QuantityFamily::Dimensionless,
            Constraint::Positive,
            "1",
        ))
        .variable(FormulaVariable::new(
            "rho",
            "Density",
            QuantityFamily::Density,
            Constraint::Positive,
            "kg/m³",
        ))
        .variable(
            FormulaVariable::new(
                "rho_ref",
                "Reference density (water at 60 °F)",
                QuantityFamily::Density,
                Constraint::Positive,
                "kg/m³",
            )
            .with_default(WATER_DENSITY_60F, "kg/m³"),
        )
        .rearrangement(Rearrangement::new("sg", "{rho}/{rho_ref}", |d| {
            Ok(d.get("rho")? / d.get("rho_ref")?)
        }))
        .rearrangement(Rearrangement::new("rho", "{sg}·{rho_ref}", |d| {
            Ok(d.get("sg")? * d.get("rho_ref")?)
        }))
        .sample(&[("sg", 0.850837223828247), ("rho", 850.0), ("rho_ref", WATER_DENSITY_60F)])
}
