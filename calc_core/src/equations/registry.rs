//! # Formula Registry
//!
//! Central catalog of every formula the solver knows. Each formula has
//! metadata (literature reference, plain-text formula, category) and a
//! [`FormulaDescriptor`] built once and validated on first use.
//!
//! ## Architecture
//!
//! The registry provides:
//! - Type-safe formula identification via the `Formula` enum
//! - Catalog keys for request routing (`"voltage_divider"`, ...)
//! - Full metadata for the FORMULAS.md reference and the CLI
//! - A lazily built, load-time validated descriptor table
//!
//! ## Usage
//!
//! ```rust
//! use calc_core::equations::registry::Formula;
//!
//! let formula: Formula = "orifice_flow".parse().unwrap();
//! assert_eq!(formula, Formula::OrificeFlow);
//!
//! let meta = formula.metadata();
//! println!("{}: {}", meta.name, meta.formula_plain);
//!
//! let descriptor = formula.descriptor();
//! assert!(descriptor.solvable().any(|s| s == "Q"));
//! ```

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{CalcError, CalcResult};
use crate::units::UnitRegistry;

use super::descriptor::FormulaDescriptor;
use super::{electrical, evaporation, gas_flow, meteorology, momentum, orifice, petroleum, vectors};

// ============================================================================
// Literature References
// ============================================================================

/// Published source a formula is taken from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reference {
    /// Halliday, Resnick & Walker, Fundamentals of Physics
    Halliday { edition: u8, chapter: u8 },
    /// ISO 5167, measurement of fluid flow by pressure differential devices
    Iso5167 { part: u8 },
    /// Horowitz & Hill, The Art of Electronics
    Horowitz { edition: u8, section: &'static str },
    /// API Manual of Petroleum Measurement Standards
    ApiMpms { chapter: &'static str },
    /// Alduchov & Eskridge (1996), improved Magnus form approximation
    AlduchovEskridge,
    /// FAA Aviation Weather Handbook
    AviationWeather { chapter: u8 },
    /// Textbook relation with no single authoritative source
    Fundamentals { topic: &'static str },
}

impl Reference {
    /// Full citation for documentation
    pub fn citation(&self) -> String {
        match self {
            Reference::Halliday { edition, chapter } => {
                format!("Halliday, Resnick & Walker, Fundamentals of Physics {}ed, Ch. {}", edition, chapter)
            }
            Reference::Iso5167 { part } => format!("ISO 5167-{}:2022", part),
            Reference::Horowitz { edition, section } => {
                format!("Horowitz & Hill, The Art of Electronics {}ed, §{}", edition, section)
            }
            Reference::ApiMpms { chapter } => format!("API MPMS Chapter {}", chapter),
            Reference::AlduchovEskridge => {
                "Alduchov & Eskridge (1996), J. Appl. Meteor. 35, 601-609".to_string()
            }
            Reference::AviationWeather { chapter } => {
                format!("FAA-H-8083-28 Aviation Weather Handbook, Ch. {}", chapter)
            }
            Reference::Fundamentals { topic } => format!("Fundamentals ({})", topic),
        }
    }

    /// Short form for inline references
    pub fn short_form(&self) -> &'static str {
        match self {
            Reference::Halliday { .. } => "Halliday",
            Reference::Iso5167 { .. } => "ISO 5167",
            Reference::Horowitz { .. } => "Horowitz & Hill",
            Reference::ApiMpms { .. } => "API MPMS",
            Reference::AlduchovEskridge => "Alduchov & Eskridge",
            Reference::AviationWeather { .. } => "FAA-H-8083-28",
            Reference::Fundamentals { .. } => "Fundamentals",
        }
    }
}

// ============================================================================
// Formula Categories
// ============================================================================

/// Categories for grouping formulas in listings and documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormulaCategory {
    Mechanics,
    FluidFlow,
    Electrical,
    Thermodynamics,
    Meteorology,
    Petroleum,
    Geometry,
}

impl FormulaCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            FormulaCategory::Mechanics => "Mechanics",
            FormulaCategory::FluidFlow => "Fluid Flow",
            FormulaCategory::Electrical => "Electrical",
            FormulaCategory::Thermodynamics => "Thermodynamics",
            FormulaCategory::Meteorology => "Meteorology",
            FormulaCategory::Petroleum => "Petroleum",
            FormulaCategory::Geometry => "Geometry",
        }
    }

    /// Sort order for listings (lower = earlier)
    pub fn sort_order(&self) -> u8 {
        match self {
            FormulaCategory::Mechanics => 1,
            FormulaCategory::FluidFlow => 2,
            FormulaCategory::Electrical => 3,
            FormulaCategory::Thermodynamics => 4,
            FormulaCategory::Meteorology => 5,
            FormulaCategory::Petroleum => 6,
            FormulaCategory::Geometry => 7,
        }
    }
}

// ============================================================================
// Formula Metadata
// ============================================================================

/// Documentation for one catalog formula.
///
/// Variables, units and solvable targets live on the descriptor; this struct
/// carries what a reader needs to audit the formula against its source.
#[derive(Debug, Clone)]
pub struct FormulaMetadata {
    /// Human-readable name (e.g., "Voltage Divider")
    pub name: &'static str,
    /// Brief description of what the formula calculates
    pub description: &'static str,
    /// The formula in plain text
    pub formula_plain: &'static str,
    pub reference: Reference,
    /// Assumptions or limitations
    pub assumptions: Vec<&'static str>,
    pub category: FormulaCategory,
    /// Source file implementing the formula
    pub source_module: &'static str,
    /// Function building the descriptor
    pub source_function: &'static str,
}

// ============================================================================
// Formula Enum
// ============================================================================

/// Every formula in the catalog.
///
/// The serde name doubles as the catalog key used in solve requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Formula {
    // -------------------------------------------------------------------------
    // Mechanics
    // -------------------------------------------------------------------------
    /// m1·v1i + m2·v2i = m1·v1f + m2·v2f
    ConservationOfMomentum,
    /// p = m·v
    LinearMomentum,
    /// F·t = m·(v2 − v1)
    ImpulseMomentum,
    /// Δp = m·(v2 − v1)
    MomentumChange,
    /// m1·v1 + m2·v2 = (m1 + m2)·vf
    InelasticCollision,

    // -------------------------------------------------------------------------
    // Fluid flow
    // -------------------------------------------------------------------------
    /// Q = Cd·A·√(2·ΔP/ρ)
    OrificeFlow,
    /// SCFM = ACFM·(P/P_std)·(T_std/T)
    StandardFlow,

    // -------------------------------------------------------------------------
    // Electrical
    // -------------------------------------------------------------------------
    /// Vout = Vin·R2/(R1 + R2)
    VoltageDivider,
    /// fc = 1/(2π·R·C)
    RcCutoffFrequency,
    /// τ = R·C
    RcTimeConstant,
    /// Xc = 1/(2π·f·C)
    CapacitiveReactance,

    // -------------------------------------------------------------------------
    // Thermodynamics (evaporation)
    // -------------------------------------------------------------------------
    /// E = m/t
    EvaporationRate,
    /// E = V·ρ/t
    EvaporationVolume,
    /// J = m/(A·t)
    EvaporationFlux,

    // -------------------------------------------------------------------------
    // Petroleum
    // -------------------------------------------------------------------------
    /// °API = 141.5/SG − 131.5
    ApiGravity,
    /// SG = ρ/ρ_ref
    SpecificGravity,

    // -------------------------------------------------------------------------
    // Meteorology
    // -------------------------------------------------------------------------
    /// H = 125·(T − Td)
    CloudBase,
    /// H = 125·spread
    CloudBaseSpread,
    /// Magnus dew point
    DewPoint,
    /// Cloud base from temperature and relative humidity
    CloudBaseHumidity,

    // -------------------------------------------------------------------------
    // Geometry
    // -------------------------------------------------------------------------
    /// θ = arccos(a·b/(|a|·|b|))
    VectorAngle,
}

/// All formulas in declaration order.
pub static ALL_FORMULAS: &[Formula] = &[
    Formula::ConservationOfMomentum,
    Formula::LinearMomentum,
    Formula::ImpulseMomentum,
    Formula::MomentumChange,
    Formula::InelasticCollision,
    Formula::OrificeFlow,
    Formula::StandardFlow,
    Formula::VoltageDivider,
    Formula::RcCutoffFrequency,
    Formula::RcTimeConstant,
    Formula::CapacitiveReactance,
    Formula::EvaporationRate,
    Formula::EvaporationVolume,
    Formula::EvaporationFlux,
    Formula::ApiGravity,
    Formula::SpecificGravity,
    Formula::CloudBase,
    Formula::CloudBaseSpread,
    Formula::DewPoint,
    Formula::CloudBaseHumidity,
    Formula::VectorAngle,
];

impl Formula {
    /// Catalog key, identical to the serde name
    pub fn key(&self) -> &'static str {
        match self {
            Formula::ConservationOfMomentum => "conservation_of_momentum",
            Formula::LinearMomentum => "linear_momentum",
            Formula::ImpulseMomentum => "impulse_momentum",
            Formula::MomentumChange => "momentum_change",
            Formula::InelasticCollision => "inelastic_collision",
            Formula::OrificeFlow => "orifice_flow",
            Formula::StandardFlow => "standard_flow",
            Formula::VoltageDivider => "voltage_divider",
            Formula::RcCutoffFrequency => "rc_cutoff_frequency",
            Formula::RcTimeConstant => "rc_time_constant",
            Formula::CapacitiveReactance => "capacitive_reactance",
            Formula::EvaporationRate => "evaporation_rate",
            Formula::EvaporationVolume => "evaporation_volume",
            Formula::EvaporationFlux => "evaporation_flux",
            Formula::ApiGravity => "api_gravity",
            Formula::SpecificGravity => "specific_gravity",
            Formula::CloudBase => "cloud_base",
            Formula::CloudBaseSpread => "cloud_base_spread",
            Formula::DewPoint => "dew_point",
            Formula::CloudBaseHumidity => "cloud_base_humidity",
            Formula::VectorAngle => "vector_angle",
        }
    }

    /// Look up a formula by catalog key.
    pub fn from_key(key: &str) -> CalcResult<Formula> {
        let key = key.trim();
        ALL_FORMULAS
            .iter()
            .copied()
            .find(|f| f.key() == key)
            .ok_or_else(|| CalcError::unknown_formula(key))
    }

    /// Position in [`ALL_FORMULAS`]
    fn index(self) -> usize {
        self as usize
    }

    /// Build a fresh, unvalidated descriptor.
    pub fn build_descriptor(&self) -> FormulaDescriptor {
        match self {
            Formula::ConservationOfMomentum => momentum::conservation_of_momentum(),
            Formula::LinearMomentum => momentum::linear_momentum(),
            Formula::ImpulseMomentum => momentum::impulse_momentum(),
            Formula::MomentumChange => momentum::momentum_change(),
            Formula::InelasticCollision => momentum::inelastic_collision(),
            Formula::OrificeFlow => orifice::orifice_flow(),
            Formula::StandardFlow => gas_flow::standard_flow(),
            Formula::VoltageDivider => electrical::voltage_divider(),
            Formula::RcCutoffFrequency => electrical::rc_cutoff_frequency(),
            Formula::RcTimeConstant => electrical::rc_time_constant(),
            Formula::CapacitiveReactance => electrical::capacitive_reactance(),
            Formula::EvaporationRate => evaporation::evaporation_rate(),
            Formula::EvaporationVolume => evaporation::evaporation_volume(),
            Formula::EvaporationFlux => evaporation::evaporation_flux(),
            Formula::ApiGravity => petroleum::api_gravity(),
            Formula::SpecificGravity => petroleum::specific_gravity(),
            Formula::CloudBase => meteorology::cloud_base(),
            Formula::CloudBaseSpread => meteorology::cloud_base_spread(),
            Formula::DewPoint => meteorology::dew_point(),
            Formula::CloudBaseHumidity => meteorology::cloud_base_humidity(),
            Formula::VectorAngle => vectors::vector_angle(),
        }
    }

    /// The shared, validated descriptor.
    ///
    /// # Panics
    ///
    /// On first use if any catalog descriptor fails validation.
    pub fn descriptor(&self) -> &'static FormulaDescriptor {
        FormulaRegistry::global().descriptor(*self)
    }

    /// Get complete metadata for this formula
    pub fn metadata(&self) -> FormulaMetadata {
        match self {
            Formula::ConservationOfMomentum => FormulaMetadata {
                name: "Conservation of Momentum",
                description: "Two-body collision: total momentum before equals total momentum after.",
                formula_plain: "m1·v1i + m2·v2i = m1·v1f + m2·v2f",
                reference: Reference::Halliday { edition: 10, chapter: 9 },
                assumptions: vec![
                    "Closed, isolated system (no external impulse)",
                    "One-dimensional motion; velocity sign gives direction",
                ],
                category: FormulaCategory::Mechanics,
                source_module: "calc_core/src/equations/momentum.rs",
                source_function: "conservation_of_momentum",
            },
            Formula::LinearMomentum => FormulaMetadata {
                name: "Linear Momentum",
                description: "Momentum of a body from its mass and velocity.",
                formula_plain: "p = m·v",
                reference: Reference::Halliday { edition: 10, chapter: 9 },
                assumptions: vec!["Non-relativistic speed"],
                category: FormulaCategory::Mechanics,
                source_module: "calc_core/src/equations/momentum.rs",
                source_function: "linear_momentum",
            },
            Formula::ImpulseMomentum => FormulaMetadata {
                name: "Impulse-Momentum Theorem",
                description: "Velocity change of a body under a force applied for a time interval.",
                formula_plain: "F·t = m·(v2 - v1)",
                reference: Reference::Halliday { edition: 10, chapter: 9 },
                assumptions: vec![
                    "F is the average net force over the interval",
                    "One-dimensional motion; velocity sign gives direction",
                ],
                category: FormulaCategory::Mechanics,
                source_module: "calc_core/src/equations/momentum.rs",
                source_function: "impulse_momentum",
            },
            Formula::MomentumChange => FormulaMetadata {
                name: "Momentum Change",
                description: "Change of a body's momentum between two velocities.",
                formula_plain: "dp = m·(v2 - v1)",
                reference: Reference::Halliday { edition: 10, chapter: 9 },
                assumptions: vec!["Constant mass", "One-dimensional motion; velocity sign gives direction"],
                category: FormulaCategory::Mechanics,
                source_module: "calc_core/src/equations/momentum.rs",
                source_function: "momentum_change",
            },
            Formula::InelasticCollision => FormulaMetadata {
                name: "Perfectly Inelastic Collision",
                description: "Two bodies that stick together on impact, with the kinetic energy lost.",
                formula_plain: "m1·v1 + m2·v2 = (m1 + m2)·vf",
                reference: Reference::Halliday { edition: 10, chapter: 9 },
                assumptions: vec![
                    "Closed, isolated system (no external impulse)",
                    "Bodies move together after impact (coefficient of restitution 0)",
                    "One-dimensional motion; velocity sign gives direction",
                ],
                category: FormulaCategory::Mechanics,
                source_module: "calc_core/src/equations/momentum.rs",
                source_function: "inelastic_collision",
            },
            Formula::OrificeFlow => FormulaMetadata {
                name: "Orifice Flow",
                description: "Volumetric flow of a liquid through a sharp-edged orifice.",
                formula_plain: "Q = Cd·A·sqrt(2·dP/rho), A = pi·d²/4",
                reference: Reference::Iso5167 { part: 2 },
                assumptions: vec![
                    "Incompressible fluid",
                    "Cd = 0.61 (sharp edge) unless given",
                    "Approach velocity neglected",
                ],
                category: FormulaCategory::FluidFlow,
                source_module: "calc_core/src/equations/orifice.rs",
                source_function: "orifice_flow",
            },
            Formula::StandardFlow => FormulaMetadata {
                name: "Standard Gas Flow (SCFM)",
                description: "Actual gas flow at line conditions corrected to standard conditions.",
                formula_plain: "SCFM = ACFM·(P/P_std)·(T_std/T)",
                reference: Reference::Fundamentals { topic: "ideal gas law" },
                assumptions: vec![
                    "Ideal gas (compressibility neglected)",
                    "Absolute pressure and temperature; gauge units offset by 14.7 psi",
                    "Standard conditions 14.7 psia and 60 °F unless given",
                ],
                category: FormulaCategory::FluidFlow,
                source_module: "calc_core/src/equations/gas_flow.rs",
                source_function: "standard_flow",
            },
            Formula::VoltageDivider => FormulaMetadata {
                name: "Voltage Divider",
                description: "Unloaded output of a two-resistor divider, with current and dissipated power.",
                formula_plain: "Vout = Vin·R2/(R1 + R2)",
                reference: Reference::Horowitz { edition: 3, section: "1.2.3" },
                assumptions: vec!["No load on the output", "Vout < Vin when solving a resistor"],
                category: FormulaCategory::Electrical,
                source_module: "calc_core/src/equations/electrical.rs",
                source_function: "voltage_divider",
            },
            Formula::RcCutoffFrequency => FormulaMetadata {
                name: "RC Cutoff Frequency",
                description: "-3 dB frequency of a first-order RC filter.",
                formula_plain: "fc = 1/(2·pi·R·C)",
                reference: Reference::Horowitz { edition: 3, section: "1.7.1" },
                assumptions: vec!["First-order filter, ideal components"],
                category: FormulaCategory::Electrical,
                source_module: "calc_core/src/equations/electrical.rs",
                source_function: "rc_cutoff_frequency",
            },
            Formula::RcTimeConstant => FormulaMetadata {
                name: "RC Time Constant",
                description: "Time for an RC circuit to charge to 63.2 % of the step.",
                formula_plain: "tau = R·C",
                reference: Reference::Horowitz { edition: 3, section: "1.4.2" },
                assumptions: vec!["Ideal components"],
                category: FormulaCategory::Electrical,
                source_module: "calc_core/src/equations/electrical.rs",
                source_function: "rc_time_constant",
            },
            Formula::CapacitiveReactance => FormulaMetadata {
                name: "Capacitive Reactance",
                description: "Magnitude of a capacitor's impedance at a given frequency.",
                formula_plain: "Xc = 1/(2·pi·f·C)",
                reference: Reference::Horowitz { edition: 3, section: "1.7.1" },
                assumptions: vec!["Ideal capacitor, sinusoidal steady state"],
                category: FormulaCategory::Electrical,
                source_module: "calc_core/src/equations/electrical.rs",
                source_function: "capacitive_reactance",
            },
            Formula::EvaporationRate => FormulaMetadata {
                name: "Evaporation Rate (Mass)",
                description: "Average evaporation rate from a measured mass loss.",
                formula_plain: "E = m/t",
                reference: Reference::Fundamentals { topic: "mass balance" },
                assumptions: vec!["Constant rate over the interval"],
                category: FormulaCategory::Thermodynamics,
                source_module: "calc_core/src/equations/evaporation.rs",
                source_function: "evaporation_rate",
            },
            Formula::EvaporationVolume => FormulaMetadata {
                name: "Evaporation Rate (Volume)",
                description: "Average evaporation rate from a measured liquid volume loss.",
                formula_plain: "E = V·rho/t",
                reference: Reference::Fundamentals { topic: "mass balance" },
                assumptions: vec!["Constant rate over the interval", "Water (1 kg/L) unless density given"],
                category: FormulaCategory::Thermodynamics,
                source_module: "calc_core/src/equations/evaporation.rs",
                source_function: "evaporation_volume",
            },
            Formula::EvaporationFlux => FormulaMetadata {
                name: "Evaporation Flux",
                description: "Evaporation per unit of exposed surface area.",
                formula_plain: "J = m/(A·t)",
                reference: Reference::Fundamentals { topic: "mass balance" },
                assumptions: vec!["Uniform evaporation across the surface"],
                category: FormulaCategory::Thermodynamics,
                source_module: "calc_core/src/equations/evaporation.rs",
                source_function: "evaporation_flux",
            },
            Formula::ApiGravity => FormulaMetadata {
                name: "API Gravity",
                description: "API gravity of a petroleum liquid, with crude classification.",
                formula_plain: "API = 141.5/SG - 131.5",
                reference: Reference::ApiMpms { chapter: "11.1" },
                assumptions: vec!["Specific gravity at 60 °F"],
                category: FormulaCategory::Petroleum,
                source_module: "calc_core/src/equations/petroleum.rs",
                source_function: "api_gravity",
            },
            Formula::SpecificGravity => FormulaMetadata {
                name: "Specific Gravity",
                description: "Density relative to water at 60 °F.",
                formula_plain: "SG = rho/rho_ref",
                reference: Reference::ApiMpms { chapter: "11.1" },
                assumptions: vec!["Reference density 999.016 kg/m³ unless given"],
                category: FormulaCategory::Petroleum,
                source_module: "calc_core/src/equations/petroleum.rs",
                source_function: "specific_gravity",
            },
            Formula::CloudBase => FormulaMetadata {
                name: "Cloud Base Height",
                description: "Convective cloud base from surface temperature and dew point.",
                formula_plain: "H = 125 m/K·(T - Td)",
                reference: Reference::AviationWeather { chapter: 6 },
                assumptions: vec!["Well-mixed boundary layer", "Height above the observation point"],
                category: FormulaCategory::Meteorology,
                source_module: "calc_core/src/equations/meteorology.rs",
                source_function: "cloud_base",
            },
            Formula::CloudBaseSpread => FormulaMetadata {
                name: "Cloud Base from Spread",
                description: "Cloud base height from the temperature/dew point spread.",
                formula_plain: "H = 125 m/K·spread",
                reference: Reference::AviationWeather { chapter: 6 },
                assumptions: vec!["Well-mixed boundary layer"],
                category: FormulaCategory::Meteorology,
                source_module: "calc_core/src/equations/meteorology.rs",
                source_function: "cloud_base_spread",
            },
            Formula::DewPoint => FormulaMetadata {
                name: "Dew Point (Magnus)",
                description: "Dew point, relative humidity or air temperature via the Magnus approximation.",
                formula_plain: "Td = b·g/(a - g), g = ln(RH/100) + a·T/(b + T)",
                reference: Reference::AlduchovEskridge,
                assumptions: vec!["a = 17.625, b = 243.04 °C", "Over liquid water, -40 °C to 50 °C"],
                category: FormulaCategory::Meteorology,
                source_module: "calc_core/src/equations/meteorology.rs",
                source_function: "dew_point",
            },
            Formula::CloudBaseHumidity => FormulaMetadata {
                name: "Cloud Base from Humidity",
                description: "Cloud base height from air temperature and relative humidity.",
                formula_plain: "H = 125 m/K·(T - Td(T, RH))",
                reference: Reference::AviationWeather { chapter: 6 },
                assumptions: vec!["Dew point from the Magnus approximation", "Temperature has no closed form"],
                category: FormulaCategory::Meteorology,
                source_module: "calc_core/src/equations/meteorology.rs",
                source_function: "cloud_base_humidity",
            },
            Formula::VectorAngle => FormulaMetadata {
                name: "Angle Between Vectors",
                description: "Angle between two 2-D or 3-D vectors from the dot product.",
                formula_plain: "theta = arccos(a·b/(|a|·|b|))",
                reference: Reference::Fundamentals { topic: "vector algebra" },
                assumptions: vec!["z components are 0 when left blank", "Cosine clamped to [-1, 1]"],
                category: FormulaCategory::Geometry,
                source_module: "calc_core/src/equations/vectors.rs",
                source_function: "vector_angle",
            },
        }
    }

    /// Get all formulas in a specific category
    pub fn in_category(category: FormulaCategory) -> Vec<Formula> {
        ALL_FORMULAS
            .iter()
            .copied()
            .filter(|f| f.metadata().category == category)
            .collect()
    }

    /// Get all unique categories in sort order
    pub fn all_categories() -> Vec<FormulaCategory> {
        let mut categories: Vec<FormulaCategory> =
            ALL_FORMULAS.iter().map(|f| f.metadata().category).collect();
        categories.sort_by_key(|c| c.sort_order());
        categories.dedup();
        categories
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Formula {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Formula::from_key(s)
    }
}

// ============================================================================
// Descriptor Table
// ============================================================================

/// Validated descriptors for the whole catalog, indexed like [`ALL_FORMULAS`].
#[derive(Debug)]
pub struct FormulaRegistry {
    descriptors: Vec<FormulaDescriptor>,
}

static FORMULAS: Lazy<FormulaRegistry> = Lazy::new(|| match FormulaRegistry::build(UnitRegistry::global()) {
    Ok(registry) => {
        info!(formulas = registry.descriptors.len(), "formula registry built");
        registry
    }
    Err(e) => panic!("formula catalog is invalid: {}", e),
});

impl FormulaRegistry {
    /// The process-wide catalog.
    ///
    /// # Panics
    ///
    /// On first use if any descriptor fails validation.
    pub fn global() -> &'static FormulaRegistry {
        &FORMULAS
    }

    /// Build and validate every catalog descriptor against `units`.
    pub fn build(units: &UnitRegistry) -> CalcResult<Self> {
        let mut descriptors = Vec::with_capacity(ALL_FORMULAS.len());
        for (i, formula) in ALL_FORMULAS.iter().enumerate() {
            if formula.index() != i {
                return Err(CalcError::configuration(
                    "formula registry",
                    format!("{} is listed out of declaration order", formula),
                ));
            }
            let descriptor = formula.build_descriptor();
            if descriptor.id != *formula {
                return Err(CalcError::configuration(
                    "formula registry",
                    format!("{} builds the descriptor of {}", formula, descriptor.id),
                ));
            }
            descriptor.validate(units)?;
            descriptors.push(descriptor);
        }
        Ok(FormulaRegistry { descriptors })
    }

    pub fn descriptor(&self, formula: Formula) -> &FormulaDescriptor {
        &self.descriptors[formula.index()]
    }

    /// Descriptor by catalog key.
    pub fn find(&self, key: &str) -> CalcResult<&FormulaDescriptor> {
        Formula::from_key(key).map(|f| self.descriptor(f))
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormulaDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

// ============================================================================
// Markdown Documentation Generation
// ============================================================================

/// Generate the FORMULAS.md reference for the whole catalog.
///
/// Regenerate with `cargo run --bin gen-formulas`.
pub fn generate_formulas_markdown() -> String {
    let mut output = String::with_capacity(32_000);

    output.push_str(r#"# Formula Reference

> **Auto-generated from source code. Do not edit manually.**
>
> Regenerate with: `cargo run --bin gen-formulas`

This document lists every formula the solver can rearrange. For each formula
it gives the variables with their default units and constraints, the
variables that can be solved for, the literature reference and the source
location. Leave exactly one solvable variable blank to solve for it.

## Conventions

| Quantity | Convention |
|----------|------------|
| Velocity | Signed; the sign gives the direction |
| Pressure | Absolute where marked; gauge units add 14.7 psi (101 352.93 Pa) |
| Temperature | Absolute internally (K); °C and °F are affine |
| Angles | Radians internally; degrees by default on output |

---

"#);

    for category in Formula::all_categories() {
        let formulas = Formula::in_category(category);
        if formulas.is_empty() {
            continue;
        }

        output.push_str(&format!("## {}\n\n", category.display_name()));

        for formula in formulas {
            let meta = formula.metadata();
            let descriptor = formula.descriptor();

            output.push_str(&format!("### {}\n\n", meta.name));
            output.push_str(&format!("Key: `{}`\n\n", formula.key()));
            output.push_str(&format!("{}\n\n", meta.description));
            output.push_str(&format!("**Formula:** `{}`\n\n", meta.formula_plain));

            output.push_str("**Variables:**\n\n");
            output.push_str("| Symbol | Description | Unit | Constraint | Default |\n");
            output.push_str("|--------|-------------|------|------------|---------|\n");
            for var in &descriptor.variables {
                let default = var
                    .default
                    .map(|d| format!("{} {}", d.value, d.unit))
                    .unwrap_or_else(|| "-".to_string());
                output.push_str(&format!(
                    "| {} | {} | {} | {} | {} |\n",
                    var.symbol,
                    var.name,
                    var.unit,
                    var.constraint.describe(),
                    default
                ));
            }
            output.push('\n');

            let solvable: Vec<String> = descriptor.solvable().map(|s| format!("`{}`", s)).collect();
            output.push_str(&format!("**Solvable for:** {}\n\n", solvable.join(", ")));

            if !descriptor.modes.is_empty() {
                output.push_str("**Modes:**\n");
                for mode in &descriptor.modes {
                    output.push_str(&format!(
                        "- `{}`: {} (leave one of {} blank)\n",
                        mode.id,
                        mode.label,
                        mode.candidates.join(", ")
                    ));
                }
                output.push('\n');
            }

            output.push_str(&format!("**Reference:** {}\n\n", meta.reference.citation()));
            output.push_str(&format!(
                "**Source:** [`{}`]({})\n\n",
                meta.source_function, meta.source_module
            ));

            if !meta.assumptions.is_empty() {
                output.push_str("**Assumptions:**\n");
                for assumption in &meta.assumptions {
                    output.push_str(&format!("- {}\n", assumption));
                }
                output.push('\n');
            }

            output.push_str("---\n\n");
        }
    }

    let categories = Formula::all_categories();
    output.push_str(&format!(
        "## Statistics\n\n- **Total Formulas:** {}\n- **Categories:** {}\n- **Rearrangements:** {}\n\n",
        ALL_FORMULAS.len(),
        categories.len(),
        FormulaRegistry::global().iter().map(|d| d.rearrangements.len()).sum::<usize>()
    ));

    output.push_str(r#"## How to Audit

1. Find the formula you want to verify in the sections above
2. Check the **Reference** for the original source
3. Click the **Source** link to view the rearrangements
4. Run `cargo test` to check every rearrangement against its sample values
"#);

    output
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_formulas_have_metadata() {
        assert_eq!(ALL_FORMULAS.len(), 21);

        for formula in ALL_FORMULAS {
            let meta = formula.metadata();
            assert!(!meta.name.is_empty(), "Formula {:?} has no name", formula);
            assert!(!meta.formula_plain.is_empty(), "Formula {:?} has no formula", formula);
            assert!(!meta.source_module.is_empty(), "Formula {:?} missing source_module", formula);
            assert!(!meta.source_function.is_empty(), "Formula {:?} missing source_function", formula);
        }

        let divider = Formula::VoltageDivider.metadata();
        assert!(divider.formula_plain.contains("R2/(R1 + R2)"));
    }

    #[test]
    fn test_declaration_order_matches_index() {
        for (i, formula) in ALL_FORMULAS.iter().enumerate() {
            assert_eq!(formula.index(), i, "{:?} out of order", formula);
        }
    }

    #[test]
    fn test_keys_round_trip() {
        for formula in ALL_FORMULAS {
            assert_eq!(Formula::from_key(formula.key()).unwrap(), *formula);
            assert_eq!(formula.to_string(), formula.key());

            // serde name and catalog key agree
            let json = serde_json::to_string(formula).unwrap();
            assert_eq!(json, format!("\"{}\"", formula.key()));
        }
    }

    #[test]
    fn test_unknown_formula() {
        let err = "warp_drive".parse::<Formula>().unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_FORMULA");
        assert!(!err.is_input_error());
    }

    #[test]
    fn test_registry_builds_every_descriptor() {
        let registry = FormulaRegistry::global();
        assert_eq!(registry.len(), ALL_FORMULAS.len());
        for formula in ALL_FORMULAS {
            let descriptor = registry.descriptor(*formula);
            assert_eq!(descriptor.id, *formula);
            assert!(descriptor.solvable().count() > 0, "{} solves nothing", formula);
        }
        assert_eq!(registry.find("dew_point").unwrap().id, Formula::DewPoint);
    }

    #[test]
    fn test_categories_sorted_and_unique() {
        let categories = Formula::all_categories();
        assert_eq!(categories.len(), 7);
        assert_eq!(categories[0], FormulaCategory::Mechanics);
        assert_eq!(categories[6], FormulaCategory::Geometry);
    }

    #[test]
    fn test_in_category() {
        let electrical = Formula::in_category(FormulaCategory::Electrical);
        assert_eq!(electrical.len(), 4);
        assert!(electrical.contains(&Formula::VoltageDivider));

        let mechanics = Formula::in_category(FormulaCategory::Mechanics);
        assert_eq!(mechanics.len(), 5);
        assert!(mechanics.contains(&Formula::InelasticCollision));
    }

    #[test]
    fn test_citations() {
        assert_eq!(Reference::Iso5167 { part: 2 }.citation(), "ISO 5167-2:2022");
        assert_eq!(Reference::ApiMpms { chapter: "11.1" }.short_form(), "API MPMS");
    }

    #[test]
    fn test_generate_markdown() {
        let markdown = generate_formulas_markdown();

        assert!(markdown.contains("# Formula Reference"));
        assert!(markdown.contains("Auto-generated"));
        assert!(markdown.contains("## Mechanics"));
        assert!(markdown.contains("### Voltage Divider"));
        assert!(markdown.contains("### Impulse-Momentum Theorem"));
        assert!(markdown.contains("Key: `orifice_flow`"));
        assert!(markdown.contains("| Cd |"));
        assert!(markdown.contains("**Solvable for:** `theta`"));
        assert!(markdown.contains("`final-velocities`"));
        assert!(markdown.contains("**Total Formulas:** 21"));
        assert!(markdown.contains("**Categories:** 7"));
        assert!(markdown.contains("## How to Audit"));
    }
}
