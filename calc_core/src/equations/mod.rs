//! # Formula Catalog
//!
//! Every physical law the solver can rearrange, described as data. Keeping
//! the formulas in one place enables:
//! - Verification of each rearrangement against a known-good sample at load time
//! - Documentation of units, constraints and assumptions next to the math
//! - One solver for every formula instead of one hand-written form per law
//!
//! ## Modules
//!
//! - [`derivation`] - Recorder for intermediate quantities and trace templates
//! - [`descriptor`] - Variables, constraints, rearrangements and solve modes
//! - [`registry`] - Formula enum, metadata and the validated descriptor table
//! - [`momentum`], [`orifice`], [`gas_flow`], [`electrical`], [`evaporation`],
//!   [`petroleum`], [`meteorology`], [`vectors`] - The formulas themselves
//!
//! ## Sign Conventions
//!
//! - **Velocity**: Signed; opposite directions have opposite signs
//! - **Dew point spread**: T − Td, negative only for supersaturated air
//! - **Angles**: Radians in base units, [0, π] for vector angles
//!
//! ## References
//!
//! - Halliday, Resnick & Walker, Fundamentals of Physics
//! - ISO 5167-2: Orifice plates
//! - Horowitz & Hill, The Art of Electronics
//! - API MPMS Chapter 11.1
//! - Alduchov & Eskridge (1996), Magnus coefficients

pub mod derivation;
pub mod descriptor;
pub mod electrical;
pub mod evaporation;
pub mod gas_flow;
pub mod meteorology;
pub mod momentum;
pub mod orifice;
pub mod petroleum;
pub mod registry;
pub mod vectors;

pub use derivation::{BaseValues, Derivation, DerivedStep, StepUnit};
pub use descriptor::{
    Constraint, DefaultValue, FormulaDescriptor, FormulaVariable, Precondition, Rearrangement, SolveMode,
};
pub use registry::{
    generate_formulas_markdown, Formula, FormulaCategory, FormulaMetadata, FormulaRegistry, Reference,
    ALL_FORMULAS,
};
