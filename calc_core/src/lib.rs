//! # calc_core - Unit-Aware Equation Solver
//!
//! `calc_core` solves closed-form physical formulas for whichever variable is
//! left blank. Inputs arrive as raw strings with unit selections, are
//! normalized to base units, checked against each variable's domain, and
//! solved with an explicit rearrangement. Every result carries a derivation
//! trace built from the exact numbers the engine used.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: `solve` is a pure function of its request
//! - **Data-Driven**: Formulas and units are descriptors, validated at load time
//! - **JSON-First**: Requests, solutions and errors implement Serialize
//! - **Rich Errors**: Structured error types naming the offending field
//!
//! ## Quick Start
//!
//! ```rust
//! use calc_core::{solve, Formula, SolveRequest};
//!
//! let request = SolveRequest::new(Formula::ConservationOfMomentum)
//!     .given("m1", "2", "kg")
//!     .given("v1i", "5", "m/s")
//!     .given("m2", "3", "kg")
//!     .given("v2i", "-2", "m/s")
//!     .given("v1f", "1", "m/s")
//!     .unknown("v2f");
//!
//! let solution = solve(&request).unwrap();
//! assert_eq!(solution.formatted, "0.666667 m/s");
//!
//! for step in &solution.trace {
//!     println!("{}: {}", step.label, step.display());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`units`] - Quantity families and the unit registry
//! - [`equations`] - Formula descriptors, rearrangements and the formula catalog
//! - [`solver`] - The solve engine, requests, solutions and traces
//! - [`settings`] - Number formatting and trace options
//! - [`errors`] - Structured error types

pub mod equations;
pub mod errors;
pub mod settings;
pub mod solver;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use equations::{Formula, FormulaRegistry, ALL_FORMULAS};
pub use errors::{CalcError, CalcResult};
pub use settings::{NumberFormat, SolverSettings};
pub use solver::{solve, solve_with, FieldInput, Solution, SolveRequest, SolveResult, TraceStep};
pub use units::{QuantityFamily, UnitRegistry};
