//! # Units
//!
//! Quantity families and the unit registry that converts between a unit and
//! its family's base unit.
//!
//! - [`family`] - Quantity families (length, pressure, temperature, ...)
//! - [`registry`] - The unit table and conversion functions
//!
//! Linear units convert as `base = raw * factor`. Affine units (Celsius,
//! Fahrenheit, gauge pressure) convert as `base = raw * scale + offset`.

pub mod family;
pub mod registry;

pub use family::QuantityFamily;
pub use registry::{Conversion, Unit, UnitRegistry, EMBEDDED_UNITS};
