//! # Vector Geometry
//!
//! Angle between two vectors in two or three dimensions:
//!
//! ```text
//! θ = arccos(a·b / (|a|·|b|))
//! ```
//!
//! The z components default to zero, giving the planar case. A zero-length
//! vector has no direction and fails with `DivisionByZero`. Rounding can push
//! the cosine of (anti)parallel vectors just outside [-1, 1]; it is clamped
//! and the clamp is noted in the trace.

use crate::errors::CalcResult;
use crate::units::QuantityFamily;

use super::derivation::{BaseValues, StepUnit};
use super::descriptor::{Constraint, FormulaDescriptor, FormulaVariable, Rearrangement};
use super::registry::Formula;

/// Dot product of two 3-vectors
#[inline]
pub fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Euclidean length of a 3-vector
#[inline]
pub fn magnitude(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

fn vector(values: &BaseValues, prefix: char) -> CalcResult<[f64; 3]> {
    Ok([
        values.get(&format!("{}x", prefix))?,
        values.get(&format!("{}y", prefix))?,
        values.get(&format!("{}z", prefix))?,
    ])
}

fn component(symbol: &'static str, name: &'static str) -> FormulaVariable {
    FormulaVariable::new(symbol, name, QuantityFamily::Dimensionless, Constraint::Signed, "1")
}

/// Angle between vectors `a` and `b`.
pub fn vector_angle() -> FormulaDescriptor {
    FormulaDescriptor::new(Formula::VectorAngle)
        .variable(component("ax", "Vector a, x component"))
        .variable(component("ay", "Vector a, y component"))
        .variable(component("az", "Vector a, z component").with_default(0.0, "1"))
        .variable(component("bx", "Vector b, x component"))
        .variable(component("by", "Vector b, y component"))
        .variable(component("bz", "Vector b, z component").with_default(0.0, "1"))
        .variable(FormulaVariable::new(
            "theta",
            "Angle between the vectors",
            QuantityFamily::Angle,
            Constraint::Range {
                min: 0.0,
                max: std::f64::consts::PI,
            },
            "°",
        ))
        .rearrangement(
            Rearrangement::new("theta", "arccos({cos})", |d| {
                let a = [d.get("ax")?, d.get("ay")?, d.get("az")?];
                let b = [d.get("bx")?, d.get("by")?, d.get("bz")?];

                let ab = d.step("dot", "Dot product", "{ax}·{bx} + {ay}·{by} + {az}·{bz}", dot(a, b), StepUnit::None)?;
                let len_a = d.step("len_a", "Length of a", "√({ax}² + {ay}² + {az}²)", magnitude(a), StepUnit::None)?;
                let len_b = d.step("len_b", "Length of b", "√({bx}² + {by}² + {bz}²)", magnitude(b), StepUnit::None)?;

                let raw = ab / (len_a * len_b);
                let cos = raw.clamp(-1.0, 1.0);
                if cos != raw {
                    d.note(format!("cos θ = {} rounded outside [-1, 1], clamped to {}", raw, cos));
                }
                d.step("cos", "Cosine of the angle", "{dot}/({len_a}·{len_b})", cos, StepUnit::None)?;
                Ok(cos.acos())
            })
            .nonzero("|a|·|b|", |v| Ok(magnitude(vector(v, 'a')?) * magnitude(vector(v, 'b')?))),
        )
        .sample(&[
            ("ax", 1.0),
            ("ay", 0.0),
            ("az", 0.0),
            ("bx", 1.0),
            ("by", 1.0),
            ("bz", 0.0),
            ("theta", std::f64::consts::FRAC_PI_4),
        ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::DerivedStep;
    use crate::units::UnitRegistry;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn solve(pairs: &[(&str, f64)]) -> CalcResult<(f64, Vec<DerivedStep>)> {
        let values = BaseValues::from_pairs(pairs);
        vector_angle().rearrangement_for("theta")?.evaluate_traced(&values)
    }

    #[test]
    fn test_descriptor_validates() {
        vector_angle().validate(UnitRegistry::global()).unwrap();
    }

    #[test]
    fn test_perpendicular() {
        let (theta, _) = solve(&[("ax", 3.0), ("ay", 0.0), ("az", 0.0), ("bx", 0.0), ("by", 2.0), ("bz", 0.0)]).unwrap();
        assert!((theta - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_zero_vector_is_division_by_zero() {
        let err = solve(&[("ax", 0.0), ("ay", 0.0), ("az", 0.0), ("bx", 1.0), ("by", 2.0), ("bz", 3.0)]).unwrap_err();
        assert_eq!(err.error_code(), "DIVISION_BY_ZERO");
    }

    #[test]
    fn test_antiparallel_stays_in_domain() {
        let (theta, steps) =
            solve(&[("ax", 0.1), ("ay", 0.2), ("az", 0.3), ("bx", -0.1), ("by", -0.2), ("bz", -0.3)]).unwrap();
        assert!((theta - PI).abs() < 1e-7);
        assert!(theta.is_finite());
        // Either exact or clamped with a note; never NaN
        assert!(steps.iter().all(|s| !matches!(s, DerivedStep::Computed { value, .. } if value.is_nan())));
    }
}
