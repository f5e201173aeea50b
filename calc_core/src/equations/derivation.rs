//! # Derivation Recorder
//!
//! A rearrangement computes its target while writing every intermediate
//! quantity into a [`Derivation`]. The trace is rendered later from these
//! records, so the numbers shown to the user are exactly the numbers the
//! engine computed.
//!
//! Expressions are templates: `{name}` refers to an input variable or to an
//! earlier intermediate. Rendering replaces each placeholder with either the
//! symbol (`A = π·(d/2)²`) or the recorded value (`A = π·(0.05/2)²`).
//!
//! ```rust
//! use calc_core::equations::{BaseValues, Derivation, StepUnit};
//! use calc_core::units::QuantityFamily;
//!
//! let values = BaseValues::from_pairs(&[("d", 0.05)]);
//! let mut derivation = Derivation::new(&values);
//! let d = derivation.get("d").unwrap();
//! let area = derivation
//!     .step("A", "Orifice area", "π·({d}/2)²", std::f64::consts::PI * (d / 2.0).powi(2),
//!           StepUnit::Family(QuantityFamily::Area))
//!     .unwrap();
//! assert!((area - 0.0019634954).abs() < 1e-9);
//! assert_eq!(derivation.steps().len(), 1);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::units::QuantityFamily;

// ============================================================================
// Base values
// ============================================================================

/// Variable values already normalized to base units, keyed by symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseValues(BTreeMap<String, f64>);

impl BaseValues {
    pub fn new() -> Self {
        BaseValues(BTreeMap::new())
    }

    pub fn from_pairs(pairs: &[(&str, f64)]) -> Self {
        BaseValues(pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect())
    }

    pub fn insert(&mut self, symbol: impl Into<String>, value: f64) {
        self.0.insert(symbol.into(), value);
    }

    pub fn remove(&mut self, symbol: &str) -> Option<f64> {
        self.0.remove(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.0.contains_key(symbol)
    }

    /// Value of `symbol`. A missing symbol is a wiring bug, not a user error.
    pub fn get(&self, symbol: &str) -> CalcResult<f64> {
        self.0
            .get(symbol)
            .copied()
            .ok_or_else(|| CalcError::internal(format!("no value for '{}'", symbol)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

// ============================================================================
// Steps
// ============================================================================

/// Unit attached to a recorded quantity, expressed in base units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum StepUnit {
    /// Base unit of a quantity family
    Family(QuantityFamily),
    /// A unit outside the registry (e.g., "W" for power)
    Custom(&'static str),
    None,
}

/// One recorded entry of a derivation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DerivedStep {
    Computed {
        symbol: String,
        label: String,
        template: String,
        /// Placeholder values at the moment the step was recorded
        operands: Vec<(String, f64)>,
        value: f64,
        unit: StepUnit,
    },
    Note(String),
}

/// Recorder handed to a rearrangement's compute function.
#[derive(Debug, Clone)]
pub struct Derivation {
    values: BaseValues,
    steps: Vec<DerivedStep>,
}

impl Derivation {
    pub fn new(values: &BaseValues) -> Self {
        Derivation {
            values: values.clone(),
            steps: Vec::new(),
        }
    }

    /// Base value of an input or of an earlier intermediate
    pub fn get(&self, symbol: &str) -> CalcResult<f64> {
        self.values.get(symbol)
    }

    /// Record an intermediate quantity and return its value.
    ///
    /// Fails with an internal error when `template` references a symbol that
    /// has no value yet.
    pub fn step(
        &mut self,
        symbol: &str,
        label: &str,
        template: &str,
        value: f64,
        unit: StepUnit,
    ) -> CalcResult<f64> {
        let operands = self.operands(template)?;
        self.values.insert(symbol, value);
        self.steps.push(DerivedStep::Computed {
            symbol: symbol.to_string(),
            label: label.to_string(),
            template: template.to_string(),
            operands,
            value,
            unit,
        });
        Ok(value)
    }

    /// Record a remark (clamping, classification, ...)
    pub fn note(&mut self, text: impl Into<String>) {
        self.steps.push(DerivedStep::Note(text.into()));
    }

    /// Snapshot the current value of every placeholder in `template`
    pub fn operands(&self, template: &str) -> CalcResult<Vec<(String, f64)>> {
        placeholders(template)?
            .into_iter()
            .map(|name| {
                self.values.get(name).map(|v| (name.to_string(), v)).map_err(|_| {
                    CalcError::internal(format!("'{}' references undefined '{}'", template, name))
                })
            })
            .collect()
    }

    pub fn steps(&self) -> &[DerivedStep] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<DerivedStep> {
        self.steps
    }
}

// ============================================================================
// Templates
// ============================================================================

/// Placeholder names in `template`, in order of appearance.
pub fn placeholders(template: &str) -> CalcResult<Vec<&str>> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or_else(|| CalcError::internal(format!("unclosed placeholder in '{}'", template)))?;
        let name = &after[..close];
        if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(CalcError::internal(format!(
                "invalid placeholder '{{{}}}' in '{}'",
                name, template
            )));
        }
        names.push(name);
        rest = &after[close + 1..];
    }
    Ok(names)
}

/// Replace each `{name}` in `template` with `substitute(name)`.
///
/// Templates are validated when they are recorded, so a malformed
/// placeholder here is copied through unchanged.
pub fn render(template: &str, mut substitute: impl FnMut(&str) -> String) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                out.push_str(&substitute(&after[..close]));
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Template with every placeholder replaced by its symbol
pub fn symbolic(template: &str) -> String {
    render(template, |name| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_in_order() {
        let names = placeholders("({m1}·{v1i} + {m2}·{v2i}) / {m2}").unwrap();
        assert_eq!(names, vec!["m1", "v1i", "m2", "v2i", "m2"]);
    }

    #[test]
    fn test_placeholders_reject_malformed() {
        assert!(placeholders("{m1").is_err());
        assert!(placeholders("{} + 1").is_err());
        assert!(placeholders("{m 1}").is_err());
    }

    #[test]
    fn test_symbolic_and_substituted_render() {
        let template = "{R2}/({R1} + {R2})";
        assert_eq!(symbolic(template), "R2/(R1 + R2)");
        let rendered = render(template, |name| if name == "R1" { "1000".into() } else { "2000".into() });
        assert_eq!(rendered, "2000/(1000 + 2000)");
    }

    #[test]
    fn test_step_snapshots_operands_and_extends_values() {
        let values = BaseValues::from_pairs(&[("Vin", 12.0), ("R1", 1000.0), ("R2", 2000.0)]);
        let mut derivation = Derivation::new(&values);
        derivation
            .step("Rt", "Total resistance", "{R1} + {R2}", 3000.0, StepUnit::Family(QuantityFamily::Resistance))
            .unwrap();
        derivation
            .step("I", "Divider current", "{Vin}/{Rt}", 0.004, StepUnit::Custom("A"))
            .unwrap();

        assert_eq!(derivation.get("Rt").unwrap(), 3000.0);
        match &derivation.steps()[1] {
            DerivedStep::Computed { operands, .. } => {
                assert_eq!(operands, &vec![("Vin".to_string(), 12.0), ("Rt".to_string(), 3000.0)]);
            }
            other => panic!("unexpected step {:?}", other),
        }
    }

    #[test]
    fn test_step_with_undefined_operand_is_internal_error() {
        let mut derivation = Derivation::new(&BaseValues::new());
        let err = derivation.step("x", "x", "{y} + 1", 1.0, StepUnit::None).unwrap_err();
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_missing_base_value() {
        let values = BaseValues::from_pairs(&[("m1", 2.0)]);
        assert_eq!(values.get("m1").unwrap(), 2.0);
        assert!(values.get("m2").is_err());
    }
}
