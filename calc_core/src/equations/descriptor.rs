//! # Formula Descriptors
//!
//! A [`FormulaDescriptor`] is one physical law: its variables (each tagged
//! with a [`QuantityFamily`] and a [`Constraint`]) and one [`Rearrangement`]
//! per variable that can be left unknown. Descriptors are built once by the
//! formula registry and never change afterwards.
//!
//! Each descriptor carries a ground-truth sample assignment in base units.
//! [`FormulaDescriptor::validate`] runs every rearrangement against it at load
//! time, so a wrong rearrangement or a trace template naming an undeclared
//! variable is caught before any solve runs.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::errors::{CalcError, CalcResult};
use crate::units::{QuantityFamily, UnitRegistry};

use super::derivation::{placeholders, BaseValues, Derivation, DerivedStep, StepUnit};
use super::registry::Formula;

/// Relative tolerance for the load-time sample check
const SAMPLE_TOLERANCE: f64 = 1e-9;

// ============================================================================
// Constraints
// ============================================================================

/// Sign/range rule a variable's base-unit value must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Constraint {
    /// Any finite value (velocities, spreads)
    Signed,
    /// Strictly greater than zero (masses, resistances, areas)
    Positive,
    /// Zero or greater (rates)
    NonNegative,
    /// In (0, 1] (discharge coefficients)
    Coefficient,
    /// A fraction in [0, 1], entered as 0-100 %
    Percentage,
    /// Inclusive range in base units
    Range { min: f64, max: f64 },
}

impl Constraint {
    fn holds(&self, value: f64) -> bool {
        match *self {
            Constraint::Signed => value.is_finite(),
            Constraint::Positive => value > 0.0,
            Constraint::NonNegative => value >= 0.0,
            Constraint::Coefficient => value > 0.0 && value <= 1.0,
            Constraint::Percentage => (0.0..=1.0).contains(&value),
            Constraint::Range { min, max } => value >= min && value <= max,
        }
    }

    /// Check a user-supplied value.
    pub fn check_input(&self, field: &str, value: f64) -> CalcResult<()> {
        if self.holds(value) {
            return Ok(());
        }
        Err(match *self {
            Constraint::Positive => CalcError::non_positive_input(field, value),
            Constraint::Coefficient => CalcError::invalid_coefficient(field, value),
            _ => CalcError::out_of_range(field, value, self.describe()),
        })
    }

    /// Check a computed value.
    pub fn check_result(&self, field: &str, value: f64) -> CalcResult<()> {
        if self.holds(value) {
            Ok(())
        } else {
            Err(CalcError::implausible_result(field, value, self.describe()))
        }
    }

    pub fn describe(&self) -> String {
        match *self {
            Constraint::Signed => "any value".to_string(),
            Constraint::Positive => "must be greater than zero".to_string(),
            Constraint::NonNegative => "must not be negative".to_string(),
            Constraint::Coefficient => "must be in (0, 1]".to_string(),
            Constraint::Percentage => "must be between 0 and 100 %".to_string(),
            Constraint::Range { min, max } => format!("must be between {} and {}", min, max),
        }
    }
}

// ============================================================================
// Variables
// ============================================================================

/// Value used when a variable is left blank.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DefaultValue {
    pub value: f64,
    pub unit: &'static str,
}

/// A variable of a formula.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormulaVariable {
    /// Symbol used in templates and requests (e.g., "v1i")
    pub symbol: &'static str,
    /// Human-readable name (e.g., "Initial velocity of object 1")
    pub name: &'static str,
    pub family: QuantityFamily,
    pub constraint: Constraint,
    /// Unit shown when the caller does not pick one
    pub unit: &'static str,
    pub default: Option<DefaultValue>,
}

impl FormulaVariable {
    pub fn new(
        symbol: &'static str,
        name: &'static str,
        family: QuantityFamily,
        constraint: Constraint,
        unit: &'static str,
    ) -> Self {
        FormulaVariable {
            symbol,
            name,
            family,
            constraint,
            unit,
            default: None,
        }
    }

    /// Value substituted when the field is left blank.
    pub fn with_default(mut self, value: f64, unit: &'static str) -> Self {
        self.default = Some(DefaultValue { value, unit });
        self
    }
}

// ============================================================================
// Rearrangements
// ============================================================================

/// Base-unit evaluator used by preconditions
pub type ValueFn = fn(&BaseValues) -> CalcResult<f64>;

/// Compute function of a rearrangement
pub type ComputeFn = fn(&mut Derivation) -> CalcResult<f64>;

/// Supplementary steps recorded once the target is known
pub type FollowupFn = fn(&mut Derivation) -> CalcResult<()>;

/// Domain check run before a rearrangement is evaluated.
#[derive(Clone)]
pub enum Precondition {
    /// `denominator` must not evaluate to zero
    NonZero {
        denominator: &'static str,
        eval: ValueFn,
    },
    /// `holds` must be true, otherwise `field` is out of range
    Requires {
        field: &'static str,
        reason: &'static str,
        holds: fn(&BaseValues) -> CalcResult<bool>,
    },
}

impl Precondition {
    pub fn check(&self, values: &BaseValues) -> CalcResult<()> {
        match self {
            Precondition::NonZero { denominator, eval } => {
                if eval(values)? == 0.0 {
                    return Err(CalcError::division_by_zero(*denominator));
                }
            }
            Precondition::Requires { field, reason, holds } => {
                if !holds(values)? {
                    return Err(CalcError::out_of_range(*field, values.get(field)?, *reason));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precondition::NonZero { denominator, .. } => write!(f, "NonZero({})", denominator),
            Precondition::Requires { field, reason, .. } => write!(f, "Requires({}: {})", field, reason),
        }
    }
}

/// Closed-form solution for one target variable.
#[derive(Clone)]
pub struct Rearrangement {
    pub target: &'static str,
    /// Right-hand side as a template, e.g. `({m1}·{v1i} - {m1}·{v1f}) / {m2}`
    pub formula: &'static str,
    pub preconditions: Vec<Precondition>,
    compute: ComputeFn,
    followup: Option<FollowupFn>,
}

impl Rearrangement {
    pub fn new(target: &'static str, formula: &'static str, compute: ComputeFn) -> Self {
        Rearrangement {
            target,
            formula,
            preconditions: Vec::new(),
            compute,
            followup: None,
        }
    }

    /// Fail with `DivisionByZero` when `eval` is zero.
    pub fn nonzero(mut self, denominator: &'static str, eval: ValueFn) -> Self {
        self.preconditions.push(Precondition::NonZero { denominator, eval });
        self
    }

    /// Fail with `OutOfRange` on `field` unless `holds` is true.
    pub fn requires(
        mut self,
        field: &'static str,
        reason: &'static str,
        holds: fn(&BaseValues) -> CalcResult<bool>,
    ) -> Self {
        self.preconditions.push(Precondition::Requires { field, reason, holds });
        self
    }

    /// Record derived quantities that depend on the solved target.
    pub fn then(mut self, followup: FollowupFn) -> Self {
        self.followup = Some(followup);
        self
    }

    /// Evaluate for the target's base-unit value.
    pub fn evaluate(&self, values: &BaseValues) -> CalcResult<f64> {
        self.evaluate_traced(values).map(|(value, _)| value)
    }

    /// Evaluate and return the recorded derivation.
    ///
    /// The target's own step is recorded right after the intermediates it
    /// depends on and before any follow-up quantities.
    pub fn evaluate_traced(&self, values: &BaseValues) -> CalcResult<(f64, Vec<DerivedStep>)> {
        for precondition in &self.preconditions {
            precondition.check(values)?;
        }

        let mut derivation = Derivation::new(values);
        let value = (self.compute)(&mut derivation)?;
        if !value.is_finite() {
            return Err(CalcError::implausible_result(
                self.target,
                value,
                "the result is not a finite number",
            ));
        }

        let label = format!("Solve for {}", self.target);
        derivation.step(self.target, &label, self.formula, value, StepUnit::None)?;
        if let Some(followup) = self.followup {
            followup(&mut derivation)?;
        }
        Ok((value, derivation.into_steps()))
    }
}

impl fmt::Debug for Rearrangement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rearrangement")
            .field("target", &self.target)
            .field("formula", &self.formula)
            .field("preconditions", &self.preconditions)
            .finish()
    }
}

// ============================================================================
// Modes and descriptors
// ============================================================================

/// A named choice of unknown offered by the presentation layer.
///
/// Exactly one of `candidates` must be left blank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveMode {
    pub id: &'static str,
    pub label: &'static str,
    pub candidates: Vec<&'static str>,
}

/// A physical law with its variables and rearrangements.
#[derive(Debug, Clone)]
pub struct FormulaDescriptor {
    pub id: Formula,
    pub variables: Vec<FormulaVariable>,
    pub rearrangements: Vec<Rearrangement>,
    pub modes: Vec<SolveMode>,
    /// Ground-truth assignment in base units
    pub sample: Vec<(&'static str, f64)>,
}

impl FormulaDescriptor {
    pub fn new(id: Formula) -> Self {
        FormulaDescriptor {
            id,
            variables: Vec::new(),
            rearrangements: Vec::new(),
            modes: Vec::new(),
            sample: Vec::new(),
        }
    }

    pub fn variable(mut self, variable: FormulaVariable) -> Self {
        self.variables.push(variable);
        self
    }

    pub fn rearrangement(mut self, rearrangement: Rearrangement) -> Self {
        self.rearrangements.push(rearrangement);
        self
    }

    pub fn mode(mut self, id: &'static str, label: &'static str, candidates: &[&'static str]) -> Self {
        self.modes.push(SolveMode {
            id,
            label,
            candidates: candidates.to_vec(),
        });
        self
    }

    pub fn sample(mut self, sample: &[(&'static str, f64)]) -> Self {
        self.sample = sample.to_vec();
        self
    }

    /// Catalog key of the formula (e.g., "voltage_divider")
    pub fn key(&self) -> &'static str {
        self.id.key()
    }

    pub fn find_variable(&self, symbol: &str) -> Option<&FormulaVariable> {
        self.variables.iter().find(|v| v.symbol == symbol)
    }

    /// The rearrangement solving for `unknown`.
    pub fn rearrangement_for(&self, unknown: &str) -> CalcResult<&Rearrangement> {
        self.rearrangements
            .iter()
            .find(|r| r.target == unknown)
            .ok_or_else(|| CalcError::not_solvable(self.key(), unknown))
    }

    /// Symbols that can be solved for, in declaration order
    pub fn solvable(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rearrangements.iter().map(|r| r.target)
    }

    /// Candidate unknowns of mode `id`.
    ///
    /// Every solvable symbol is also an implicit single-candidate mode.
    pub fn mode_candidates(&self, id: &str) -> CalcResult<Vec<&'static str>> {
        if let Some(mode) = self.modes.iter().find(|m| m.id == id) {
            return Ok(mode.candidates.clone());
        }
        self.solvable()
            .find(|s| *s == id)
            .map(|s| vec![s])
            .ok_or_else(|| CalcError::not_solvable(self.key(), id))
    }

    pub fn sample_values(&self) -> BaseValues {
        BaseValues::from_pairs(&self.sample)
    }

    /// Check the descriptor's wiring against `units`.
    pub fn validate(&self, units: &UnitRegistry) -> CalcResult<()> {
        let source = format!("formula {}", self.key());
        let fail = |reason: String| CalcError::configuration(source.clone(), reason);

        let mut symbols = HashSet::new();
        for variable in &self.variables {
            if !symbols.insert(variable.symbol) {
                return Err(fail(format!("variable '{}' is declared twice", variable.symbol)));
            }
            if placeholders(&format!("{{{}}}", variable.symbol)).is_err() {
                return Err(fail(format!("'{}' is not a valid symbol", variable.symbol)));
            }
            units
                .unit(variable.family, variable.unit)
                .map_err(|e| fail(e.to_string()))?;
            if let Some(default) = variable.default {
                let base = units
                    .to_base(default.value, variable.family, default.unit)
                    .map_err(|e| fail(e.to_string()))?;
                if variable.constraint.check_input(variable.symbol, base).is_err() {
                    return Err(fail(format!("default of '{}' violates its constraint", variable.symbol)));
                }
            }
        }

        let mut targets = HashSet::new();
        for rearrangement in &self.rearrangements {
            if !symbols.contains(rearrangement.target) {
                return Err(fail(format!("rearrangement targets undeclared '{}'", rearrangement.target)));
            }
            if !targets.insert(rearrangement.target) {
                return Err(fail(format!("'{}' has two rearrangements", rearrangement.target)));
            }
            let names = placeholders(rearrangement.formula).map_err(|e| fail(e.to_string()))?;
            if names.contains(&rearrangement.target) {
                return Err(fail(format!("rearrangement for '{}' references itself", rearrangement.target)));
            }
        }

        for mode in &self.modes {
            if mode.candidates.is_empty() {
                return Err(fail(format!("mode '{}' has no candidates", mode.id)));
            }
            if let Some(bad) = mode.candidates.iter().find(|c| !targets.contains(*c)) {
                return Err(fail(format!("mode '{}' offers unsolvable '{}'", mode.id, bad)));
            }
        }

        let sample = self.sample_values();
        for variable in &self.variables {
            let value = sample
                .get(variable.symbol)
                .map_err(|_| fail(format!("sample has no value for '{}'", variable.symbol)))?;
            if variable.constraint.check_input(variable.symbol, value).is_err() {
                return Err(fail(format!("sample value of '{}' violates its constraint", variable.symbol)));
            }
        }

        for rearrangement in &self.rearrangements {
            let expected = sample.get(rearrangement.target)?;
            let mut inputs = sample.clone();
            inputs.remove(rearrangement.target);
            let (value, _) = rearrangement
                .evaluate_traced(&inputs)
                .map_err(|e| fail(format!("solving '{}': {}", rearrangement.target, e)))?;
            if (value - expected).abs() > SAMPLE_TOLERANCE * expected.abs().max(f64::MIN_POSITIVE) {
                return Err(fail(format!(
                    "solving '{}' gives {} but the sample has {}",
                    rearrangement.target, value, expected
                )));
            }
        }

        Ok(())
    }
}
