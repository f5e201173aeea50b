//! Solve results.

use serde::{Deserialize, Serialize};

use crate::equations::Formula;
use crate::errors::CalcResult;

/// One line of the derivation shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceStep {
    /// Short description (e.g., "Orifice area", "Given")
    pub label: String,

    /// Expression in base units, with the numbers the engine used
    pub base_expression: String,

    /// The same quantity in the unit the user sees, when that differs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_expression: Option<String>,

    /// Base-unit value, absent for notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl TraceStep {
    pub fn note(text: impl Into<String>) -> Self {
        TraceStep {
            label: "Note".to_string(),
            base_expression: text.into(),
            display_expression: None,
            value: None,
        }
    }

    /// The expression a reader sees first
    pub fn display(&self) -> &str {
        self.display_expression.as_deref().unwrap_or(&self.base_expression)
    }
}

/// A successful solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub formula: Formula,

    /// Symbol that was solved for
    pub unknown: String,

    pub value_base: f64,
    pub base_unit: String,

    /// Value in the display unit
    pub value: f64,
    pub unit: String,

    /// Value and unit formatted for display (e.g., "14 kΩ")
    pub formatted: String,

    pub trace: Vec<TraceStep>,
}

impl Solution {
    /// Steps other than the given/defaulted inputs
    pub fn derivation(&self) -> impl Iterator<Item = &TraceStep> {
        self.trace.iter().filter(|s| s.label != GIVEN && s.label != DEFAULTED)
    }
}

/// Label of a trace step listing a supplied input
pub const GIVEN: &str = "Given";

/// Label of a trace step listing an input filled from its default
pub const DEFAULTED: &str = "Default";

/// Outcome of a solve: the solution or the first failure.
pub type SolveResult = CalcResult<Solution>;
