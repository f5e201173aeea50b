//! Solve requests as built by a presentation layer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::equations::Formula;

/// One form field: the raw text the user typed and the unit they picked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldInput {
    /// Raw text, passed through unmodified (blank when left empty)
    #[serde(default)]
    pub raw: String,

    /// Selected unit symbol; `None` uses the variable's default unit
    #[serde(default)]
    pub unit: Option<String>,

    /// Explicitly marked as the value to solve for
    #[serde(default)]
    pub unknown: bool,
}

impl FieldInput {
    /// True when nothing but whitespace was entered
    pub fn is_blank(&self) -> bool {
        self.raw.trim().is_empty()
    }

    /// Selected unit, ignoring an empty selection
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }
}

/// Everything needed to solve one formula once.
///
/// # Example
///
/// ```rust
/// use calc_core::equations::Formula;
/// use calc_core::solver::SolveRequest;
///
/// let request = SolveRequest::new(Formula::VoltageDivider)
///     .given("Vin", "12", "V")
///     .given("R1", "1", "kΩ")
///     .given("R2", "2", "kΩ")
///     .unknown("Vout");
///
/// assert_eq!(request.inputs.len(), 4);
/// assert!(request.inputs["Vout"].unknown);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveRequest {
    pub formula: Formula,

    /// Field values keyed by variable symbol. Omitted symbols count as blank.
    #[serde(default)]
    pub inputs: BTreeMap<String, FieldInput>,

    /// Solve mode id; the unknown is the single blank among its candidates
    #[serde(default)]
    pub mode: Option<String>,

    /// Unit for the result; defaults to the unknown's selected or default unit
    #[serde(default)]
    pub display_unit: Option<String>,
}

impl SolveRequest {
    pub fn new(formula: Formula) -> Self {
        SolveRequest {
            formula,
            inputs: BTreeMap::new(),
            mode: None,
            display_unit: None,
        }
    }

    /// Supply a value in the given unit.
    pub fn given(mut self, symbol: &str, raw: impl Into<String>, unit: &str) -> Self {
        self.inputs.insert(
            symbol.to_string(),
            FieldInput {
                raw: raw.into(),
                unit: Some(unit.to_string()),
                unknown: false,
            },
        );
        self
    }

    /// Supply a value in the variable's default unit.
    pub fn given_raw(mut self, symbol: &str, raw: impl Into<String>) -> Self {
        self.inputs.insert(
            symbol.to_string(),
            FieldInput {
                raw: raw.into(),
                unit: None,
                unknown: false,
            },
        );
        self
    }

    /// Mark `symbol` as the value to solve for.
    pub fn unknown(mut self, symbol: &str) -> Self {
        self.inputs.insert(
            symbol.to_string(),
            FieldInput {
                unknown: true,
                ..Default::default()
            },
        );
        self
    }

    /// Leave `symbol` empty without marking it.
    pub fn blank(mut self, symbol: &str) -> Self {
        self.inputs.insert(symbol.to_string(), FieldInput::default());
        self
    }

    pub fn mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    pub fn display_unit(mut self, unit: impl Into<String>) -> Self {
        self.display_unit = Some(unit.into());
        self
    }

    /// The field for `symbol`, if one was submitted
    pub fn field(&self, symbol: &str) -> Option<&FieldInput> {
        self.inputs.get(symbol)
    }

    /// True when `symbol` was omitted or left blank
    pub fn is_blank(&self, symbol: &str) -> bool {
        self.field(symbol).map_or(true, |f| f.unknown || f.is_blank())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_detection() {
        let request = SolveRequest::new(Formula::LinearMomentum)
            .given("m", "  ", "kg")
            .given("v", "3", "m/s")
            .unknown("p");

        assert!(request.is_blank("m"));
        assert!(!request.is_blank("v"));
        assert!(request.is_blank("p"));
        assert!(request.is_blank("q"));
    }

    #[test]
    fn test_empty_unit_means_default() {
        let field = FieldInput {
            raw: "1".into(),
            unit: Some(" ".into()),
            unknown: false,
        };
        assert_eq!(field.unit(), None);
    }

    #[test]
    fn test_request_from_json() {
        let json = r#"{
            "formula": "voltage_divider",
            "inputs": {
                "Vin": { "raw": "12", "unit": "V" },
                "Vout": { "unknown": true }
            },
            "display_unit": "mV"
        }"#;
        let request: SolveRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.formula, Formula::VoltageDivider);
        assert!(request.inputs["Vout"].unknown);
        assert_eq!(request.inputs["Vin"].unit(), Some("V"));
        assert_eq!(request.display_unit.as_deref(), Some("mV"));
        assert!(request.mode.is_none());
    }
}
