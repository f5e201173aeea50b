//! Renders recorded derivation steps into user-facing trace lines.
//!
//! Each computed step is written as `symbol = formula = substituted = value`,
//! where the substituted form uses the operand values snapshotted when the
//! step was recorded.

use crate::equations::derivation::{render, symbolic};
use crate::equations::{DerivedStep, StepUnit};
use crate::errors::CalcResult;
use crate::settings::NumberFormat;
use crate::units::UnitRegistry;

use super::result::{TraceStep, DEFAULTED, GIVEN};

/// The solved variable as it should appear in the trace
pub(crate) struct Target<'a> {
    pub symbol: &'a str,
    pub base_unit: &'a str,
    pub display_value: f64,
    pub display_unit: &'a str,
}

pub(crate) struct TraceBuilder<'a> {
    units: &'a UnitRegistry,
    format: &'a NumberFormat,
    steps: Vec<TraceStep>,
}

impl<'a> TraceBuilder<'a> {
    pub fn new(units: &'a UnitRegistry, format: &'a NumberFormat) -> Self {
        TraceBuilder {
            units,
            format,
            steps: Vec::new(),
        }
    }

    /// List an input, in base units and as entered.
    pub fn input(&mut self, symbol: &str, base: f64, base_unit: &str, entered: f64, unit: &str, defaulted: bool) {
        let display_expression = if unit != base_unit {
            Some(format!("{} = {}", symbol, self.format.quantity(entered, unit)))
        } else {
            None
        };
        self.steps.push(TraceStep {
            label: if defaulted { DEFAULTED } else { GIVEN }.to_string(),
            base_expression: format!("{} = {}", symbol, self.format.quantity(base, base_unit)),
            display_expression,
            value: Some(base),
        });
    }

    /// Append the steps recorded while evaluating the rearrangement.
    pub fn derivation(&mut self, steps: &[DerivedStep], target: &Target<'_>) -> CalcResult<()> {
        for step in steps {
            match step {
                DerivedStep::Note(text) => self.steps.push(TraceStep::note(text.clone())),
                DerivedStep::Computed {
                    symbol,
                    label,
                    template,
                    operands,
                    value,
                    unit,
                } => {
                    let is_target = symbol == target.symbol;
                    let unit = if is_target {
                        target.base_unit
                    } else {
                        match unit {
                            StepUnit::Family(family) => self.units.base_unit(*family)?,
                            StepUnit::Custom(custom) => *custom,
                            StepUnit::None => "",
                        }
                    };

                    let result = self.format.quantity(*value, unit);
                    let base_expression = if operands.is_empty() {
                        format!("{} = {} = {}", symbol, symbolic(template), result)
                    } else {
                        let substituted = render(template, |name| {
                            operands
                                .iter()
                                .find(|(operand, _)| operand == name)
                                .map(|(_, v)| self.format.operand(*v))
                                .unwrap_or_else(|| name.to_string())
                        });
                        format!("{} = {} = {} = {}", symbol, symbolic(template), substituted, result)
                    };

                    let display_expression = if is_target && target.display_unit != target.base_unit {
                        Some(format!(
                            "{} = {}",
                            symbol,
                            self.format.quantity(target.display_value, target.display_unit)
                        ))
                    } else {
                        None
                    };

                    self.steps.push(TraceStep {
                        label: label.clone(),
                        base_expression,
                        display_expression,
                        value: Some(*value),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn finish(self) -> Vec<TraceStep> {
        self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::QuantityFamily;

    fn computed(symbol: &str, template: &str, operands: &[(&str, f64)], value: f64, unit: StepUnit) -> DerivedStep {
        DerivedStep::Computed {
            symbol: symbol.to_string(),
            label: format!("Compute {}", symbol),
            template: template.to_string(),
            operands: operands.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            value,
            unit,
        }
    }

    #[test]
    fn test_substituted_expression() {
        let format = NumberFormat::default();
        let mut builder = TraceBuilder::new(UnitRegistry::global(), &format);
        let steps = vec![computed(
            "v2f",
            "({p} − {m1}·{v1f})/{m2}",
            &[("p", 4.0), ("m1", 2.0), ("v1f", -1.0), ("m2", 3.0)],
            2.0,
            StepUnit::None,
        )];
        let target = Target {
            symbol: "v2f",
            base_unit: "m/s",
            display_value: 7.2,
            display_unit: "km/h",
        };
        builder.derivation(&steps, &target).unwrap();
        let trace = builder.finish();

        assert_eq!(trace[0].base_expression, "v2f = (p − m1·v1f)/m2 = (4 − 2·(-1))/3 = 2 m/s");
        assert_eq!(trace[0].display_expression.as_deref(), Some("v2f = 7.2 km/h"));
        assert_eq!(trace[0].value, Some(2.0));
    }

    #[test]
    fn test_intermediate_units() {
        let format = NumberFormat::default();
        let mut builder = TraceBuilder::new(UnitRegistry::global(), &format);
        let steps = vec![
            computed("A", "π·{d}²/4", &[("d", 0.05)], 0.001963495, StepUnit::Family(QuantityFamily::Area)),
            computed("P1", "{I}²·{R1}", &[("I", 0.004), ("R1", 1000.0)], 0.016, StepUnit::Custom("W")),
            DerivedStep::Note("clamped".to_string()),
        ];
        let target = Target {
            symbol: "Q",
            base_unit: "m³/s",
            display_value: 1.0,
            display_unit: "m³/s",
        };
        builder.derivation(&steps, &target).unwrap();
        let trace = builder.finish();

        assert!(trace[0].base_expression.ends_with("= 0.0019635 m²"));
        assert!(trace[0].display_expression.is_none());
        assert!(trace[1].base_expression.ends_with("0.016 W"));
        assert_eq!(trace[2], TraceStep::note("clamped"));
    }

    #[test]
    fn test_input_lines() {
        let format = NumberFormat::default();
        let mut builder = TraceBuilder::new(UnitRegistry::global(), &format);
        builder.input("R1", 1000.0, "Ω", 1.0, "kΩ", false);
        builder.input("Cd", 0.61, "1", 0.61, "1", true);
        let trace = builder.finish();

        assert_eq!(trace[0].label, GIVEN);
        assert_eq!(trace[0].base_expression, "R1 = 1000 Ω");
        assert_eq!(trace[0].display_expression.as_deref(), Some("R1 = 1 kΩ"));
        assert_eq!(trace[1].label, DEFAULTED);
        assert_eq!(trace[1].base_expression, "Cd = 0.61");
        assert!(trace[1].display_expression.is_none());
    }
}
