//! # Solver Engine
//!
//! Turns a [`SolveRequest`] into a [`Solution`]:
//!
//! 1. Pick the unknown: the explicitly marked field, the single blank among a
//!    mode's candidates, or the single blank variable without a default
//! 2. Parse every other field (blank fields fall back to their defaults)
//! 3. Normalize to base units and check each variable's constraint
//! 4. Select and evaluate the rearrangement for the unknown
//! 5. Check the result against the unknown's own constraint
//! 6. Convert to the display unit and render the trace
//!
//! The first failure ends the solve; nothing partial is returned.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::equations::Formula;
//! use calc_core::solver::{solve, SolveRequest};
//!
//! let request = SolveRequest::new(Formula::VoltageDivider)
//!     .given("Vin", "12", "V")
//!     .given("Vout", "5", "V")
//!     .given("R2", "10", "kΩ")
//!     .unknown("R1")
//!     .display_unit("kΩ");
//!
//! let solution = solve(&request).unwrap();
//! assert!((solution.value - 14.0).abs() < 1e-9);
//! assert_eq!(solution.formatted, "14 kΩ");
//! ```

pub mod format;
pub mod request;
pub mod result;
pub(crate) mod trace;

pub use request::{FieldInput, SolveRequest};
pub use result::{Solution, SolveResult, TraceStep, DEFAULTED, GIVEN};

use once_cell::sync::Lazy;
use tracing::{debug, trace};

use crate::equations::{BaseValues, FormulaDescriptor, FormulaVariable};
use crate::errors::{CalcError, CalcResult};
use crate::settings::SolverSettings;
use crate::units::UnitRegistry;

use trace::{Target, TraceBuilder};

static DEFAULT_SETTINGS: Lazy<SolverSettings> = Lazy::new(SolverSettings::default);

/// Solve with default settings.
pub fn solve(request: &SolveRequest) -> SolveResult {
    solve_with(request, &DEFAULT_SETTINGS)
}

/// Solve with explicit presentation settings.
pub fn solve_with(request: &SolveRequest, settings: &SolverSettings) -> SolveResult {
    let formula = request.formula;
    debug!(formula = %formula, mode = ?request.mode, "solve started");

    run(request, settings).map_err(|e| {
        debug!(formula = %formula, code = e.error_code(), field = ?e.field(), "solve failed: {}", e);
        e
    })
}

/// A field after parsing, before unit lookup
struct Parsed<'a> {
    variable: &'a FormulaVariable,
    entered: f64,
    unit: &'a str,
    defaulted: bool,
}

/// A field after normalization to base units
struct Resolved<'a> {
    variable: &'a FormulaVariable,
    base: f64,
    entered: f64,
    unit: String,
    defaulted: bool,
}

fn run(request: &SolveRequest, settings: &SolverSettings) -> SolveResult {
    let units = UnitRegistry::global();
    let descriptor = request.formula.descriptor();

    if let Some(symbol) = request.inputs.keys().find(|s| descriptor.find_variable(s).is_none()) {
        return Err(CalcError::unknown_variable(descriptor.key(), symbol.as_str()));
    }

    let unknown = select_unknown(descriptor, request)?;
    debug!(formula = %request.formula, unknown = unknown.symbol, "unknown selected");

    let mut parsed = Vec::with_capacity(descriptor.variables.len());
    for variable in descriptor.variables.iter().filter(|v| v.symbol != unknown.symbol) {
        parsed.push(parse(variable, request)?);
    }
    let resolved = parsed
        .into_iter()
        .map(|field| normalize(field, units))
        .collect::<CalcResult<Vec<_>>>()?;

    let mut values = BaseValues::new();
    for field in &resolved {
        field.variable.constraint.check_input(field.variable.symbol, field.base)?;
        trace!(symbol = field.variable.symbol, base = field.base, "normalized input");
        values.insert(field.variable.symbol, field.base);
    }

    let rearrangement = descriptor.rearrangement_for(unknown.symbol)?;
    let (value_base, steps) = rearrangement.evaluate_traced(&values)?;
    unknown.constraint.check_result(unknown.symbol, value_base)?;

    let display_unit = request
        .display_unit
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .or_else(|| request.field(unknown.symbol).and_then(FieldInput::unit))
        .unwrap_or(unknown.unit);
    let display = units.unit(unknown.family, display_unit)?;
    let value = display.from_base(value_base);
    let base_unit = units.base_unit(unknown.family)?;

    let format = &settings.number_format;
    let mut builder = TraceBuilder::new(units, format);
    if settings.include_given_values {
        for field in &resolved {
            builder.input(
                field.variable.symbol,
                field.base,
                units.base_unit(field.variable.family)?,
                field.entered,
                &field.unit,
                field.defaulted,
            );
        }
    }
    builder.derivation(
        &steps,
        &Target {
            symbol: unknown.symbol,
            base_unit,
            display_value: value,
            display_unit: &display.symbol,
        },
    )?;

    Ok(Solution {
        formula: request.formula,
        unknown: unknown.symbol.to_string(),
        value_base,
        base_unit: base_unit.to_string(),
        value,
        unit: display.symbol.clone(),
        formatted: format.quantity(value, &display.symbol),
        trace: builder.finish(),
    })
}

/// Decide which variable is solved for.
fn select_unknown<'d>(descriptor: &'d FormulaDescriptor, request: &SolveRequest) -> CalcResult<&'d FormulaVariable> {
    let marked: Vec<&str> = request
        .inputs
        .iter()
        .filter(|(_, f)| f.unknown)
        .map(|(s, _)| s.as_str())
        .collect();

    let symbol = if let Some(mode) = request.mode.as_deref() {
        let candidates = descriptor.mode_candidates(mode.trim())?;
        if let Some(outside) = marked.iter().find(|s| !candidates.contains(*s)) {
            return Err(CalcError::ambiguous_unknown([*outside]));
        }
        let blank: Vec<&str> = candidates.iter().copied().filter(|s| request.is_blank(s)).collect();
        single(blank)?
    } else if marked.is_empty() {
        let blank: Vec<&str> = descriptor
            .variables
            .iter()
            .filter(|v| v.default.is_none() && request.is_blank(v.symbol))
            .map(|v| v.symbol)
            .collect();
        single(blank)?
    } else {
        single(marked)?
    };

    descriptor
        .find_variable(symbol)
        .ok_or_else(|| CalcError::unknown_variable(descriptor.key(), symbol))
}

/// The only entry of `blank`, or `AmbiguousUnknown` listing all of them
fn single(blank: Vec<&str>) -> CalcResult<&str> {
    if blank.len() == 1 {
        Ok(blank[0])
    } else {
        Err(CalcError::ambiguous_unknown(blank))
    }
}

/// Parse one known variable, falling back to its default when blank.
fn parse<'a>(variable: &'a FormulaVariable, request: &'a SolveRequest) -> CalcResult<Parsed<'a>> {
    let field = request.field(variable.symbol).filter(|f| !f.is_blank());

    match (field, variable.default) {
        (Some(field), _) => {
            let raw = field.raw.trim();
            let entered: f64 = raw
                .parse()
                .ok()
                .filter(|v: &f64| v.is_finite())
                .ok_or_else(|| CalcError::invalid_number(variable.symbol, raw))?;
            Ok(Parsed {
                variable,
                entered,
                unit: field.unit().unwrap_or(variable.unit),
                defaulted: false,
            })
        }
        (None, Some(default)) => Ok(Parsed {
            variable,
            entered: default.value,
            unit: default.unit,
            defaulted: true,
        }),
        (None, None) => Err(CalcError::missing_input(variable.symbol)),
    }
}

/// Resolve the unit of a parsed field and convert to base units.
fn normalize<'a>(field: Parsed<'a>, units: &UnitRegistry) -> CalcResult<Resolved<'a>> {
    let unit = units.unit(field.variable.family, field.unit)?;
    Ok(Resolved {
        variable: field.variable,
        base: unit.to_base(field.entered),
        entered: field.entered,
        unit: unit.symbol.clone(),
        defaulted: field.defaulted,
    })
}
