//! # calc_cli
//!
//! Terminal front end for the formula solver. It collects raw strings and
//! unit selections, hands them to `calc_core::solve`, and prints the result
//! and its derivation verbatim.
//!
//! ```text
//! calc_cli list
//! calc_cli describe voltage_divider
//! calc_cli solve voltage_divider Vin=12:V R1=1:kΩ R2=2:kΩ Vout=?
//! calc_cli solve conservation_of_momentum m1=2 v1i=5 m2=3 v2i=-2 v1f=1 v2f= --mode final-velocities
//! ```
//!
//! Logging goes to stderr and is controlled with `RUST_LOG` (default `warn`).

use std::fs;
use std::process::ExitCode;

use calc_core::equations::Formula;
use calc_core::{solve_with, CalcError, FieldInput, Solution, SolveRequest, SolverSettings, UnitRegistry};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Solve physical formulas for whichever variable is left blank
#[derive(Parser, Debug)]
#[command(name = "calc_cli")]
#[command(about = "Unit-aware formula solver with derivation traces", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every formula in the catalog
    List,

    /// Show the variables, units and solvable targets of a formula
    Describe {
        /// Formula key (e.g., orifice_flow)
        formula: String,
    },

    /// Solve a formula
    Solve {
        /// Formula key (e.g., voltage_divider)
        formula: String,

        /// Inputs as `sym=value[:unit]`; `sym=?` or `sym=:unit` marks the unknown, `sym=` leaves it blank
        #[arg(value_name = "SYM=VALUE[:UNIT]")]
        inputs: Vec<String>,

        /// Solve mode whose candidates contain the single blank
        #[arg(short, long)]
        mode: Option<String>,

        /// Unit for the result
        #[arg(short = 'u', long)]
        display_unit: Option<String>,

        /// Print the solution or error as JSON
        #[arg(long)]
        json: bool,

        /// TOML file with solver settings
        #[arg(short, long, value_name = "FILE")]
        settings: Option<String>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    debug!(?args, "parsed arguments");

    let outcome = match args.command {
        Command::List => {
            list();
            Ok(())
        }
        Command::Describe { formula } => describe(&formula),
        Command::Solve {
            formula,
            inputs,
            mode,
            display_unit,
            json,
            settings,
        } => run_solve(&formula, &inputs, mode, display_unit, json, settings.as_deref()),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => code,
    }
}

fn list() {
    for category in Formula::all_categories() {
        println!("{}", category.display_name());
        for formula in Formula::in_category(category) {
            let meta = formula.metadata();
            println!("  {:<26} {}", formula.key(), meta.name);
        }
        println!();
    }
}

fn describe(key: &str) -> Result<(), ExitCode> {
    let formula = Formula::from_key(key).map_err(|e| report(&e, false))?;
    let meta = formula.metadata();
    let descriptor = formula.descriptor();
    let units = UnitRegistry::global();

    println!("{} ({})", meta.name, formula.key());
    println!("{}", meta.description);
    println!();
    println!("  {}", meta.formula_plain);
    println!();
    println!("Variables:");
    for var in &descriptor.variables {
        let choices: Vec<&str> = units
            .units_in(var.family)
            .map(|list| list.iter().map(|u| u.symbol.as_str()).collect())
            .unwrap_or_default();
        let default = var
            .default
            .map(|d| format!(" [default {} {}]", d.value, d.unit))
            .unwrap_or_default();
        println!(
            "  {:<8} {} ({}, {}){}",
            var.symbol,
            var.name,
            var.family,
            var.constraint.describe(),
            default
        );
        println!("           units: {} (default {})", choices.join(", "), var.unit);
    }
    println!();

    let solvable: Vec<&str> = descriptor.solvable().collect();
    println!("Solvable for: {}", solvable.join(", "));
    for mode in &descriptor.modes {
        println!("Mode {}: {} ({})", mode.id, mode.label, mode.candidates.join(" or "));
    }
    println!("Reference: {}", meta.reference.citation());
    if formula == Formula::StandardFlow {
        println!("Gauge pressure units (psig, barg, kPag, Pag) add 14.7 psi.");
    }
    Ok(())
}

fn run_solve(
    key: &str,
    inputs: &[String],
    mode: Option<String>,
    display_unit: Option<String>,
    json: bool,
    settings_path: Option<&str>,
) -> Result<(), ExitCode> {
    let settings = match settings_path {
        Some(path) => {
            let source = fs::read_to_string(path).map_err(|e| {
                eprintln!("Error: cannot read settings file '{}': {}", path, e);
                ExitCode::from(2)
            })?;
            SolverSettings::from_toml_str(&source).map_err(|e| report(&e, json))?
        }
        None => SolverSettings::default(),
    };

    let formula = Formula::from_key(key).map_err(|e| report(&e, json))?;
    let mut request = SolveRequest::new(formula);
    request.mode = mode;
    request.display_unit = display_unit;
    for input in inputs {
        let (symbol, field) = parse_assignment(input).map_err(|message| {
            eprintln!("Error: {}", message);
            ExitCode::from(2)
        })?;
        request.inputs.insert(symbol, field);
    }

    let solution = solve_with(&request, &settings).map_err(|e| report(&e, json))?;
    if json {
        match serde_json::to_string_pretty(&solution) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                return Err(ExitCode::FAILURE);
            }
        }
    } else {
        print_solution(&solution);
    }
    Ok(())
}

/// Split `sym=value[:unit]` into a request field.
fn parse_assignment(text: &str) -> Result<(String, FieldInput), String> {
    let (symbol, rest) = text
        .split_once('=')
        .ok_or_else(|| format!("expected SYM=VALUE[:UNIT], got '{}'", text))?;
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(format!("missing symbol in '{}'", text));
    }

    let (value, unit) = match rest.split_once(':') {
        Some((value, unit)) => (value.trim(), Some(unit.trim().to_string())),
        None => (rest.trim(), None),
    };

    let field = if value == "?" || (value.is_empty() && unit.is_some()) {
        FieldInput {
            raw: String::new(),
            unit,
            unknown: true,
        }
    } else {
        FieldInput {
            raw: value.to_string(),
            unit,
            unknown: false,
        }
    };
    Ok((symbol.to_string(), field))
}

fn print_solution(solution: &Solution) {
    let meta = solution.formula.metadata();
    println!("{}", meta.name);
    println!("{} = {}", solution.unknown, solution.formatted);
    println!();
    println!("Derivation:");
    let width = solution.trace.iter().map(|s| s.label.chars().count()).max().unwrap_or(0);
    for step in &solution.trace {
        println!("  {:<width$}  {}", step.label, step.base_expression, width = width);
        if let Some(display) = &step.display_expression {
            println!("  {:<width$}  {}", "", display, width = width);
        }
    }
}

/// Print an error and pick the exit code.
fn report(error: &CalcError, json: bool) -> ExitCode {
    if json {
        match serde_json::to_string_pretty(error) {
            Ok(text) => println!("{}", text),
            Err(_) => eprintln!("Error: {}", error),
        }
    } else {
        eprintln!("Error: {}", error);
    }
    if error.is_input_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::from(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_and_unit() {
        let (symbol, field) = parse_assignment("R2=10:kΩ").unwrap();
        assert_eq!(symbol, "R2");
        assert_eq!(field.raw, "10");
        assert_eq!(field.unit.as_deref(), Some("kΩ"));
        assert!(!field.unknown);
    }

    #[test]
    fn test_parse_negative_value_default_unit() {
        let (_, field) = parse_assignment("v2i=-2").unwrap();
        assert_eq!(field.raw, "-2");
        assert_eq!(field.unit, None);
    }

    #[test]
    fn test_parse_unknown_markers() {
        assert!(parse_assignment("Vout=?").unwrap().1.unknown);

        let (_, field) = parse_assignment("Q=:L/s").unwrap();
        assert!(field.unknown);
        assert_eq!(field.unit.as_deref(), Some("L/s"));

        let (_, blank) = parse_assignment("v2f=").unwrap();
        assert!(!blank.unknown);
        assert!(blank.is_blank());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse_assignment("R2").is_err());
        assert!(parse_assignment("=5").is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "calc_cli", "solve", "voltage_divider", "Vin=12:V", "Vout=?", "--display-unit", "mV", "--json",
        ])
        .unwrap();
        match args.command {
            Command::Solve { formula, inputs, display_unit, json, .. } => {
                assert_eq!(formula, "voltage_divider");
                assert_eq!(inputs.len(), 2);
                assert_eq!(display_unit.as_deref(), Some("mV"));
                assert!(json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
