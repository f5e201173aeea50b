//! Writes the formula reference (`FORMULAS.md`) from the formula registry.
//!
//! Run from the workspace root:
//!
//! ```bash
//! cargo run --bin gen-formulas
//! ```

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use calc_core::equations::generate_formulas_markdown;
use calc_core::FormulaRegistry;

const OUTPUT: &str = "calc_core/src/equations/FORMULAS.md";

fn main() -> ExitCode {
    let count = FormulaRegistry::global().len();
    let markdown = generate_formulas_markdown();
    let output_path = Path::new(OUTPUT);

    if let Err(e) = fs::write(output_path, &markdown) {
        eprintln!("Error writing {}: {}", output_path.display(), e);
        return ExitCode::FAILURE;
    }
    println!("Documented {} formulas in {} ({} bytes)", count, output_path.display(), markdown.len());
    ExitCode::SUCCESS
}
