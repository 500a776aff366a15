//! Bank Linter — validates a content bank and reports soft problems.
//!
//! Usage: bank_linter <bank_file>... [--strict]

use std::path::PathBuf;
use std::process;

use chat_engine::core::bank::BankError;
use chat_engine::core::lint::lint_bank;
use chat_engine::logging::init_tracing;
use chat_engine::ContentBank;
use clap::Parser;

#[derive(Parser)]
#[command(name = "bank_linter", about = "Validate and lint content bank files", version)]
struct Args {
    /// Content bank files (.json, .yaml, .yml or .ron)
    #[arg(required = true)]
    banks: Vec<PathBuf>,

    /// Treat warnings as errors
    #[arg(long)]
    strict: bool,
}

fn main() {
    init_tracing();
    let args = Args::parse();

    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for path in &args.banks {
        match ContentBank::load_from_path(path) {
            Ok(bank) => {
                println!("  Loaded: {}", path.display());
                for warning in lint_bank(&bank) {
                    warnings.push(format!("{}: {}", path.display(), warning));
                }
            }
            Err(BankError::Validation(e)) => {
                for issue in e.issues {
                    errors.push(format!("{}: {}", path.display(), issue));
                }
            }
            Err(e) => errors.push(format!("{}: {}", path.display(), e)),
        }
    }

    println!("\n=== Content Bank Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if !errors.is_empty() || (args.strict && !warnings.is_empty()) {
        process::exit(1);
    }
}
