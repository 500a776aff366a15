//! Compile Scenario — renders a page template with a YAML config into a JSON content bank.
//!
//! Usage: compile_scenario --template <file> --config <file.yaml> --output <file.json>

use std::path::PathBuf;
use std::process;

use chat_engine::core::compiler::compile_scenario;
use chat_engine::logging::init_tracing;
use clap::Parser;

#[derive(Parser)]
#[command(name = "compile_scenario", about = "Generate a scenario JSON file", version)]
struct Args {
    /// Path to the page template file
    #[arg(long)]
    template: PathBuf,

    /// Path to the YAML configuration file
    #[arg(long)]
    config: PathBuf,

    /// Path for the output JSON file
    #[arg(long)]
    output: PathBuf,
}

fn main() {
    init_tracing();
    let args = Args::parse();

    match compile_scenario(&args.template, &args.config, &args.output) {
        Ok(_) => println!("Successfully generated scenario at {}", args.output.display()),
        Err(e) => {
            eprintln!("Error generating scenario: {}", e);
            process::exit(1);
        }
    }
}
