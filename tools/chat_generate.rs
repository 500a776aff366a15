//! Chat Generate — one-shot conversation generation from a content bank.
//!
//! Usage: chat_generate --bank <file> [--seed <n>] [--count <n>] [--direction left|right]
//!                      [--unfiltered] [--json]

use std::path::PathBuf;
use std::process;

use chat_engine::core::sampler::FragmentSampler;
use chat_engine::logging::init_tracing;
use chat_engine::{ContentBank, Conversation, ConversationGenerator, Direction, GenerateError};
use clap::Parser;

#[derive(Parser)]
#[command(name = "chat_generate", about = "Generate random three-line conversations", version)]
struct Args {
    /// Content bank file (.json, .yaml, .yml or .ron)
    #[arg(short, long)]
    bank: PathBuf,

    /// Seed for reproducible output
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of conversations to generate
    #[arg(short, long, default_value_t = 1)]
    count: usize,

    /// Force the outcome direction instead of picking one at random
    #[arg(short, long)]
    direction: Option<Direction>,

    /// Let the second response suggest any item, ignoring the first response
    #[arg(long, conflicts_with = "direction")]
    unfiltered: bool,

    /// Print conversations as JSON lines
    #[arg(long)]
    json: bool,
}

fn main() {
    init_tracing();
    let args = Args::parse();

    let bank = ContentBank::load_from_path(&args.bank).unwrap_or_else(|e| {
        eprintln!("Error loading content bank '{}': {}", args.bank.display(), e);
        process::exit(1);
    });

    let generator = ConversationGenerator::new(&bank);
    let mut sampler = match args.seed {
        Some(seed) => FragmentSampler::seeded(seed),
        None => FragmentSampler::from_entropy(),
    };

    for i in 0..args.count {
        let conversation = match generate_one(&generator, &args, &mut sampler) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error generating conversation: {}", e);
                process::exit(1);
            }
        };

        if args.json {
            match serde_json::to_string(&conversation) {
                Ok(line) => println!("{}", line),
                Err(e) => {
                    eprintln!("Error serializing conversation: {}", e);
                    process::exit(1);
                }
            }
        } else {
            if i > 0 {
                println!();
            }
            println!("Generated Conversation:");
            println!("{}", "-".repeat(50));
            println!("{}", conversation);
        }
    }
}

fn generate_one(
    generator: &ConversationGenerator<'_>,
    args: &Args,
    sampler: &mut FragmentSampler,
) -> Result<Conversation, GenerateError> {
    if args.unfiltered {
        generator.generate_unfiltered(sampler)
    } else if let Some(direction) = args.direction {
        generator.generate_with_direction(direction, sampler)
    } else {
        generator.generate(sampler)
    }
}
