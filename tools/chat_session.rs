//! Chat Session — line-driven front-end for building a conversation step by step.
//!
//! Usage: chat_session --bank <file> [--seed <n>]
//!
//! Commands (one per line):
//!   up | u          — regenerate the current line
//!   enter | n | ""  — proceed to the next line (finishing R2 starts a new conversation)
//!   left | l        — left outcome direction (response 1)
//!   right | r       — right outcome direction (response 1)
//!   tab | t         — cycle action types (response 2)
//!   space | i       — cycle items within the action type (response 2)
//!   seed <n>        — reseed the session
//!   help            — list commands
//!   esc | quit      — exit

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use chat_engine::logging::init_tracing;
use chat_engine::{Command, ContentBank, Direction, InteractiveSession, SessionError, Stage};
use clap::Parser;

#[derive(Parser)]
#[command(name = "chat_session", about = "Interactively build a three-line conversation", version)]
struct Args {
    /// Content bank file (.json, .yaml, .yml or .ron)
    #[arg(short, long)]
    bank: PathBuf,

    /// Seed for reproducible sessions
    #[arg(short, long)]
    seed: Option<u64>,
}

#[derive(Debug, PartialEq)]
enum Input {
    Command(Command),
    Seed(u64),
    Help,
    Quit,
    Unknown(String),
}

fn main() {
    init_tracing();
    let args = Args::parse();

    let bank = ContentBank::load_from_path(&args.bank).unwrap_or_else(|e| {
        eprintln!("Error loading content bank '{}': {}", args.bank.display(), e);
        process::exit(1);
    });

    let mut builder = InteractiveSession::builder(&bank);
    if let Some(seed) = args.seed {
        builder = builder.seed(seed);
    }
    let mut session = builder.build().unwrap_or_else(|e| {
        eprintln!("Error starting session: {}", e);
        process::exit(1);
    });

    print_help();
    println!("{}", session.transcript());

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("chat> ");
        stdout.flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        let finishing = session.stage() == Stage::Response2;
        match parse_input(line.trim()) {
            Input::Quit => break,
            Input::Help => print_help(),
            Input::Unknown(word) => println!("Unknown command: {} (type 'help')", word),
            Input::Seed(seed) => {
                session.reseed(seed);
                println!("Seed set to {}", seed);
            }
            Input::Command(command) => match session.apply(command) {
                Ok(transcript) => {
                    if finishing && command == Command::Advance {
                        println!("\nConversation complete! Starting a new one.\n");
                    }
                    println!("{}", transcript);
                }
                // Illegal keys for the current stage are ignored, like a keypress
                // that does nothing.
                Err(SessionError::InvalidOperation { .. }) => {
                    tracing::debug!(?command, stage = %session.stage(), "ignored command");
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    process::exit(1);
                }
            },
        }
    }

    println!("Exiting...");
}

fn parse_input(line: &str) -> Input {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some(first) = parts.first() else {
        return Input::Command(Command::Advance);
    };

    match first.to_lowercase().as_str() {
        "up" | "u" | "regen" => Input::Command(Command::Regenerate),
        "enter" | "n" | "next" => Input::Command(Command::Advance),
        word @ ("left" | "l" | "right" | "r") => match word.parse::<Direction>() {
            Ok(direction) => Input::Command(Command::SetDirection(direction)),
            Err(_) => Input::Unknown(word.to_string()),
        },
        "tab" | "t" => Input::Command(Command::CycleActionType),
        "space" | "i" => Input::Command(Command::CycleItem),
        "esc" | "quit" | "exit" | "q" => Input::Quit,
        "help" | "h" | "?" => Input::Help,
        "seed" => match parts.get(1).and_then(|s| s.parse().ok()) {
            Some(seed) => Input::Seed(seed),
            None => Input::Unknown(line.to_string()),
        },
        other => Input::Unknown(other.to_string()),
    }
}

fn print_help() {
    println!("Use UP (u) to regenerate the current line.");
    println!("Use LEFT (l) / RIGHT (r) to change outcome direction (for Response 1).");
    println!("Use TAB (t) to cycle through action types, SPACE (i) to cycle through items (for Response 2).");
    println!("Press ENTER (empty line) to proceed to the next line.");
    println!("Type ESC (q) to exit.\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_words_match_direction_parsing() {
        for word in ["left", "l", "right", "r", "LEFT", "R"] {
            let expected = word.parse::<Direction>().unwrap();
            assert_eq!(
                parse_input(word),
                Input::Command(Command::SetDirection(expected))
            );
        }
    }

    #[test]
    fn regenerate_and_advance_words() {
        for word in ["up", "u", "regen"] {
            assert_eq!(parse_input(word), Input::Command(Command::Regenerate));
        }
        for word in ["", "enter", "n", "next"] {
            assert_eq!(parse_input(word), Input::Command(Command::Advance));
        }
    }

    #[test]
    fn cycling_seed_and_exit_words() {
        assert_eq!(parse_input("tab"), Input::Command(Command::CycleActionType));
        assert_eq!(parse_input("i"), Input::Command(Command::CycleItem));
        assert_eq!(parse_input("seed 9"), Input::Seed(9));
        assert_eq!(parse_input("seed x"), Input::Unknown("seed x".to_string()));
        assert_eq!(parse_input("q"), Input::Quit);
        assert_eq!(parse_input("?"), Input::Help);
    }
}
