//! Office banter: a few one-shot conversations, then a scripted session.
//!
//! Run with `cargo run --example office_banter`.

use std::path::Path;

use chat_engine::core::sampler::FragmentSampler;
use chat_engine::{
    Command, ContentBank, ConversationGenerator, Direction, InteractiveSession, SessionError,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    chat_engine::logging::init_tracing();

    let bank = ContentBank::load_from_path(Path::new("content/office.yaml"))?;
    let generator = ConversationGenerator::new(&bank);
    let mut sampler = FragmentSampler::seeded(42);

    println!("=== One-shot ===\n");
    for _ in 0..3 {
        println!("{}\n", generator.generate(&mut sampler)?);
    }

    println!("=== Session ===\n");
    let mut session = InteractiveSession::builder(&bank).seed(42).build()?;
    let script = [
        Command::Regenerate,
        Command::Advance,
        Command::SetDirection(Direction::Right),
        Command::Advance,
        Command::CycleActionType,
        Command::CycleItem,
        Command::CycleItem,
    ];
    println!("{}", session.transcript());
    for command in script {
        match session.apply(command) {
            Ok(transcript) => println!("> {:?}\n{}", command, transcript),
            Err(SessionError::InvalidOperation { .. }) => println!("> {:?} (ignored)\n", command),
            Err(e) => return Err(e.into()),
        }
    }

    if let Some(conversation) = session.completed_conversation() {
        println!("=== Finished ===\n{}", serde_json::to_string_pretty(&conversation)?);
    }
    Ok(())
}
