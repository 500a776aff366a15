//! Tracing setup for the command-line tools.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install a stderr `fmt` subscriber.
///
/// Reads the `CHAT_ENGINE_LOG` environment variable (same syntax as
/// `RUST_LOG`), falling back to `chat_engine=info`. Safe to call repeatedly.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("CHAT_ENGINE_LOG")
            .unwrap_or_else(|_| EnvFilter::new("chat_engine=info"));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    });
}
