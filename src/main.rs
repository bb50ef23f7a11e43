// Hackman bot entry point
//
// Speaks the engine's line protocol over stdin/stdout. Diagnostics go to
// stderr through env_logger so they never mix with the moves.

use log::{error, info};
use std::env;
use std::io;
use std::process;

use hackman_bot::config::Config;
use hackman_bot::protocol::GameSession;

fn main() {
    // We default to 'info' level logging. But if the `RUST_LOG` environment variable is set,
    // we keep that value instead.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    info!("Starting Hackman bot...");

    // Load configuration once at startup
    let config = Config::load_or_default();
    let mut session = GameSession::from_config(config);

    let stdin = io::stdin();
    let stdout = io::stdout();
    if let Err(e) = session.run(stdin.lock(), stdout.lock()) {
        error!("Session ended with error: {}", e);
        process::exit(1);
    }

    info!("Input closed, shutting down");
}
