// Library exports for the hackman bot
// This allows the replay tool and the integration tests to use the core engine

pub mod bot;
pub mod config;
pub mod debug_logger;
pub mod error;
pub mod grid;
pub mod path;
pub mod protocol;
pub mod replay;
pub mod search;
pub mod snapshot;
pub mod threat;
pub mod trap;
pub mod types;
