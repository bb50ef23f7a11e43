// Debug logging module for per-turn game state logging
//
// Each decided turn is appended to a JSONL file together with the field of
// the turn before, which is enough for the replay tool to rebuild both
// snapshots.

use log::error;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::Arc;

use crate::snapshot::Snapshot;
use crate::types::{Move, PlayerId, PlayerStatus};

/// Represents a single debug log entry
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TurnRecord {
    pub round: u32,
    pub player_id: PlayerId,
    pub chosen_move: Move,
    pub width: i32,
    pub height: i32,
    pub players: Vec<PlayerStatus>,
    pub field: String,
    pub previous_field: Option<String>,
    pub timestamp: String,
}

impl TurnRecord {
    pub fn new(snapshot: &Snapshot, player_id: PlayerId, chosen_move: Move) -> Self {
        let grid = snapshot.grid();
        TurnRecord {
            round: snapshot.round(),
            player_id,
            chosen_move,
            width: grid.width(),
            height: grid.height(),
            players: snapshot.players().map(|p| p.status.clone()).collect(),
            field: grid.to_field_string(),
            previous_field: snapshot.previous().map(|p| p.grid().to_field_string()),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Shared debug logger state
#[derive(Clone)]
pub struct DebugLogger {
    file: Arc<Mutex<Option<File>>>,
    enabled: bool,
}

impl DebugLogger {
    /// Creates a new debug logger
    /// If enabled is true, initializes the log file (truncating if it exists)
    pub fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return Self::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
        {
            Ok(file) => {
                log::info!("Debug logging enabled: {}", log_file_path);
                DebugLogger {
                    file: Arc::new(Mutex::new(Some(file))),
                    enabled: true,
                }
            }
            Err(e) => {
                error!("Failed to create debug log file '{}': {}", log_file_path, e);
                Self::disabled()
            }
        }
    }

    /// Creates a disabled debug logger (no-op)
    pub fn disabled() -> Self {
        DebugLogger {
            file: Arc::new(Mutex::new(None)),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Appends the decision for one turn
    pub fn log_move(&self, snapshot: &Snapshot, player_id: PlayerId, chosen_move: Move) {
        if !self.enabled {
            return;
        }

        let entry = TurnRecord::new(snapshot, player_id, chosen_move);
        let mut file_guard = self.file.lock();

        if let Some(file) = file_guard.as_mut() {
            match serde_json::to_string(&entry) {
                Ok(json_line) => {
                    if let Err(e) = writeln!(file, "{}", json_line) {
                        error!("Failed to write debug log entry: {}", e);
                    } else if let Err(e) = file.flush() {
                        error!("Failed to flush debug log: {}", e);
                    }
                }
                Err(e) => {
                    error!("Failed to serialize debug log entry: {}", e);
                }
            }
        }
    }
}
