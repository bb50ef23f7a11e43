// Replay module for analyzing logged turns and debugging decision-making
//
// This module provides functionality to:
// 1. Parse JSONL turn logs
// 2. Rebuild each turn's snapshot, linked to the turn before
// 3. Re-run the decision engine and compare with the logged move
// 4. Generate analysis reports

use log::{info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use crate::bot::{Bot, Stage};
use crate::config::Config;
use crate::debug_logger::TurnRecord;
use crate::grid::HazardSource;
use crate::snapshot::Snapshot;
use crate::types::Move;

/// Seed used for tie-breaking so that replays are reproducible
const REPLAY_SEED: u64 = 0x6861_636b;

/// Result of replaying a single turn
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub round: u32,
    pub original_move: Move,
    pub replayed_move: Move,
    /// The moves agree, or the original move tied for the best score
    pub matches: bool,
    pub replayed_score: f64,
    pub stage: Option<Stage>,
    pub computation_time_ms: u128,
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total_turns: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
}

/// Replay engine for analyzing turn logs
pub struct ReplayEngine {
    bot: Bot,
    sources: Vec<HazardSource>,
    verbose: bool,
}

impl ReplayEngine {
    /// Creates a new replay engine with the given configuration
    pub fn new(config: Config, verbose: bool) -> Self {
        let sources = config.grid.hazard_sources();
        ReplayEngine {
            bot: Bot::with_seed(config, REPLAY_SEED),
            sources,
            verbose,
        }
    }

    /// Loads all log entries from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<TurnRecord>, String> {
        let file =
            File::open(log_path.as_ref()).map_err(|e| format!("Failed to open log file: {}", e))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: TurnRecord = serde_json::from_str(&line)
                .map_err(|e| format!("Failed to parse JSON on line {}: {}", line_num + 1, e))?;

            entries.push(entry);
        }

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Rebuilds the snapshot of a logged turn, linked to the logged previous field
    pub fn snapshot_for(&self, entry: &TurnRecord) -> Result<Snapshot, String> {
        let build = |round: u32, field: &str| {
            Snapshot::from_field(
                round,
                entry.width,
                entry.height,
                field,
                &entry.players,
                &self.sources,
            )
            .map_err(|e| format!("Round {}: {}", round, e))
        };

        let snapshot = build(entry.round, &entry.field)?;
        match &entry.previous_field {
            Some(previous) => {
                let previous = build(entry.round.saturating_sub(1), previous)?;
                Ok(snapshot.with_previous(previous))
            }
            None => Ok(snapshot),
        }
    }

    /// Replays a single log entry and compares the result
    pub fn replay_entry(&mut self, entry: &TurnRecord) -> Result<ReplayResult, String> {
        if self.verbose {
            info!("Replaying round {}...", entry.round);
        }

        let snapshot = self.snapshot_for(entry)?;
        let start_time = Instant::now();
        let decision = self
            .bot
            .decide(&snapshot, entry.player_id)
            .map_err(|e| format!("Round {}: {}", entry.round, e))?;
        let computation_time = start_time.elapsed().as_millis();

        let best = decision.scores.get(&decision.chosen).copied().unwrap_or(0.0);
        let tied = decision
            .scores
            .get(&entry.chosen_move)
            .is_some_and(|&score| score == best);
        let matches = entry.chosen_move == decision.chosen || tied;

        if self.verbose {
            if matches {
                info!(
                    "Round {}: MATCH - {} (score: {:.3}, stage: {:?}, time: {}ms)",
                    entry.round, decision.chosen, best, decision.stage, computation_time
                );
            } else {
                warn!(
                    "Round {}: MISMATCH - Original: {}, Replayed: {} (score: {:.3}, stage: {:?}, time: {}ms)",
                    entry.round,
                    entry.chosen_move,
                    decision.chosen,
                    best,
                    decision.stage,
                    computation_time
                );
            }
        }

        Ok(ReplayResult {
            round: entry.round,
            original_move: entry.chosen_move,
            replayed_move: decision.chosen,
            matches,
            replayed_score: best,
            stage: decision.stage,
            computation_time_ms: computation_time,
        })
    }

    /// Replays all entries in a log file
    pub fn replay_all(&mut self, entries: &[TurnRecord]) -> Vec<ReplayResult> {
        let mut results = Vec::new();

        for entry in entries {
            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay round {}: {}", entry.round, e);
                }
            }
        }

        results
    }

    /// Replays specific rounds from a log file
    pub fn replay_rounds(
        &mut self,
        entries: &[TurnRecord],
        rounds: &[u32],
    ) -> Result<Vec<ReplayResult>, String> {
        let mut results = Vec::new();

        for round in rounds {
            let entry = entries
                .iter()
                .find(|e| e.round == *round)
                .ok_or_else(|| format!("Round {} not found in log file", round))?;

            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay round {}: {}", round, e);
                }
            }
        }

        Ok(results)
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_turns = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_turns - matches;
        let match_rate = if total_turns > 0 {
            (matches as f64 / total_turns as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_turns,
            matches,
            mismatches,
            match_rate,
        }
    }

    /// Prints a detailed report of replay results
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!("\n===========================================================");
        println!("                    REPLAY REPORT");
        println!("===========================================================");
        println!("Total Turns:    {}", stats.total_turns);
        println!("Matches:        {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("Mismatches:     {}", stats.mismatches);
        println!("===========================================================\n");

        if !results.is_empty() {
            let avg_time: f64 = results
                .iter()
                .map(|r| r.computation_time_ms as f64)
                .sum::<f64>()
                / results.len() as f64;
            println!("Average Computation Time:   {:.1}ms\n", avg_time);
        }

        let mismatches: Vec<_> = results.iter().filter(|r| !r.matches).collect();
        if !mismatches.is_empty() {
            println!("===========================================================");
            println!("                  DETAILED MISMATCHES");
            println!("===========================================================");

            for result in mismatches {
                println!(
                    "Round {}: {} -> {} (score: {:.3}, stage: {:?}, time: {}ms)",
                    result.round,
                    result.original_move,
                    result.replayed_move,
                    result.replayed_score,
                    result.stage,
                    result.computation_time_ms
                );
            }
            println!();
        }
    }

    /// Validates that specific expected moves were made
    pub fn validate_expected_moves(
        &self,
        entries: &[TurnRecord],
        expected_moves: &[(u32, Vec<Move>)], // (round, acceptable_moves)
    ) -> Result<(), String> {
        for (round, acceptable) in expected_moves {
            let entry = entries
                .iter()
                .find(|e| e.round == *round)
                .ok_or_else(|| format!("Round {} not found in log", round))?;

            if !acceptable.contains(&entry.chosen_move) {
                return Err(format!(
                    "Round {}: Expected one of {:?}, but got {}",
                    round,
                    acceptable.iter().map(Move::as_str).collect::<Vec<_>>(),
                    entry.chosen_move
                ));
            }
        }

        Ok(())
    }
}
