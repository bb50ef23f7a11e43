// Standalone replay tool for analyzing hackman turn logs
//
// Usage:
//   cargo run --bin replay -- <log_file> [options]
//
// Options:
//   --all                    Replay all rounds
//   --rounds <r1,r2>         Replay specific rounds (comma-separated)
//   --validate <r:m,...>     Check logged moves against acceptable ones
//   --verbose                Show detailed output for each round
//   --config <path>          Path to Hackman.toml (default: Hackman.toml)

use std::env;
use std::process;

use hackman_bot::config::Config;
use hackman_bot::replay::ReplayEngine;
use hackman_bot::types::Move;

enum Mode {
    All,
    Rounds(String),
    Validate(String),
}

fn print_usage() {
    eprintln!("Hackman Replay Tool");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  replay <log_file> [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --all                   Replay all rounds in the log");
    eprintln!("  --rounds <R1,R2,...>    Replay specific rounds (comma-separated)");
    eprintln!("  --validate <R:M,...>    Validate expected moves (format: round:move|move,...)");
    eprintln!("  --verbose               Show detailed output for each round");
    eprintln!("  --config <path>         Path to Hackman.toml (default: Hackman.toml)");
    eprintln!("  --help                  Show this help message");
    eprintln!();
    eprintln!("EXAMPLES:");
    eprintln!("  replay hackman_debug.jsonl --all --verbose");
    eprintln!("  replay hackman_debug.jsonl --rounds 5,10,15");
    eprintln!("  replay hackman_debug.jsonl --validate 5:up,10:left|right");
}

fn parse_rounds(s: &str) -> Result<Vec<u32>, String> {
    s.split(',')
        .map(|r| {
            r.trim()
                .parse::<u32>()
                .map_err(|e| format!("Invalid round number '{}': {}", r, e))
        })
        .collect()
}

fn parse_expected_moves(s: &str) -> Result<Vec<(u32, Vec<Move>)>, String> {
    s.split(',')
        .map(|pair| {
            let (round, moves) = pair
                .trim()
                .split_once(':')
                .ok_or_else(|| format!("Invalid format '{}'. Expected 'round:move'", pair))?;

            let round = round
                .parse::<u32>()
                .map_err(|e| format!("Invalid round number '{}': {}", round, e))?;

            // Several acceptable moves are separated by '|'
            let moves = moves
                .split('|')
                .map(|m| m.parse::<Move>())
                .collect::<Result<Vec<Move>, String>>()?;

            Ok((round, moves))
        })
        .collect()
}

fn exit_with(message: String) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.iter().any(|a| a == "--help") {
        print_usage();
        process::exit(if args.iter().any(|a| a == "--help") { 0 } else { 1 });
    }

    let log_file = &args[1];
    let mut config_path = "Hackman.toml".to_string();
    let mut verbose = false;
    let mut mode = None;

    let mut rest = args[2..].iter();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--all" => mode = Some(Mode::All),
            "--rounds" => match rest.next() {
                Some(value) => mode = Some(Mode::Rounds(value.clone())),
                None => exit_with("--rounds requires an argument".to_string()),
            },
            "--validate" => match rest.next() {
                Some(value) => mode = Some(Mode::Validate(value.clone())),
                None => exit_with("--validate requires an argument".to_string()),
            },
            "--config" => match rest.next() {
                Some(value) => config_path = value.clone(),
                None => exit_with("--config requires an argument".to_string()),
            },
            "--verbose" => verbose = true,
            other => {
                print_usage();
                exit_with(format!("Unknown option '{}'", other));
            }
        }
    }

    let Some(mode) = mode else {
        print_usage();
        exit_with("Must specify --all, --rounds, or --validate".to_string());
    };

    let config = Config::from_file(&config_path).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from '{}': {}", config_path, e);
        eprintln!("Using default configuration");
        Config::default_hardcoded()
    });

    println!("Loaded configuration from: {}", config_path);
    println!("Replay log file: {}", log_file);
    println!();

    let mut engine = ReplayEngine::new(config, verbose);

    let entries = engine
        .load_log_file(log_file)
        .unwrap_or_else(|e| exit_with(format!("Cannot load log file: {}", e)));

    if entries.is_empty() {
        exit_with("Log file is empty".to_string());
    }

    println!("Loaded {} log entries\n", entries.len());

    match mode {
        Mode::All => {
            println!("Replaying all {} rounds...\n", entries.len());
            let results = engine.replay_all(&entries);
            engine.print_report(&results);
        }
        Mode::Rounds(value) => {
            let rounds = parse_rounds(&value).unwrap_or_else(|e| exit_with(e));
            println!("Replaying {} specific round(s)...\n", rounds.len());
            match engine.replay_rounds(&entries, &rounds) {
                Ok(results) => engine.print_report(&results),
                Err(e) => exit_with(format!("Replay failed: {}", e)),
            }
        }
        Mode::Validate(value) => {
            let expected_moves = parse_expected_moves(&value).unwrap_or_else(|e| exit_with(e));
            println!("Validating {} expected move(s)...\n", expected_moves.len());
            match engine.validate_expected_moves(&entries, &expected_moves) {
                Ok(()) => println!("All expected moves validated successfully!"),
                Err(e) => exit_with(format!("Validation failed: {}", e)),
            }
        }
    }
}
