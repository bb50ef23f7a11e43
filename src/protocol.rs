// Line protocol spoken with the game engine
//
// `settings` lines arrive once at the start, `update` lines every round and
// an `action move` line asks for the move, answered with its lowercase name.

use log::{error, warn};
use std::collections::HashMap;
use std::io::{BufRead, Write};

use crate::bot::Bot;
use crate::config::Config;
use crate::debug_logger::DebugLogger;
use crate::error::ProtocolError;
use crate::grid::HazardSource;
use crate::snapshot::Snapshot;
use crate::types::{Move, PlayerId, PlayerStatus};

/// Match settings, fixed for the whole game
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub timebank: u64,
    pub time_per_move: u64,
    pub field_width: Option<i32>,
    pub field_height: Option<i32>,
    pub max_rounds: u32,
    pub player_names: Vec<String>,
    pub your_bot: Option<String>,
    pub your_botid: Option<PlayerId>,
}

/// Player id from the trailing digit of a player name, e.g. `player1`
pub fn player_id(name: &str) -> Result<PlayerId, ProtocolError> {
    name.chars()
        .last()
        .and_then(|c| c.to_digit(10))
        .map(|d| d as PlayerId)
        .ok_or_else(|| ProtocolError::InvalidPlayerName(name.to_string()))
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ProtocolError> {
    value.parse().map_err(|_| ProtocolError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ProtocolError> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ProtocolError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

pub struct GameSession {
    bot: Bot,
    logger: DebugLogger,
    sources: Vec<HazardSource>,
    settings: Settings,
    updates: HashMap<String, HashMap<String, String>>,
    previous: Option<Snapshot>,
}

impl GameSession {
    pub fn new(bot: Bot, logger: DebugLogger, sources: Vec<HazardSource>) -> Self {
        GameSession {
            bot,
            logger,
            sources,
            settings: Settings::default(),
            updates: HashMap::new(),
            previous: None,
        }
    }

    pub fn from_config(config: Config) -> Self {
        let logger = DebugLogger::new(config.debug.enabled, &config.debug.log_file_path);
        let sources = config.grid.hazard_sources();
        GameSession::new(Bot::new(config), logger, sources)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Snapshot of the last answered round
    pub fn last_snapshot(&self) -> Option<&Snapshot> {
        self.previous.as_ref()
    }

    /// Reads lines until the input ends, writing one move per action
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<(), ProtocolError> {
        for line in input.lines() {
            let line = line?;
            match self.handle_line(&line) {
                Ok(Some(mv)) => {
                    writeln!(output, "{}", mv)?;
                    output.flush()?;
                }
                Ok(None) => {}
                Err(e) => warn!("Ignoring line '{}': {}", line, e),
            }
        }
        Ok(())
    }

    /// Handles one input line, returning the move to send for actions
    pub fn handle_line(&mut self, line: &str) -> Result<Option<Move>, ProtocolError> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(&command) = parts.first() else {
            return Ok(None);
        };

        match command {
            "settings" => {
                let [_, key, value] = parts[..] else {
                    return Err(ProtocolError::MalformedLine(line.to_string()));
                };
                self.parse_setting(key, value)?;
                Ok(None)
            }
            "update" => {
                let [_, target, key, value] = parts[..] else {
                    return Err(ProtocolError::MalformedLine(line.to_string()));
                };
                self.updates
                    .entry(target.to_string())
                    .or_default()
                    .insert(key.to_string(), value.to_string());
                Ok(None)
            }
            "action" => {
                if let Some(time) = parts.get(2) {
                    self.settings.timebank = parse_number("timebank", time)?;
                }

                let result = self.act();
                self.updates.clear();
                match result {
                    Ok(mv) => Ok(Some(mv)),
                    Err(e) => {
                        error!("Cannot answer action: {}", e);
                        Ok(Some(Move::Pass))
                    }
                }
            }
            _ => {
                warn!("Unknown command '{}'", command);
                Ok(None)
            }
        }
    }

    fn parse_setting(&mut self, key: &str, value: &str) -> Result<(), ProtocolError> {
        match key {
            "timebank" => self.settings.timebank = parse_number(key, value)?,
            "time_per_move" => self.settings.time_per_move = parse_number(key, value)?,
            "field_width" => self.settings.field_width = Some(parse_number(key, value)?),
            "field_height" => self.settings.field_height = Some(parse_number(key, value)?),
            "max_rounds" => self.settings.max_rounds = parse_number(key, value)?,
            "player_names" => {
                self.settings.player_names = value.split(',').map(str::to_string).collect()
            }
            "your_bot" => self.settings.your_bot = Some(value.to_string()),
            "your_botid" => self.settings.your_botid = Some(parse_number(key, value)?),
            _ => warn!("Cannot parse settings input with key '{}'", key),
        }
        Ok(())
    }

    fn update(&self, target: &str, key: &str) -> Result<&str, ProtocolError> {
        self.updates
            .get(target)
            .and_then(|values| values.get(key))
            .map(String::as_str)
            .ok_or_else(|| ProtocolError::MissingUpdate {
                target: target.to_string(),
                key: key.to_string(),
            })
    }

    fn my_id(&self) -> Result<PlayerId, ProtocolError> {
        if let Some(id) = self.settings.your_botid {
            return Ok(id);
        }
        match &self.settings.your_bot {
            Some(name) => player_id(name),
            None => Err(ProtocolError::MissingSetting("your_botid")),
        }
    }

    fn build_snapshot(&self) -> Result<Snapshot, ProtocolError> {
        let width = self
            .settings
            .field_width
            .ok_or(ProtocolError::MissingSetting("field_width"))?;
        let height = self
            .settings
            .field_height
            .ok_or(ProtocolError::MissingSetting("field_height"))?;
        if self.settings.player_names.is_empty() {
            return Err(ProtocolError::MissingSetting("player_names"));
        }

        let mut statuses = Vec::with_capacity(self.settings.player_names.len());
        for name in &self.settings.player_names {
            let mut status = PlayerStatus::new(player_id(name)?, name.as_str());
            status.snippets = parse_number("snippets", self.update(name, "snippets")?)?;
            status.has_weapon = parse_flag("has_weapon", self.update(name, "has_weapon")?)?;
            status.is_paralyzed = parse_flag("is_paralyzed", self.update(name, "is_paralyzed")?)?;
            statuses.push(status);
        }

        let round = parse_number("round", self.update("game", "round")?)?;
        let field = self.update("game", "field")?;

        Ok(Snapshot::from_field(
            round,
            width,
            height,
            field,
            &statuses,
            &self.sources,
        )?)
    }

    fn act(&mut self) -> Result<Move, ProtocolError> {
        let me = self.my_id()?;
        let mut snapshot = self.build_snapshot()?;
        if let Some(previous) = self.previous.take() {
            snapshot = snapshot.with_previous(previous);
        }

        let mv = self.bot.get_move(&snapshot, me);
        self.logger.log_move(&snapshot, me, mv);
        self.previous = Some(snapshot);
        Ok(mv)
    }
}
