// Core value types shared by the engine
// Positions, moves and the per-player status reported by the game engine

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Player identifier, the trailing digit of the player's name
pub type PlayerId = u8;

/// Weighted set of positions, used both as threat multiset and avoidance map
pub type Weights = HashMap<Position, u32>;

/// 2D coordinate on the field, `y` grows downwards
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// Manhattan distance, ignoring walls
    pub fn manhattan(&self, other: &Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The five actions a player can take in a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
    Pass,
}

impl Move {
    /// Returns the four moving directions in enumeration order
    pub fn all() -> [Move; 4] {
        [Move::Up, Move::Down, Move::Left, Move::Right]
    }

    /// Converts the move to its protocol representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Move::Up => "up",
            Move::Down => "down",
            Move::Left => "left",
            Move::Right => "right",
            Move::Pass => "pass",
        }
    }

    /// Unit delta of the move; `Pass` stays in place
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Move::Up => (0, -1),
            Move::Down => (0, 1),
            Move::Left => (-1, 0),
            Move::Right => (1, 0),
            Move::Pass => (0, 0),
        }
    }

    /// Calculates the position reached by applying this move
    pub fn apply(&self, position: &Position) -> Position {
        let (dx, dy) = self.delta();
        Position {
            x: position.x + dx,
            y: position.y + dy,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Move {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "up" => Ok(Move::Up),
            "down" => Ok(Move::Down),
            "left" => Ok(Move::Left),
            "right" => Ok(Move::Right),
            "pass" => Ok(Move::Pass),
            _ => Err(format!("Invalid move: {}", s)),
        }
    }
}

/// Per-player values reported by the game engine each turn
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PlayerStatus {
    pub id: PlayerId,
    pub name: String,
    pub snippets: u32,
    pub has_weapon: bool,
    pub is_paralyzed: bool,
}

impl PlayerStatus {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        PlayerStatus {
            id,
            name: name.into(),
            snippets: 0,
            has_weapon: false,
            is_paralyzed: false,
        }
    }

    pub fn armed(mut self) -> Self {
        self.has_weapon = true;
        self
    }
}

/// Merges weighted position sets, keeping the largest weight per cell
pub fn merge_max(sets: &[&Weights]) -> Weights {
    let mut merged = Weights::new();
    for set in sets {
        for (&position, &weight) in set.iter() {
            let entry = merged.entry(position).or_insert(0);
            *entry = (*entry).max(weight);
        }
    }
    merged
}
