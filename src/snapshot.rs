// One turn of game state
//
// A snapshot is parsed from the engine's field text and never changes
// afterwards. It may hold the snapshot of the turn before, which itself
// never holds another one.

use std::collections::{BTreeMap, HashSet};

use crate::error::SnapshotError;
use crate::grid::{Grid, HazardSource};
use crate::types::{PlayerId, PlayerStatus, Position, Weights};

const ITEM_TAG: char = 'C';
const WEAPON_TAG: char = 'W';
const HAZARD_TAG: char = 'E';

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub status: PlayerStatus,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct Snapshot {
    round: u32,
    grid: Grid,
    players: BTreeMap<PlayerId, PlayerState>,
    hazards: Weights,
    snippets: HashSet<Position>,
    weapons: HashSet<Position>,
    previous: Option<Box<Snapshot>>,
}

impl Snapshot {
    /// Parses a row-major, comma separated field.
    ///
    /// Every player in `statuses` must appear on the field.
    pub fn from_field(
        round: u32,
        width: i32,
        height: i32,
        field: &str,
        statuses: &[PlayerStatus],
        sources: &[HazardSource],
    ) -> Result<Self, SnapshotError> {
        if width <= 0 || height <= 0 {
            return Err(SnapshotError::InvalidDimensions { width, height });
        }

        let cells: Vec<String> = field.split(',').map(|c| c.trim().to_string()).collect();
        let expected = (width * height) as usize;
        if cells.len() != expected {
            return Err(SnapshotError::FieldSize {
                expected,
                actual: cells.len(),
            });
        }

        let mut hazards = Weights::new();
        let mut snippets = HashSet::new();
        let mut weapons = HashSet::new();
        let mut found: BTreeMap<PlayerId, Position> = BTreeMap::new();

        for (index, tags) in cells.iter().enumerate() {
            let position = Position::new(index as i32 % width, index as i32 / width);
            for tag in tags.chars() {
                match tag {
                    ITEM_TAG => {
                        snippets.insert(position);
                    }
                    WEAPON_TAG => {
                        weapons.insert(position);
                    }
                    HAZARD_TAG => {
                        *hazards.entry(position).or_insert(0) += 1;
                    }
                    digit if digit.is_ascii_digit() => {
                        found.insert(digit as u8 - b'0', position);
                    }
                    _ => {}
                }
            }
        }

        let mut players = BTreeMap::new();
        for status in statuses {
            let position = *found
                .get(&status.id)
                .ok_or(SnapshotError::MissingPlayer(status.id))?;
            players.insert(
                status.id,
                PlayerState {
                    status: status.clone(),
                    position,
                },
            );
        }

        let grid = Grid::new(width, height, cells, sources.to_vec(), &hazards);

        Ok(Snapshot {
            round,
            grid,
            players,
            hazards,
            snippets,
            weapons,
            previous: None,
        })
    }

    /// Links the snapshot of the preceding turn, dropping its own link
    pub fn with_previous(mut self, mut previous: Snapshot) -> Self {
        previous.previous = None;
        self.previous = Some(Box::new(previous));
        self
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.get(&id)
    }

    pub fn players(&self) -> impl Iterator<Item = &PlayerState> {
        self.players.values()
    }

    /// Any other player, the lowest id first
    pub fn opponent_of(&self, id: PlayerId) -> Option<PlayerId> {
        self.players.keys().copied().find(|&other| other != id)
    }

    /// Hazard positions with the number of hazards on each
    pub fn hazards(&self) -> &Weights {
        &self.hazards
    }

    pub fn snippets(&self) -> &HashSet<Position> {
        &self.snippets
    }

    pub fn weapons(&self) -> &HashSet<Position> {
        &self.weapons
    }

    pub fn previous(&self) -> Option<&Snapshot> {
        self.previous.as_deref()
    }
}
