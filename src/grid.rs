// Static per-turn map of the field
//
// Each cell keeps the raw tag string sent by the engine ("x" wall, "C" item,
// "W" weapon, "E" hazard, digits for players). Passability is a pure function
// of the cells plus the hazard positions of the same turn.

use crate::types::{Move, Position, Weights};

const WALL_TAG: char = 'x';

/// Wall cells that let hazards out of their spawn room.
/// The cells are passable exactly while a hazard is inside the cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HazardSource {
    cells: Vec<Position>,
}

impl HazardSource {
    pub fn new(cells: Vec<Position>) -> Self {
        HazardSource { cells }
    }

    pub fn contains(&self, position: &Position) -> bool {
        self.cells.contains(position)
    }

    pub fn cells(&self) -> &[Position] {
        &self.cells
    }
}

#[derive(Debug, Clone)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<String>,
    sources: Vec<HazardSource>,
    open_sources: Vec<bool>,
}

impl Grid {
    /// Builds the grid from row-major cell tags.
    /// `hazards` decides which hazard sources are open this turn.
    pub fn new(
        width: i32,
        height: i32,
        cells: Vec<String>,
        sources: Vec<HazardSource>,
        hazards: &Weights,
    ) -> Self {
        let open_sources = sources
            .iter()
            .map(|source| hazards.keys().any(|h| source.contains(h)))
            .collect();

        Grid {
            width,
            height,
            cells,
            sources,
            open_sources,
        }
    }

    /// Builds a grid without hazard sources from comma separated rows.
    /// Every `E` tag counts as a hazard.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len() as i32;
        let width = rows.first().map(|r| r.split(',').count()).unwrap_or(0) as i32;
        let cells: Vec<String> = rows
            .iter()
            .flat_map(|row| row.split(',').map(|c| c.trim().to_string()))
            .collect();

        let mut hazards = Weights::new();
        for (index, tags) in cells.iter().enumerate() {
            let count = tags.chars().filter(|&c| c == 'E').count() as u32;
            if count > 0 && width > 0 {
                let position = Position::new(index as i32 % width, index as i32 / width);
                hazards.insert(position, count);
            }
        }

        Grid::new(width, height, cells, Vec::new(), &hazards)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, position: &Position) -> bool {
        position.x >= 0 && position.x < self.width && position.y >= 0 && position.y < self.height
    }

    /// Raw tag string of a cell, `None` outside the field
    pub fn cell(&self, position: &Position) -> Option<&str> {
        if !self.in_bounds(position) {
            return None;
        }
        let index = (position.x + position.y * self.width) as usize;
        self.cells.get(index).map(String::as_str)
    }

    /// Returns whether a player or hazard can stand on the position
    pub fn is_passable(&self, position: &Position) -> bool {
        if !self.in_bounds(position) {
            return false;
        }

        // Hazard sources are marked as walls; they open while occupied
        if let Some(index) = self.sources.iter().position(|s| s.contains(position)) {
            return self.open_sources[index];
        }

        self.cell(position)
            .map(|tags| !tags.contains(WALL_TAG))
            .unwrap_or(false)
    }

    /// Moves from `position` that stay on the field and avoid walls,
    /// in Up, Down, Left, Right order
    pub fn valid_moves(&self, position: &Position) -> Vec<Move> {
        Move::all()
            .into_iter()
            .filter(|mv| self.is_passable(&mv.apply(position)))
            .collect()
    }

    /// Number of open neighbours
    pub fn degree(&self, position: &Position) -> usize {
        self.valid_moves(position).len()
    }

    /// A cell with more than two open neighbours
    pub fn is_intersection(&self, position: &Position) -> bool {
        self.degree(position) > 2
    }

    /// Serializes the cells back to the engine's comma separated form
    pub fn to_field_string(&self) -> String {
        self.cells.join(",")
    }
}
