// Walks over the grid
//
// A Path is an immutable value. Extending it produces a new Path whose step
// chain shares the parent's steps, so BFS branches never copy move lists.
// Positions are derived lazily from the moves and memoized per Path.

use std::cell::{OnceCell, RefCell, RefMut};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::rc::Rc;

use crate::error::PathError;
use crate::grid::Grid;
use crate::types::{Move, Position};

#[derive(Debug)]
struct Step {
    mv: Move,
    /// Number of moves up to and including this one
    index: usize,
    intersection: bool,
    hazard_weight: u32,
    prev: Option<Rc<Step>>,
}

#[derive(Debug, Clone)]
pub struct Path {
    start: Position,
    end: Position,
    last: Option<Rc<Step>>,
    intersections: usize,
    hazard_total: u32,
    moves: OnceCell<Vec<Move>>,
    positions: RefCell<Vec<Position>>,
}

impl Path {
    /// Zero-length path at `origin`
    pub fn new(origin: Position) -> Self {
        Path {
            start: origin,
            end: origin,
            last: None,
            intersections: 0,
            hazard_total: 0,
            moves: OnceCell::new(),
            positions: RefCell::new(vec![origin]),
        }
    }

    /// Appends `mv`, failing if the destination cannot be stood on
    pub fn extend(&self, mv: Move, grid: &Grid) -> Result<Path, PathError> {
        let destination = mv.apply(&self.end);
        self.extend_weighted(mv, destination, 0, grid)
    }

    /// Appends `mv` and records `hazard_weight` against the new move index
    /// when it is nonzero
    pub fn extend_weighted(
        &self,
        mv: Move,
        destination: Position,
        hazard_weight: u32,
        grid: &Grid,
    ) -> Result<Path, PathError> {
        if mv == Move::Pass || mv.apply(&self.end) != destination || !grid.is_passable(&destination)
        {
            return Err(PathError::InvalidExtension {
                from: self.end,
                mv,
                to: destination,
            });
        }

        Ok(self.push(mv, destination, grid.is_intersection(&destination), hazard_weight))
    }

    fn push(&self, mv: Move, end: Position, intersection: bool, hazard_weight: u32) -> Path {
        let step = Step {
            mv,
            index: self.len() + 1,
            intersection,
            hazard_weight,
            prev: self.last.clone(),
        };

        Path {
            start: self.start,
            end,
            last: Some(Rc::new(step)),
            intersections: self.intersections + usize::from(intersection),
            hazard_total: self.hazard_total.saturating_add(hazard_weight),
            moves: OnceCell::new(),
            positions: RefCell::new(vec![self.start]),
        }
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    /// Number of moves
    pub fn len(&self) -> usize {
        self.last.as_ref().map(|s| s.index).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.last.is_none()
    }

    /// Steps in walking order
    fn steps(&self) -> Vec<Rc<Step>> {
        let mut steps = Vec::with_capacity(self.len());
        let mut cursor = self.last.clone();
        while let Some(step) = cursor {
            cursor = step.prev.clone();
            steps.push(step);
        }
        steps.reverse();
        steps
    }

    pub fn moves(&self) -> &[Move] {
        self.moves
            .get_or_init(|| self.steps().iter().map(|s| s.mv).collect())
    }

    pub fn first_move(&self) -> Option<Move> {
        self.moves().first().copied()
    }

    /// The nth position, `0` being the start and `len()` the end
    pub fn position(&self, n: usize) -> Result<Position, PathError> {
        let len = self.len();
        if n > len {
            return Err(PathError::IndexOutOfRange { index: n, len });
        }

        Ok(self.cached_positions(n)[n])
    }

    /// All positions from start to end
    pub fn positions(&self) -> Vec<Position> {
        self.cached_positions(self.len()).clone()
    }

    /// Position cache grown through index `n`, capped at the end
    fn cached_positions(&self, n: usize) -> RefMut<'_, Vec<Position>> {
        let moves = self.moves();
        let mut cache = self.positions.borrow_mut();
        for mv in moves.iter().take(n).skip(cache.len() - 1) {
            let next = mv.apply(&cache[cache.len() - 1]);
            cache.push(next);
        }
        cache
    }

    /// Index of the first occurrence of `position`
    pub fn index_of(&self, position: &Position) -> Option<usize> {
        self.positions().iter().position(|p| p == position)
    }

    /// Move indices (1-based) at which an intersection was entered
    pub fn intersection_moves(&self) -> Vec<usize> {
        self.steps()
            .iter()
            .filter(|s| s.intersection)
            .map(|s| s.index)
            .collect()
    }

    pub fn intersection_count(&self) -> usize {
        self.intersections
    }

    pub fn ends_at_intersection(&self) -> bool {
        self.last.as_ref().map(|s| s.intersection).unwrap_or(false)
    }

    /// Intersections crossed before the final cell
    pub fn intersections_before_end(&self) -> usize {
        self.intersections - usize::from(self.ends_at_intersection())
    }

    /// Hazard weights tolerated along the way, keyed by move index
    pub fn hazard_weights(&self) -> BTreeMap<usize, u32> {
        self.steps()
            .iter()
            .filter(|s| s.hazard_weight > 0)
            .map(|s| (s.index, s.hazard_weight))
            .collect()
    }

    /// Total tolerated hazard weight
    pub fn hazards_crossed(&self) -> u32 {
        self.hazard_total
    }

    /// Hazards met early weigh more than hazards met late
    pub fn threat_score(&self) -> f64 {
        self.hazard_weights()
            .iter()
            .map(|(&index, &weight)| f64::from(weight) / index as f64)
            .sum()
    }

    /// The slice between the first `from` and the first `to` after it,
    /// re-indexed from zero
    pub fn sub_path(&self, from: Position, to: Position) -> Result<Path, PathError> {
        let positions = self.positions();
        let i = positions
            .iter()
            .position(|p| *p == from)
            .ok_or(PathError::EndpointNotFound { position: from })?;
        let j = positions[i..]
            .iter()
            .position(|p| *p == to)
            .map(|k| k + i)
            .ok_or(PathError::EndpointNotFound { position: to })?;

        let steps = self.steps();
        let mut sub = Path::new(from);
        for step in &steps[i..j] {
            let end = step.mv.apply(&sub.end);
            sub = sub.push(step.mv, end, step.intersection, step.hazard_weight);
        }
        Ok(sub)
    }

    /// Positions shared with `other`, in this path's walking order
    pub fn intersecting_positions(&self, other: &Path) -> Vec<Position> {
        let theirs: HashSet<Position> = other.positions().into_iter().collect();
        self.positions()
            .into_iter()
            .filter(|p| theirs.contains(p))
            .collect()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let moves: Vec<&str> = self.moves().iter().map(Move::as_str).collect();
        write!(f, "{}, {}: [{}]", self.start, self.end, moves.join(", "))
    }
}
