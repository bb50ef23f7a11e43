// Trap detection
//
// Walks each threat path from the player outwards. An intersection (or a
// target) the threat can reach no later than the player is a trap. When every
// exit of an earlier intersection ends in a trap, that intersection becomes a
// trap too.

use std::collections::{HashMap, HashSet};

use log::trace;

use crate::config::TrapConfig;
use crate::error::PathError;
use crate::grid::Grid;
use crate::path::Path;
use crate::search::search;
use crate::threat::ThreatAssessment;
use crate::types::{merge_max, Position, Weights};

pub struct TrapDetector<'a> {
    grid: &'a Grid,
    config: &'a TrapConfig,
}

impl<'a> TrapDetector<'a> {
    pub fn new(grid: &'a Grid, config: &'a TrapConfig) -> Self {
        TrapDetector { grid, config }
    }

    /// Trap positions weighted by the threats that close them
    pub fn detect(&self, threats: &ThreatAssessment) -> Result<Weights, PathError> {
        let mut traps = Weights::new();
        let mut junctions: HashMap<Position, Junction> = HashMap::new();

        for threat in threats.threat_paths() {
            let path = &threat.path;
            let total = path.len();

            if total <= self.config.min_hazard_distance {
                continue;
            }
            if total > self.config.speculative_length
                && path.intersection_count() > self.config.speculative_intersections
            {
                continue;
            }

            let mut open: Vec<(Position, Position)> = Vec::new();
            for i in 1..=total {
                let position = path.position(i)?;
                let branching = self.grid.degree(&position).saturating_sub(1);
                let intersection = branching > 1;

                if (intersection || threats.targets.contains(&position)) && i >= total - i {
                    trace!("Trap at {} from threat at {}", position, path.end());
                    close(&mut traps, &mut junctions, &mut open, position, threat.weight);
                    break;
                }

                if intersection {
                    // i < total here, the end always satisfies the trap timing
                    let exit = path.position(i + 1)?;
                    let junction = junctions.entry(position).or_insert_with(|| Junction {
                        branches: branching,
                        closed: HashSet::new(),
                    });
                    let last_open_exit = junction.remaining() == 1 && !junction.closed.contains(&exit);
                    if last_open_exit && !self.intersection_ahead(path, i)? {
                        trace!("Dead corridor at {} toward {}", position, path.end());
                        close(&mut traps, &mut junctions, &mut open, position, threat.weight);
                        break;
                    }
                    open.push((position, exit));
                }
            }
        }

        Ok(traps)
    }

    fn intersection_ahead(&self, path: &Path, from: usize) -> Result<bool, PathError> {
        for k in from + 1..path.len() {
            if self.grid.is_intersection(&path.position(k)?) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// A player is trapped when it cannot make a few safe moves, or cannot
    /// reach an intersection without passing nearby threats
    pub fn is_trapped(&self, threats: &ThreatAssessment) -> Result<bool, PathError> {
        let none = HashSet::new();
        let escape_moves = self.config.escape_moves;

        let escapes = search(
            self.grid,
            threats.origin,
            &none,
            &threats.immediate,
            0,
            |p: &Path| p.len() < escape_moves,
        )?;
        if escapes.is_empty() {
            return Ok(true);
        }

        let avoid = merge_max(&[&threats.immediate, &threats.nearby]);
        let exits = search(
            self.grid,
            threats.origin,
            &none,
            &avoid,
            0,
            |p: &Path| p.intersections_before_end() == 0,
        )?;
        Ok(exits.is_empty())
    }

    /// Whether the player can be shut in given its traps and its own
    /// tolerance budget
    pub fn is_trappable(
        &self,
        threats: &ThreatAssessment,
        traps: &Weights,
        tolerance: u32,
    ) -> Result<bool, PathError> {
        let avoid = merge_max(&[&threats.nearby, traps]);
        let exits = search(
            self.grid,
            threats.origin,
            &HashSet::new(),
            &avoid,
            tolerance,
            |p: &Path| p.intersections_before_end() == 0,
        )?;
        Ok(exits.is_empty())
    }
}

/// Exits of an intersection walked away from the player, and the first
/// cells of those already closed by a trap
struct Junction {
    branches: usize,
    closed: HashSet<Position>,
}

impl Junction {
    fn remaining(&self) -> usize {
        self.branches.saturating_sub(self.closed.len())
    }
}

/// Marks `position` and walks the open intersections back toward the player,
/// marking each one whose last exit just closed. An exit closed twice counts
/// once.
fn close(
    traps: &mut Weights,
    junctions: &mut HashMap<Position, Junction>,
    open: &mut Vec<(Position, Position)>,
    position: Position,
    weight: u32,
) {
    *traps.entry(position).or_insert(0) += weight;

    while let Some((parent, exit)) = open.pop() {
        let Some(junction) = junctions.get_mut(&parent) else {
            break;
        };
        if !junction.closed.insert(exit) || junction.remaining() > 0 {
            break;
        }
        *traps.entry(parent).or_insert(0) += weight;
    }
}
