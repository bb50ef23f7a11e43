// Breadth-first path search
//
// Every query of the engine goes through `search`: reach a set of targets
// (or a frontier when there are none) while refusing avoided cells beyond a
// per-branch tolerance budget.

use std::collections::{HashSet, VecDeque};

use crate::error::PathError;
use crate::grid::Grid;
use crate::path::Path;
use crate::types::{Position, Weights};

/// Tolerance that accepts any finite amount of avoided weight
pub const UNBOUNDED: u32 = u32::MAX / 2;

/// Avoid weight that no tolerance budget can absorb
pub const PROHIBITIVE: u32 = u32::MAX;

/// Cutoff that never stops a branch
pub fn no_cutoff(_: &Path) -> bool {
    true
}

/// Returns every shortest path from `origin` to any of `targets`.
///
/// Paths come out in non-decreasing length. A branch whose extension fails
/// `continue_while` stops there; with no targets the unextended path is
/// returned as a reachable frontier.
pub fn search<F>(
    grid: &Grid,
    origin: Position,
    targets: &HashSet<Position>,
    avoid: &Weights,
    tolerance: u32,
    continue_while: F,
) -> Result<Vec<Path>, PathError>
where
    F: Fn(&Path) -> bool,
{
    let mut results = Vec::new();
    let mut visited: HashSet<Position> = HashSet::new();
    let mut queue: VecDeque<(Path, u32)> = VecDeque::new();

    visited.insert(origin);
    queue.push_back((Path::new(origin), 0));

    while let Some((current, consumed)) = queue.pop_front() {
        let end = current.end();

        for mv in grid.valid_moves(&end) {
            let destination = mv.apply(&end);
            let weight = avoid.get(&destination).copied().unwrap_or(0);
            let next = current.extend_weighted(mv, destination, weight, grid)?;

            if !continue_while(&next) {
                if targets.is_empty() {
                    results.push(current.clone());
                }
                break;
            }

            if visited.contains(&destination) {
                continue;
            }

            let spent = consumed.saturating_add(weight);
            if weight > 0 && spent > tolerance {
                continue;
            }

            if targets.contains(&destination) {
                results.push(next.clone());
            }

            visited.insert(destination);
            queue.push_back((next, spent));
        }
    }

    Ok(results)
}

/// Runs `search` once per first move from `origin` so that every direction
/// reaching a target contributes its own shortest path.
///
/// Results are ordered by length, then by threat score.
pub fn search_per_direction<F>(
    grid: &Grid,
    origin: Position,
    targets: &HashSet<Position>,
    avoid: &Weights,
    tolerance: u32,
    continue_while: F,
) -> Result<Vec<Path>, PathError>
where
    F: Fn(&Path) -> bool,
{
    let first_steps: Vec<Position> = grid
        .valid_moves(&origin)
        .into_iter()
        .map(|mv| mv.apply(&origin))
        .collect();

    let mut results = Vec::new();
    for step in &first_steps {
        let mut restricted = avoid.clone();
        for other in first_steps.iter().filter(|p| *p != step) {
            restricted.insert(*other, PROHIBITIVE);
        }

        results.extend(search(
            grid,
            origin,
            targets,
            &restricted,
            tolerance,
            &continue_while,
        )?);
    }

    results.sort_by(|a, b| {
        a.len()
            .cmp(&b.len())
            .then_with(|| a.threat_score().total_cmp(&b.threat_score()))
    });
    Ok(results)
}

/// Distinct end positions in first-seen order
pub fn destinations(paths: &[Path]) -> Vec<Position> {
    let mut seen = HashSet::new();
    paths
        .iter()
        .map(Path::end)
        .filter(|p| seen.insert(*p))
        .collect()
}
