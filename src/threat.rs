// Threat classification
//
// For one player, finds every hazard (and an armed opponent) reachable on the
// grid, discards hazards that look like they are walking away, and sorts the
// rest by how soon they can interfere.

use std::collections::HashSet;

use log::debug;

use crate::config::ThreatConfig;
use crate::error::EngineError;
use crate::path::Path;
use crate::search::{no_cutoff, search};
use crate::snapshot::Snapshot;
use crate::types::{PlayerId, Position, Weights};

/// A shortest path from the player to a threat, with the threat's weight
/// after the retreat discount
#[derive(Debug, Clone)]
pub struct ThreatPath {
    pub path: Path,
    pub weight: u32,
}

#[derive(Debug, Clone)]
pub struct ThreatAssessment {
    pub player: PlayerId,
    pub origin: Position,
    /// Every hazard, plus the opponent while it is armed
    pub potential: Weights,
    /// Threats still considered dangerous, keyed by their position
    pub confirmed: Weights,
    pub paths: Vec<ThreatPath>,
    /// Cells next to the player a threat can step onto next turn
    pub immediate: Weights,
    /// Threats reachable through few intersections
    pub nearby: Weights,
    pub distant: Weights,
    /// Items, plus weapons while the player is unarmed
    pub targets: HashSet<Position>,
}

impl ThreatAssessment {
    /// Threat paths ordered the way the search produced them, shortest first
    pub fn threat_paths(&self) -> &[ThreatPath] {
        &self.paths
    }
}

/// Classifies the threats facing `player`, with `opponent` counted as a
/// threat while it holds the weapon
pub fn assess(
    snapshot: &Snapshot,
    player: PlayerId,
    opponent: Option<PlayerId>,
    config: &ThreatConfig,
) -> Result<ThreatAssessment, EngineError> {
    let me = snapshot
        .player(player)
        .ok_or(EngineError::UnknownPlayer(player))?;
    let origin = me.position;
    let hazards = snapshot.hazards();

    let mut potential = hazards.clone();
    if let Some(other) = opponent.and_then(|id| snapshot.player(id)) {
        if other.status.has_weapon {
            *potential.entry(other.position).or_insert(0) += 1;
        }
    }

    let threat_cells: HashSet<Position> = potential.keys().copied().collect();
    let found = search(
        snapshot.grid(),
        origin,
        &threat_cells,
        &Weights::new(),
        0,
        no_cutoff,
    )?;

    let previous_hazards = snapshot.previous().map(|s| s.hazards());

    let mut paths = Vec::with_capacity(found.len());
    let mut confirmed = Weights::new();
    for path in found {
        let end = path.end();
        let weight = potential.get(&end).copied().unwrap_or(0);
        let hazard_count = hazards.get(&end).copied().unwrap_or(0);

        // A hazard that stood one step closer last turn is walking away
        let discount = match previous_hazards {
            Some(previous) if hazard_count > 0 => {
                let behind = path.position(path.len() - 1)?;
                previous
                    .get(&behind)
                    .copied()
                    .unwrap_or(0)
                    .min(hazard_count)
            }
            _ => 0,
        };

        let weight = weight - discount;
        if weight == 0 {
            debug!("Player {}: threat at {} is retreating", player, end);
            continue;
        }

        confirmed.insert(end, weight);
        paths.push(ThreatPath { path, weight });
    }

    let mut immediate = Weights::new();
    let mut nearby = Weights::new();
    let mut distant = Weights::new();
    let neighbours: HashSet<Position> = snapshot
        .grid()
        .valid_moves(&origin)
        .into_iter()
        .map(|mv| mv.apply(&origin))
        .collect();
    for threat in &paths {
        if threat.path.len() <= config.immediate_range {
            let end = threat.path.end();
            let mut reached: Vec<Position> = search(
                snapshot.grid(),
                end,
                &neighbours,
                &Weights::new(),
                0,
                |p: &Path| p.len() < config.immediate_range,
            )?
            .iter()
            .map(Path::end)
            .collect();
            if neighbours.contains(&end) {
                reached.push(end);
            }
            for cell in reached {
                *immediate.entry(cell).or_insert(0) += threat.weight;
            }
        }

        let end = threat.path.end();
        if threat.path.intersection_count() < config.nearby_max_intersections {
            nearby.insert(end, threat.weight);
        } else {
            distant.insert(end, threat.weight);
        }
    }

    let mut targets: HashSet<Position> = snapshot.snippets().clone();
    if !me.status.has_weapon {
        targets.extend(snapshot.weapons().iter().copied());
    }

    Ok(ThreatAssessment {
        player,
        origin,
        potential,
        confirmed,
        paths,
        immediate,
        nearby,
        distant,
        targets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::types::PlayerStatus;

    fn config() -> ThreatConfig {
        Config::default_hardcoded().threats
    }

    fn snapshot(field: &str, width: i32, height: i32, statuses: &[PlayerStatus]) -> Snapshot {
        Snapshot::from_field(1, width, height, field, statuses, &[]).unwrap()
    }

    fn players() -> Vec<PlayerStatus> {
        vec![PlayerStatus::new(0, "player0"), PlayerStatus::new(1, "player1")]
    }

    #[test]
    fn test_hazard_two_moves_away_threatens_adjacent_cell() {
        let s = snapshot("C,E,.,0,.,.,1", 7, 1, &players());
        let threats = assess(&s, 0, Some(1), &config()).unwrap();

        assert_eq!(threats.confirmed[&Position::new(1, 0)], 1);
        assert_eq!(threats.immediate[&Position::new(2, 0)], 1);
        assert_eq!(threats.nearby[&Position::new(1, 0)], 1);
        assert!(threats.distant.is_empty());
        assert_eq!(threats.targets, [Position::new(0, 0)].into_iter().collect());
    }

    #[test]
    fn test_diagonal_hazard_threatens_both_shared_neighbours() {
        let rows = [".,.,.,.,.", ".,.,.,.,.", ".,.,0,.,.", ".,E,.,.,.", ".,.,.,.,."];
        let s = snapshot(&rows.join(","), 5, 5, &[PlayerStatus::new(0, "player0")]);
        let threats = assess(&s, 0, None, &config()).unwrap();

        assert_eq!(
            threats.immediate,
            [(Position::new(1, 2), 1), (Position::new(2, 3), 1)].into()
        );
    }

    #[test]
    fn test_hazard_next_to_player_threatens_its_own_cell() {
        let s = snapshot(".,E,0,.,.", 5, 1, &[PlayerStatus::new(0, "player0")]);
        let threats = assess(&s, 0, None, &config()).unwrap();
        assert_eq!(threats.immediate, [(Position::new(1, 0), 1)].into());
    }

    #[test]
    fn test_unarmed_opponent_is_not_a_threat() {
        let s = snapshot(".,0,.,1", 4, 1, &players());
        let threats = assess(&s, 0, Some(1), &config()).unwrap();
        assert!(threats.potential.is_empty());
        assert!(threats.paths.is_empty());
    }

    #[test]
    fn test_armed_opponent_is_a_threat() {
        let statuses = vec![PlayerStatus::new(0, "player0"), PlayerStatus::new(1, "player1").armed()];
        let s = snapshot(".,0,.,1E", 4, 1, &statuses);
        let threats = assess(&s, 0, Some(1), &config()).unwrap();

        assert_eq!(threats.potential[&Position::new(3, 0)], 2);
        assert_eq!(threats.confirmed[&Position::new(3, 0)], 2);
        assert_eq!(threats.immediate[&Position::new(2, 0)], 2);
    }

    #[test]
    fn test_retreating_hazard_is_discounted() {
        let before = snapshot("C,.,E,0,.,.,1", 7, 1, &players());
        let now = snapshot("C,E,.,0,.,.,1", 7, 1, &players()).with_previous(before);
        let threats = assess(&now, 0, Some(1), &config()).unwrap();

        assert!(threats.confirmed.is_empty());
        assert!(threats.immediate.is_empty());
    }

    #[test]
    fn test_approaching_hazard_is_kept() {
        let before = snapshot("E,.,.,0,.,.,1", 7, 1, &players());
        let now = snapshot(".,E,.,0,.,.,1", 7, 1, &players()).with_previous(before);
        let threats = assess(&now, 0, Some(1), &config()).unwrap();
        assert_eq!(threats.confirmed[&Position::new(1, 0)], 1);
    }

    #[test]
    fn test_retreat_discount_never_covers_opponent() {
        let statuses = vec![PlayerStatus::new(0, "player0"), PlayerStatus::new(1, "player1").armed()];
        let before = snapshot(".,0,E,.,1", 5, 1, &statuses);
        let now = snapshot(".,0,.,E1,.", 5, 1, &statuses).with_previous(before);
        let threats = assess(&now, 0, Some(1), &config()).unwrap();
        assert_eq!(threats.confirmed[&Position::new(3, 0)], 1);
    }

    #[test]
    fn test_far_threats_behind_intersections_are_distant() {
        // 0 sits in a corridor, the hazard behind two junctions
        let rows = [
            "0,.,.,.,.,.,.",
            "x,x,.,x,x,.,x",
            "x,x,.,x,x,.,E",
        ];
        let s = snapshot(&rows.join(","), 7, 3, &[PlayerStatus::new(0, "player0")]);
        let threats = assess(&s, 0, None, &config()).unwrap();

        assert_eq!(threats.paths.len(), 1);
        assert!(threats.immediate.is_empty());
        assert!(threats.nearby.is_empty());
        assert_eq!(threats.distant[&Position::new(6, 2)], 1);
    }

    #[test]
    fn test_armed_player_does_not_target_weapons() {
        let statuses = vec![PlayerStatus::new(0, "player0").armed()];
        let s = snapshot("W,0,C", 3, 1, &statuses);
        let threats = assess(&s, 0, None, &config()).unwrap();
        assert_eq!(threats.targets, [Position::new(2, 0)].into_iter().collect());
    }

    #[test]
    fn test_unknown_player() {
        let s = snapshot("0,.,1", 3, 1, &players());
        assert!(matches!(
            assess(&s, 7, None, &config()),
            Err(EngineError::UnknownPlayer(7))
        ));
    }
}
