// Move decision
//
// Each turn the bot builds candidate paths for itself and its opponent through
// a cascade of avoidance regimes, scores its own paths against the opponent's
// and answers the first move with the highest total score.

use log::{debug, error, info};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;
use std::time::Instant;

use crate::config::Config;
use crate::error::EngineError;
use crate::path::Path;
use crate::search::{destinations, no_cutoff, search, search_per_direction, UNBOUNDED};
use crate::snapshot::{PlayerState, Snapshot};
use crate::threat::{assess, ThreatAssessment};
use crate::trap::TrapDetector;
use crate::types::{merge_max, Move, PlayerId, Position, Weights};

/// Avoidance regime that produced the candidate paths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Waiting on, or heading for, a cell that shuts the opponent in
    Hunt,
    /// Avoid every confirmed threat, the cells next to it and all traps
    Full,
    /// Ignore threats behind several intersections
    DropDistant,
    /// Only avoid immediate threats and traps
    DropNearby,
    /// No target reachable; move toward any safe frontier
    Evade,
    /// Cross threats if needed, preferring paths that cross fewer
    Unsafe,
    UnsafeEvade,
}

/// Outcome of one turn
#[derive(Debug, Clone)]
pub struct Decision {
    pub chosen: Move,
    /// Accumulated score per first move
    pub scores: BTreeMap<Move, f64>,
    /// `None` when no candidate path exists
    pub stage: Option<Stage>,
}

impl Decision {
    fn pass(stage: Option<Stage>) -> Self {
        Decision {
            chosen: Move::Pass,
            scores: BTreeMap::new(),
            stage,
        }
    }
}

enum Plan {
    /// Stay on the current cell
    Hold,
    Follow { stage: Stage, paths: Vec<Path> },
    Stuck,
}

/// Threats and traps for one player, computed at most once per turn
struct PlayerAnalysis {
    threats: ThreatAssessment,
    traps: Weights,
}

/// What the opponent will likely do, as far as it matters for scoring
struct Rival {
    paths: Vec<Path>,
    destinations: Vec<Position>,
    /// Move index of each cell on the opponent's shortest path to us
    pursuit: HashMap<Position, usize>,
}

impl Rival {
    fn factor(&self, path: &Path, boost: f64) -> f64 {
        let end = path.end();
        if let Some(theirs) = self.paths.iter().find(|p| p.end() == end) {
            if theirs.len() < path.len() {
                // Concede what the opponent wants most
                let rank = self
                    .destinations
                    .iter()
                    .position(|d| *d == end)
                    .unwrap_or(0);
                return (rank + 1) as f64 / (self.destinations.len() + 1) as f64;
            }
        }

        let squeezes = path
            .positions()
            .iter()
            .enumerate()
            .skip(1)
            .any(|(mine, position)| {
                self.pursuit
                    .get(position)
                    .is_some_and(|&theirs| theirs >= mine)
            });
        if squeezes {
            boost
        } else {
            1.0
        }
    }
}

/// Per-turn memo of player analyses. Dropped once the move is chosen.
struct TurnContext<'a> {
    snapshot: &'a Snapshot,
    config: &'a Config,
    analyses: HashMap<PlayerId, Rc<PlayerAnalysis>>,
}

impl<'a> TurnContext<'a> {
    fn new(snapshot: &'a Snapshot, config: &'a Config) -> Self {
        TurnContext {
            snapshot,
            config,
            analyses: HashMap::new(),
        }
    }

    fn state(&self, player: PlayerId) -> Result<&'a PlayerState, EngineError> {
        self.snapshot
            .player(player)
            .ok_or(EngineError::UnknownPlayer(player))
    }

    fn detector(&self) -> TrapDetector<'a> {
        TrapDetector::new(self.snapshot.grid(), &self.config.traps)
    }

    fn analysis(&mut self, player: PlayerId) -> Result<Rc<PlayerAnalysis>, EngineError> {
        if let Some(found) = self.analyses.get(&player) {
            return Ok(Rc::clone(found));
        }

        let opponent = self.snapshot.opponent_of(player);
        let threats = assess(self.snapshot, player, opponent, &self.config.threats)?;
        let traps = self.detector().detect(&threats)?;
        debug!(
            "Player {}: {} threats, {} immediate, {} traps",
            player,
            threats.confirmed.len(),
            threats.immediate.len(),
            traps.len()
        );

        let analysis = Rc::new(PlayerAnalysis { threats, traps });
        self.analyses.insert(player, Rc::clone(&analysis));
        Ok(analysis)
    }

    /// Candidate paths for `player`, from the safest regime that yields any
    fn plan(&mut self, player: PlayerId) -> Result<Plan, EngineError> {
        let state = self.state(player)?;
        let analysis = self.analysis(player)?;
        let threats = &analysis.threats;
        let traps = &analysis.traps;
        let tolerance = self.config.search.tolerance(state.status.has_weapon);

        let full = merge_max(&[&threats.confirmed, &threats.immediate, traps]);
        if let Some(plan) = self.hunt(player, &full, tolerance)? {
            return Ok(plan);
        }

        let drop_distant = merge_max(&[&threats.nearby, &threats.immediate, traps]);
        let drop_nearby = merge_max(&[&threats.immediate, traps]);
        let horizon = Some(self.config.search.idle_horizon);
        let none = HashSet::new();
        let targets = &threats.targets;

        let regimes = [
            (Stage::Full, targets, &full, tolerance, None),
            (Stage::DropDistant, targets, &drop_distant, tolerance, None),
            (Stage::DropNearby, targets, &drop_nearby, tolerance, None),
            (Stage::Evade, &none, &drop_nearby, tolerance, horizon),
            (Stage::Unsafe, targets, &full, UNBOUNDED, None),
            (Stage::UnsafeEvade, &none, &full, UNBOUNDED, horizon),
        ];

        for (stage, goals, avoid, budget, limit) in regimes {
            if limit.is_none() && goals.is_empty() {
                continue;
            }

            let paths: Vec<Path> = search_per_direction(
                self.snapshot.grid(),
                state.position,
                goals,
                avoid,
                budget,
                |p: &Path| limit.map_or(true, |max| p.len() < max),
            )?
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect();

            if !paths.is_empty() {
                debug!(
                    "Player {}: {:?} regime gives {} paths",
                    player,
                    stage,
                    paths.len()
                );
                return Ok(Plan::Follow { stage, paths });
            }
        }

        Ok(Plan::Stuck)
    }

    /// An armed player heads for a trap of an unarmed opponent that can
    /// still be shut in
    fn hunt(
        &mut self,
        player: PlayerId,
        avoid: &Weights,
        tolerance: u32,
    ) -> Result<Option<Plan>, EngineError> {
        let me = self.state(player)?;
        let Some(opponent) = self.snapshot.opponent_of(player) else {
            return Ok(None);
        };
        let them = self.state(opponent)?;
        if !me.status.has_weapon || them.status.has_weapon {
            return Ok(None);
        }

        let prey = self.analysis(opponent)?;
        let detector = self.detector();
        if detector.is_trapped(&prey.threats)? {
            return Ok(None);
        }
        let prey_tolerance = self.config.search.tolerance(them.status.has_weapon);
        if !detector.is_trappable(&prey.threats, &prey.traps, prey_tolerance)? {
            return Ok(None);
        }

        if prey.traps.contains_key(&me.position) {
            debug!("Player {}: holding trap at {}", player, me.position);
            return Ok(Some(Plan::Hold));
        }

        let chase = search(
            self.snapshot.grid(),
            me.position,
            &HashSet::from([them.position]),
            avoid,
            tolerance,
            no_cutoff,
        )?;
        let Some(path) = chase.first() else {
            return Ok(None);
        };

        for i in 1..=path.len() {
            let position = path.position(i)?;
            if prey.traps.contains_key(&position) {
                let cut = path.sub_path(me.position, position)?;
                debug!("Player {}: cutting off opponent at {}", player, position);
                return Ok(Some(Plan::Follow {
                    stage: Stage::Hunt,
                    paths: vec![cut],
                }));
            }
        }

        Ok(None)
    }

    fn rival(&mut self, player: PlayerId, opponent: PlayerId) -> Result<Rival, EngineError> {
        let me = self.state(player)?;
        let them = self.state(opponent)?;

        let paths = match self.plan(opponent)? {
            Plan::Follow { paths, .. } => paths,
            Plan::Hold | Plan::Stuck => Vec::new(),
        };

        let mut pursuit = HashMap::new();
        if me.status.has_weapon && !them.status.has_weapon {
            let toward_us = search(
                self.snapshot.grid(),
                them.position,
                &HashSet::from([me.position]),
                &Weights::new(),
                0,
                no_cutoff,
            )?;
            if let Some(path) = toward_us.first() {
                for (index, position) in path.positions().into_iter().enumerate() {
                    pursuit.entry(position).or_insert(index);
                }
            }
        }

        Ok(Rival {
            destinations: destinations(&paths),
            paths,
            pursuit,
        })
    }

    fn score(&mut self, player: PlayerId, paths: &[Path]) -> Result<BTreeMap<Move, f64>, EngineError> {
        let rival = match self.snapshot.opponent_of(player) {
            Some(opponent) => Some(self.rival(player, opponent)?),
            None => None,
        };
        let decay = self.config.scores.hazard_decay;
        let boost = self.config.scores.intercept_boost;

        let mut scores = BTreeMap::new();
        for path in paths {
            let Some(first) = path.first_move() else {
                continue;
            };

            let mut score = decay.powi(path.hazards_crossed() as i32) / path.len() as f64;
            if let Some(rival) = &rival {
                score *= rival.factor(path, boost);
            }
            *scores.entry(first).or_insert(0.0) += score;
        }
        Ok(scores)
    }
}

/// Decision engine. Holds the configuration and the tie-break randomness.
pub struct Bot {
    config: Config,
    rng: StdRng,
}

impl Bot {
    /// Creates a new Bot instance with the given configuration
    ///
    /// # Arguments
    /// * `config` - Static configuration that does not change during the bot's lifetime
    pub fn new(config: Config) -> Self {
        Bot {
            config,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Same as `new` but with reproducible tie-breaking
    pub fn with_seed(config: Config, seed: u64) -> Self {
        Bot {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Computes the move for `player`, answering `Pass` when the turn fails
    ///
    /// # Arguments
    /// * `snapshot` - Current game state, optionally linked to the previous turn
    /// * `player` - Id of the player to move
    pub fn get_move(&mut self, snapshot: &Snapshot, player: PlayerId) -> Move {
        let start_time = Instant::now();

        if snapshot
            .player(player)
            .is_some_and(|p| p.status.is_paralyzed)
        {
            info!("Round {}: Paralyzed, passing", snapshot.round());
            return Move::Pass;
        }

        match self.decide(snapshot, player) {
            Ok(decision) => {
                let score = decision
                    .scores
                    .get(&decision.chosen)
                    .copied()
                    .unwrap_or(0.0);
                info!(
                    "Round {}: Chose {} (score: {:.3}, stage: {:?}, time: {}ms)",
                    snapshot.round(),
                    decision.chosen,
                    score,
                    decision.stage,
                    start_time.elapsed().as_millis()
                );
                decision.chosen
            }
            Err(e) => {
                error!("Round {}: Aborting turn: {}", snapshot.round(), e);
                Move::Pass
            }
        }
    }

    /// Scores every first move for `player` and picks one of the best
    pub fn decide(&mut self, snapshot: &Snapshot, player: PlayerId) -> Result<Decision, EngineError> {
        let mut turn = TurnContext::new(snapshot, &self.config);

        let (stage, paths) = match turn.plan(player)? {
            Plan::Hold => return Ok(Decision::pass(Some(Stage::Hunt))),
            Plan::Stuck => {
                info!("Round {}: No candidate paths", snapshot.round());
                return Ok(Decision::pass(None));
            }
            Plan::Follow { stage, paths } => (stage, paths),
        };

        let scores = turn.score(player, &paths)?;
        debug!("Round {}: Move scores {:?}", snapshot.round(), scores);

        let best = scores.values().copied().fold(f64::NEG_INFINITY, f64::max);
        let tied: Vec<Move> = scores
            .iter()
            .filter(|&(_, &score)| score == best)
            .map(|(&mv, _)| mv)
            .collect();
        let chosen = tied.choose(&mut self.rng).copied().unwrap_or(Move::Pass);

        Ok(Decision {
            chosen,
            scores,
            stage: Some(stage),
        })
    }
}
