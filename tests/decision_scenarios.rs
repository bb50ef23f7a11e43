// Integration tests for whole-turn decisions
//
// Each test builds a field the way the engine sends it and checks the move
// (and where it matters, the stage) the bot settles on.

use hackman_bot::bot::{Bot, Stage};
use hackman_bot::config::Config;
use hackman_bot::snapshot::Snapshot;
use hackman_bot::types::{Move, PlayerStatus, Position};

/// The 20x14 competition map without items, players or hazards
const STANDARD_MAP: [&str; 14] = [
    "....................",
    ".xxxxx.xxxxxx.xxxxx.",
    ".x.....xxxxxx.....x.",
    ".x.xxx...xx...xxx.x.",
    ".....xxx.xx.xxx.....",
    ".xxx.x........x.xxx.",
    "...x.x.xxxxxx.x.x...",
    "xx.x...xxxxxx...x.xx",
    "...xxx.xxxxxx.xxx...",
    ".x................x.",
    ".xxx.xxxxxxxxxx.xxx.",
    ".xxx............xxx.",
    ".xxx.xxx.xx.xxx.xxx.",
    ".........xx.........",
];

fn players() -> Vec<PlayerStatus> {
    vec![PlayerStatus::new(0, "player0"), PlayerStatus::new(1, "player1")]
}

/// Field of `width` x `height` empty cells with the given tags placed on it
fn field(width: i32, height: i32, marks: &[(i32, i32, &str)]) -> String {
    let mut cells = vec![".".to_string(); (width * height) as usize];
    for &(x, y, tags) in marks {
        cells[(x + y * width) as usize] = tags.to_string();
    }
    cells.join(",")
}

fn standard_field(marks: &[(i32, i32, &str)]) -> String {
    let mut cells: Vec<String> = STANDARD_MAP
        .iter()
        .flat_map(|row| row.chars().map(|c| c.to_string()))
        .collect();
    for &(x, y, tags) in marks {
        cells[(x + y * 20) as usize] = tags.to_string();
    }
    cells.join(",")
}

fn snapshot(round: u32, width: i32, height: i32, field: &str, statuses: &[PlayerStatus]) -> Snapshot {
    Snapshot::from_field(round, width, height, field, statuses, &[])
        .expect("test field should parse")
}

fn bot() -> Bot {
    Bot::with_seed(Config::default_hardcoded(), 42)
}

#[test]
fn test_heads_straight_for_item_on_open_field() {
    let f = field(20, 14, &[(5, 12, "0"), (5, 3, "C"), (19, 13, "1")]);
    let s = snapshot(1, 20, 14, &f, &players());

    let decision = bot().decide(&s, 0).unwrap();
    assert_eq!(decision.chosen, Move::Up);
    assert_eq!(decision.scores[&Move::Up], 1.0 / 9.0);
    for (mv, score) in &decision.scores {
        if *mv != Move::Up {
            assert!(*score < 1.0 / 9.0, "{} scored {}", mv, score);
        }
    }
}

#[test]
fn test_hazard_between_player_and_item_forces_evade() {
    let f = field(20, 1, &[(0, 0, "C"), (1, 0, "E"), (3, 0, "0"), (19, 0, "1")]);
    let s = snapshot(5, 20, 1, &f, &players());

    let decision = bot().decide(&s, 0).unwrap();
    assert_eq!(decision.chosen, Move::Right);
    assert_eq!(decision.stage, Some(Stage::Evade));
}

#[test]
fn test_hazard_cutting_in_from_the_side_is_avoided() {
    // Left is the shortest way to the item, but the hazard at (4,6) can
    // step onto (4,5) next turn
    let f = field(20, 14, &[(5, 5, "0"), (0, 5, "C"), (4, 6, "E")]);
    let s = snapshot(6, 20, 14, &f, &[PlayerStatus::new(0, "player0")]);

    let decision = bot().decide(&s, 0).unwrap();
    assert_ne!(decision.chosen, Move::Left);
    assert!(!decision.scores.contains_key(&Move::Left));
    assert!(!decision.scores.contains_key(&Move::Down));
    assert_eq!(decision.chosen, Move::Up);
    assert_eq!(decision.stage, Some(Stage::Full));
}

#[test]
fn test_safe_branch_survives_two_hazards_in_the_other() {
    let rows = [
        "x,x,.,.,C,.,.,E,E",
        "0,.,.,x,x,x,x,x,x",
        "x,x,.,.,.,.,.,.,.",
        "x,x,.,.,.,.,.,.,C",
    ];
    let s = snapshot(8, 9, 4, &rows.join(","), &[PlayerStatus::new(0, "player0")]);

    let decision = bot().decide(&s, 0).unwrap();
    assert_eq!(decision.stage, Some(Stage::Full));
    assert_eq!(decision.chosen, Move::Right);
}

#[test]
fn test_retreating_hazard_is_followed() {
    // The hazard moved from (2,0) to (1,0), away from the player
    let previous = snapshot(
        4,
        20,
        1,
        &field(20, 1, &[(0, 0, "C"), (2, 0, "E"), (3, 0, "0"), (19, 0, "1")]),
        &players(),
    );
    let current = snapshot(
        5,
        20,
        1,
        &field(20, 1, &[(0, 0, "C"), (1, 0, "E"), (3, 0, "0"), (19, 0, "1")]),
        &players(),
    )
    .with_previous(previous);

    let decision = bot().decide(&current, 0).unwrap();
    assert_eq!(decision.chosen, Move::Left);
}

#[test]
fn test_boxed_in_by_hazards_still_moves() {
    let f = field(
        20,
        1,
        &[(0, 0, "C"), (9, 0, "E"), (10, 0, "0"), (11, 0, "E"), (19, 0, "1")],
    );
    let s = snapshot(7, 20, 1, &f, &players());

    let decision = bot().decide(&s, 0).unwrap();
    assert_eq!(decision.chosen, Move::Left);
    assert!(matches!(
        decision.stage,
        Some(Stage::Unsafe) | Some(Stage::UnsafeEvade)
    ));
}

#[test]
fn test_shared_cell_with_opponent() {
    let f = field(20, 1, &[(0, 0, "C"), (5, 0, "01"), (19, 0, "E")]);
    let s = snapshot(3, 20, 1, &f, &players());

    assert_eq!(s.player(0).unwrap().position, Position::new(5, 0));
    assert_eq!(s.player(1).unwrap().position, Position::new(5, 0));
    assert_eq!(bot().decide(&s, 0).unwrap().chosen, Move::Left);
}

#[test]
fn test_armed_player_hunts_unarmed_opponent() {
    let rows = "C,0,.,.,.,x,x,.,x,x,x,x,1,x,x";
    let statuses = [
        PlayerStatus::new(0, "player0").armed(),
        PlayerStatus::new(1, "player1"),
    ];
    let s = snapshot(10, 5, 3, rows, &statuses);

    let decision = bot().decide(&s, 0).unwrap();
    assert_eq!(decision.stage, Some(Stage::Hunt));
    assert_eq!(decision.chosen, Move::Right);
}

#[test]
fn test_unarmed_player_collects_instead_of_hunting() {
    let rows = "C,0,.,.,.,x,x,.,x,x,x,x,1,x,x";
    let s = snapshot(10, 5, 3, rows, &players());

    let decision = bot().decide(&s, 0).unwrap();
    assert_ne!(decision.stage, Some(Stage::Hunt));
    assert_eq!(decision.chosen, Move::Left);
}

#[test]
fn test_paralyzed_player_passes_on_standard_map() {
    let mut statuses = players();
    statuses[0].is_paralyzed = true;
    let f = standard_field(&[(0, 0, "0"), (3, 0, "C"), (19, 13, "1")]);
    let s = snapshot(12, 20, 14, &f, &statuses);

    assert_eq!(bot().get_move(&s, 0), Move::Pass);
}

#[test]
fn test_standard_map_with_open_hazard_source() {
    let config = Config::default_hardcoded();
    let sources = config.grid.hazard_sources();
    let f = standard_field(&[(0, 0, "0"), (3, 0, "C"), (19, 13, "1"), (9, 7, "xE")]);
    let s = Snapshot::from_field(20, 20, 14, &f, &players(), &sources).unwrap();

    // A hazard in the source opens the whole cluster
    assert!(s.grid().is_passable(&Position::new(9, 6)));
    assert!(s.grid().is_passable(&Position::new(8, 7)));
    assert!(!s.grid().is_passable(&Position::new(10, 6)));

    let mut bot = Bot::with_seed(config, 42);
    assert_eq!(bot.decide(&s, 0).unwrap().chosen, Move::Right);
}
