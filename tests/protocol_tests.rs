// Integration tests for the engine line protocol
//
// Drives a GameSession through settings, updates and actions the way the
// game engine does and checks the answers written back.

use hackman_bot::bot::Bot;
use hackman_bot::config::Config;
use hackman_bot::debug_logger::DebugLogger;
use hackman_bot::protocol::GameSession;
use hackman_bot::types::Move;

const SETTINGS: [&str; 7] = [
    "settings timebank 10000",
    "settings time_per_move 500",
    "settings player_names player0,player1",
    "settings your_bot player0",
    "settings your_botid 0",
    "settings field_width 7",
    "settings field_height 1",
];

fn session() -> GameSession {
    let mut session = GameSession::new(
        Bot::with_seed(Config::default_hardcoded(), 11),
        DebugLogger::disabled(),
        Vec::new(),
    );
    for line in SETTINGS {
        session.handle_line(line).unwrap();
    }
    session
}

/// Sends one round of updates, with player0 optionally paralysed
fn send_round(session: &mut GameSession, round: u32, field: &str, paralyzed: bool) {
    let lines = [
        format!("update game round {}", round),
        format!("update game field {}", field),
        "update player0 snippets 2".to_string(),
        "update player0 has_weapon false".to_string(),
        format!("update player0 is_paralyzed {}", paralyzed),
        "update player1 snippets 1".to_string(),
        "update player1 has_weapon false".to_string(),
        "update player1 is_paralyzed false".to_string(),
    ];
    for line in &lines {
        assert_eq!(session.handle_line(line).unwrap(), None);
    }
}

#[test]
fn test_answers_each_action_and_links_rounds() {
    let mut session = session();

    send_round(&mut session, 1, ".,0,.,.,C,.,1", false);
    assert_eq!(session.handle_line("action move 9500").unwrap(), Some(Move::Right));
    assert_eq!(session.settings().timebank, 9500);

    send_round(&mut session, 2, ".,.,0,.,C,1,.", false);
    assert_eq!(session.handle_line("action move 9000").unwrap(), Some(Move::Right));

    let last = session.last_snapshot().unwrap();
    assert_eq!(last.round(), 2);
    assert_eq!(last.previous().map(|p| p.round()), Some(1));
    assert!(last.previous().and_then(|p| p.previous()).is_none());

    let me = last.player(0).unwrap();
    assert_eq!(me.status.snippets, 2);
}

#[test]
fn test_wrong_field_size_passes() {
    let mut session = session();
    send_round(&mut session, 1, ".,0,.,.,C,1", false);
    assert_eq!(session.handle_line("action move 10000").unwrap(), Some(Move::Pass));
}

#[test]
fn test_paralyzed_player_passes() {
    let mut session = session();
    send_round(&mut session, 3, ".,0,.,.,C,.,1", true);
    assert_eq!(session.handle_line("action move 10000").unwrap(), Some(Move::Pass));
}

#[test]
fn test_missing_player_updates_pass() {
    let mut session = session();
    session.handle_line("update game round 1").unwrap();
    session.handle_line("update game field .,0,.,.,C,.,1").unwrap();
    assert_eq!(session.handle_line("action move 10000").unwrap(), Some(Move::Pass));
}

#[test]
fn test_updates_do_not_carry_over_rounds() {
    let mut session = session();
    send_round(&mut session, 1, ".,0,.,.,C,.,1", false);
    assert_eq!(session.handle_line("action move 10000").unwrap(), Some(Move::Right));

    // Round 2 sends only the field
    session.handle_line("update game round 2").unwrap();
    session.handle_line("update game field .,.,0,.,C,.,1").unwrap();
    assert_eq!(session.handle_line("action move 10000").unwrap(), Some(Move::Pass));
}

#[test]
fn test_run_writes_one_line_per_action() {
    let mut session = session();
    let input = [
        "update game round 1",
        "update game field .,0,.,.,C,.,1",
        "update player0 snippets 0",
        "update player0 has_weapon false",
        "update player0 is_paralyzed false",
        "update player1 snippets 0",
        "update player1 has_weapon false",
        "update player1 is_paralyzed false",
        "settings timebank oops",
        "action move 10000",
    ]
    .join("\n");

    let mut output = Vec::new();
    session.run(input.as_bytes(), &mut output).unwrap();
    assert_eq!(String::from_utf8(output).unwrap(), "right\n");
}
