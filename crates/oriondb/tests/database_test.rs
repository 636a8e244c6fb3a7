//! End-to-end ingest and retrieval tests: PGN in, archive + sidecar out,
//! games and positions back.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use oriondb::{IndexOptions, OrionDatabase};

fn ingest(dir: &TempDir, pgn: &str, options: IndexOptions) -> (PathBuf, oriondb::ImportStats) {
    let pgn_path = dir.path().join("input.pgn");
    let db_path = dir.path().join("games.oriondb");
    fs::write(&pgn_path, pgn).unwrap();
    let stats = OrionDatabase::create_from_pgn(&pgn_path, &db_path, options).unwrap();
    (db_path, stats)
}

const THREE_GAMES: &str = r#"[Event "Rapid Masters"]
[Site "Oslo"]
[Date "2022.05.01"]
[Round "1"]
[White "Carlsen, Magnus"]
[Black "Duda, Jan-Krzysztof"]
[Result "1-0"]
[WhiteElo "2860"]
[BlackElo "2750"]
[ECO "B90"]

1. e4 c5 2. Nf3 d6 1-0

[Event "Rapid Masters"]
[Site "Oslo"]
[Date "2022.05.02"]
[Round "2"]
[White "Duda, Jan-Krzysztof"]
[Black "Carlsen, Magnus"]
[Result "0-1"]
[WhiteElo "2750"]
[BlackElo "2860"]

1. d4 Nf6 2. c4 e6 0-1

[Event "Legends"]
[Site "Online"]
[Date "2020.07.24"]
[Round "3"]
[White "Kasparov, Garry"]
[Black "Short, Nigel"]
[Result "1/2-1/2"]
[WhiteElo "2812"]
[BlackElo "2620"]

1. e4 e5 2. Nf3 Nc6 1/2-1/2
"#;

#[test]
fn test_player_and_result_query_selects_one_game() {
    let dir = TempDir::new().unwrap();
    let (db_path, stats) = ingest(&dir, THREE_GAMES, IndexOptions::default());
    assert_eq!(stats.games_imported, 3);
    assert_eq!(stats.parse_errors, 0);

    let db = OrionDatabase::open(&db_path).unwrap();
    assert_eq!(db.game_count(), 3);

    let games = db.query("player='carlsen, magnus' AND result='1-0'").unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].id(), 0);
    assert_eq!(games[0].white(), "Carlsen, Magnus");

    // The same player's win with Black comes back under the other result
    let games = db.query("player='carlsen, magnus' AND result='0-1'").unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].id(), 1);
}

#[test]
fn test_find_move_returns_post_move_position() {
    let dir = TempDir::new().unwrap();
    let pgn = "[Event \"Move Index\"]\n[White \"A\"]\n[Black \"B\"]\n[Result \"*\"]\n\n1. e4 c5 2. Nf3 *\n";
    let (db_path, _) = ingest(&dir, pgn, IndexOptions::default());

    let db = OrionDatabase::open(&db_path).unwrap();
    let hits = db.find_move("Nf3");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].game_id, 0);
    assert_eq!(hits[0].ply, 3);
    assert_eq!(
        hits[0].fen,
        "rnbqkbnr/pp1ppppp/8/2p5/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2"
    );
}

#[test]
fn test_thousand_game_round_trip() {
    let dir = TempDir::new().unwrap();

    let mut pgn = String::new();
    for i in 0..1000 {
        pgn.push_str(&format!(
            "[Event \"Marathon {}\"]\n[White \"White {}\"]\n[Black \"Black {}\"]\n\
             [Result \"{}\"]\n[WhiteElo \"{}\"]\n\n1. e4 e5 {{game {}}} 2. Nf3 Nc6 {}\n\n",
            i / 100,
            i,
            i,
            if i % 2 == 0 { "1-0" } else { "0-1" },
            2000 + (i % 800),
            i,
            if i % 2 == 0 { "1-0" } else { "0-1" },
        ));
    }

    // Metadata only keeps the big ingest fast; the round trip exercises the
    // archive, not the replay
    let (db_path, stats) = ingest(&dir, &pgn, IndexOptions::metadata_only());
    assert_eq!(stats.games_imported, 1000);
    assert_eq!(stats.parse_errors, 0);

    let db = OrionDatabase::open(&db_path).unwrap();
    assert_eq!(db.game_count(), 1000);

    let game = db.game_by_id(777).unwrap().unwrap();
    assert_eq!(game.id(), 777);
    assert_eq!(game.white(), "White 777");
    assert_eq!(game.event(), "Marathon 7");
    assert_eq!(game.result(), "0-1");
    assert_eq!(game.white_elo(), Some(2777));

    let sans: Vec<&str> = game.moves().iter().map(|m| m.san.as_str()).collect();
    assert_eq!(sans, vec!["e4", "e5", "Nf3", "Nc6"]);
    assert_eq!(game.moves()[1].comment.as_deref(), Some("game 777"));
    assert_eq!(game.moves()[0].comment, None);

    // Tag order survives the archive round trip
    let keys: Vec<&str> = game.tags().iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys[0], "Event");
    assert_eq!(keys[1], "White");

    assert!(db.game_by_id(1000).unwrap().is_none());
}

#[test]
fn test_open_without_sidecar_fails() {
    let dir = TempDir::new().unwrap();
    let (db_path, _) = ingest(&dir, THREE_GAMES, IndexOptions::metadata_only());

    fs::remove_file(oriondb::database::sidecar_path(&db_path)).unwrap();
    assert!(matches!(
        OrionDatabase::open(&db_path),
        Err(oriondb::DbError::MissingSidecar(_))
    ));
}

#[test]
fn test_ingest_tolerates_malformed_games() {
    let dir = TempDir::new().unwrap();
    let pgn = format!(
        "{}\n[Event broken broken\nglug glug glug\n\n{}",
        "[Event \"Ok 1\"]\n[Result \"1-0\"]\n\n1. e4 e5 1-0\n",
        "[Event \"Ok 2\"]\n[Result \"0-1\"]\n\n1. d4 d5 0-1\n"
    );

    let (db_path, stats) = ingest(&dir, &pgn, IndexOptions::default());
    assert_eq!(stats.games_imported, 2);
    assert_eq!(stats.parse_errors, 1);

    let db = OrionDatabase::open(&db_path).unwrap();
    assert_eq!(db.game_count(), 2);
}

#[test]
fn test_positional_indexes_end_to_end() {
    let dir = TempDir::new().unwrap();
    let (db_path, _) = ingest(&dir, THREE_GAMES, IndexOptions::default());
    let db = OrionDatabase::open(&db_path).unwrap();

    // Games 0 and 2 open 1. e4; both reach the same position after it
    let after_e4 = db
        .find_by_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1")
        .unwrap();
    let mut game_ids: Vec<u32> = after_e4.iter().map(|p| p.game_id).collect();
    game_ids.sort_unstable();
    assert_eq!(game_ids, vec![0, 2]);
    assert!(after_e4.iter().all(|p| p.ply == 1));

    // Every game shares the starting position at ply 0
    let start = db.find_by_fen(chess_core::STARTING_FEN).unwrap();
    assert_eq!(start.len(), 3);

    // Move sequences
    assert_eq!(db.find_sequence(&["e4", "c5", "Nf3"]), vec![0]);
    assert_eq!(db.find_sequence(&["e4", "e5", "Nf3"]), vec![2]);
    assert!(db.find_sequence(&["e4", "c6"]).is_empty());

    let stats = db.index_stats();
    assert_eq!(stats.games, 3);
    // Three games, each: start + 4 plies
    assert_eq!(stats.indexed_positions, 15);
    // Starting position is shared, the e4 position by two games
    assert!(stats.unique_positions < 15);
    assert_eq!(stats.hash_collisions, 0);
}

#[test]
fn test_disabled_indexes_answer_empty() {
    let dir = TempDir::new().unwrap();
    let (db_path, _) = ingest(&dir, THREE_GAMES, IndexOptions::metadata_only());
    let db = OrionDatabase::open(&db_path).unwrap();

    assert!(db.find_move("Nf3").is_empty());
    assert!(db.find_by_fen(chess_core::STARTING_FEN).unwrap().is_empty());
    assert!(db.find_endgames().is_empty());
    // Metadata queries still work
    assert_eq!(db.query_count("result='1/2-1/2'").unwrap(), 1);
    // A query against an unbuilt index returns empty, not an error
    assert_eq!(db.query_count("move='Nf3'").unwrap(), 0);
}
