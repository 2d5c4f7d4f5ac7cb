// Integration tests: the session engine driven end to end, through the same
// paths the terminal front end uses.

use std::io::Cursor;

use liquid_sort::cli::play_loop;
use liquid_sort::*;

fn solve_current_level(engine: &mut GameEngine) {
    let path = Solver::new(engine.puzzle().clone())
        .solve()
        .expect("generated levels are solvable");
    let last = path.len() - 1;
    for (step, action) in path.into_iter().enumerate() {
        let from = engine.bottles()[action.from].id();
        let to = engine.bottles()[action.to].id();
        assert_eq!(engine.select_bottle(from), MoveOutcome::Selected { id: from });
        match engine.select_bottle(to) {
            MoveOutcome::Poured { count, is_won, .. } => {
                assert_eq!(count, action.amount);
                assert_eq!(is_won, step == last);
            }
            other => panic!("expected a pour, got {other:?}"),
        }
    }
}

#[test]
fn test_single_blue_layer_pours_into_empty_bottle() {
    let mut engine = GameEngine::new(Progress::default());
    engine.load_state(Puzzle::from_repr("ABAB BABA ....").unwrap());

    let outcome = engine.pour(0, 2);
    assert_eq!(
        outcome,
        MoveOutcome::Poured {
            from: 0,
            to: 2,
            color: Color::Blue,
            count: 1,
            is_won: false,
            completed_bottle: false,
        }
    );
    let layers = |id: usize| -> Vec<Option<Color>> {
        engine.bottles()[id].layers().iter().map(|l| l.color()).collect()
    };
    assert_eq!(layers(0), vec![Some(Color::Red), Some(Color::Blue), Some(Color::Red), None]);
    assert_eq!(layers(2), vec![Some(Color::Blue), None, None, None]);
    assert_eq!(engine.moves(), 1);
}

#[test]
fn test_play_through_first_levels_unlocks_progress() {
    let mut engine = GameEngine::new(Progress::default());
    engine.load_saved_progress();
    for level in 1..=3 {
        assert_eq!(engine.level(), level);
        solve_current_level(&mut engine);
        assert!(engine.is_won());
        assert!(engine.can_undo());
        assert_eq!(engine.next_level(), Some(level + 1));
    }
    assert_eq!(engine.progress().highest_unlocked, 4);
    assert_eq!(engine.unlocked_levels(), 1..=4);
}

#[test]
fn test_reset_after_win_replays_same_puzzle() {
    let mut engine = GameEngine::new(Progress::default());
    engine.init_level(7);
    let original = engine.puzzle().clone();
    solve_current_level(&mut engine);
    engine.reset_level();
    assert_eq!(engine.puzzle(), &original);
    assert!(!engine.is_won());
    assert_eq!(engine.history_len(), 0);
}

#[test]
fn test_sampled_levels_across_curve_are_playable() {
    let table = LevelTable::default();
    let generator = LevelGenerator::default();
    for level in [1, 5, 6, 11, 21, 36, 51, 71, 86, 100] {
        let shape = table.shape_for(level);
        let puzzle = generator.generate_level(shape, u64::from(level));
        assert_eq!(puzzle.len(), shape.bottles(), "level {level}");
        assert!(!puzzle.is_solved(), "level {level}");
        assert!(is_solvable(&puzzle, 150), "level {level}");
        assert_eq!(
            puzzle.bottles().iter().filter(|b| b.is_empty()).count(),
            shape.empty_bottles(),
            "level {level}"
        );
    }
}

#[test]
fn test_play_loop_drives_engine() {
    let mut engine = GameEngine::new(Progress::default());
    engine.load_state(Puzzle::from_repr("AAA. BBBB A...").unwrap());

    let mut input = Cursor::new("2\n0\nu\n2 0\nq\n");
    let mut output = Vec::new();
    let mut saved = Vec::new();
    play_loop(&mut engine, &mut input, &mut output, |p| saved.push(p)).unwrap();

    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("Selected bottle 2."));
    assert!(text.contains("Poured 1 red from 2 to 0."));
    assert!(text.contains("Solved in 1 moves!"));
    assert!(engine.is_won());
    assert!(saved.is_empty());
}

#[test]
fn test_play_loop_saves_when_watermark_moves() {
    let mut engine = GameEngine::new(Progress::default());
    engine.init_level(1);

    let mut input = Cursor::new("n\nbogus words here\nn\n");
    let mut output = Vec::new();
    let mut saved = Vec::new();
    play_loop(&mut engine, &mut input, &mut output, |p| saved.push(p)).unwrap();

    assert_eq!(engine.level(), 3);
    let watermarks: Vec<u32> = saved.iter().map(|p| p.highest_unlocked).collect();
    assert_eq!(watermarks, vec![2, 3]);
    assert!(String::from_utf8(output).unwrap().contains("Unrecognised command."));
}

#[test]
fn test_progress_store_round_trip_through_engine() {
    let dir = tempfile::tempdir().unwrap();
    let store = ProgressStore::new(dir.path().join("progress.json"));

    let mut engine = GameEngine::new(store.load().unwrap());
    engine.load_saved_progress();
    engine.next_level();
    engine.toggle_sound();
    store.save(&engine.progress()).unwrap();

    let mut resumed = GameEngine::new(store.load().unwrap());
    resumed.load_saved_progress();
    assert_eq!(resumed.level(), 2);
    assert!(!resumed.progress().sound_enabled);
    assert_eq!(resumed.puzzle(), engine.puzzle());
}
