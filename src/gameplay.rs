use std::ops::RangeInclusive;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::PourError;
use crate::generator::LevelGenerator;
use crate::levels::LevelTable;
use crate::model::{Bottle, Color, Puzzle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Bottle(usize),
}

/// What survives between sessions. Persisting it is the caller's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Progress {
    pub highest_unlocked: u32,
    pub sound_enabled: bool,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            highest_unlocked: 1,
            sound_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    UnknownBottle,
    SameBottle,
    EmptySource,
    Full,
    ColorMismatch,
    NoOp,
}

impl From<PourError> for InvalidReason {
    fn from(err: PourError) -> Self {
        match err {
            PourError::UnknownBottle => InvalidReason::UnknownBottle,
            PourError::SameBottle => InvalidReason::SameBottle,
            PourError::EmptySource => InvalidReason::EmptySource,
            PourError::DestinationFull => InvalidReason::Full,
            PourError::ColorMismatch => InvalidReason::ColorMismatch,
            PourError::NoOp => InvalidReason::NoOp,
        }
    }
}

/// Result of a tap or pour, tagged by `action` when serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MoveOutcome {
    Selected {
        id: usize,
    },
    Deselected {
        id: usize,
    },
    Empty,
    Poured {
        from: usize,
        to: usize,
        color: Color,
        count: usize,
        is_won: bool,
        completed_bottle: bool,
    },
    Invalid {
        reason: InvalidReason,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct HistoryEntry {
    puzzle: Puzzle,
    moves: u32,
}

/// One player's session: the current level, its bottles and the undo history.
pub struct GameEngine {
    levels: LevelTable,
    generator: LevelGenerator,
    progress: Progress,
    level: u32,
    puzzle: Puzzle,
    selected: Selection,
    moves: u32,
    undo_stack: Vec<HistoryEntry>,
    won: bool,
}

impl GameEngine {
    pub fn new(progress: Progress) -> Self {
        Self::with_config(LevelTable::default(), LevelGenerator::default(), progress)
    }

    pub fn with_config(levels: LevelTable, generator: LevelGenerator, progress: Progress) -> Self {
        Self {
            levels,
            generator,
            progress,
            level: 1,
            puzzle: Puzzle::default(),
            selected: Selection::None,
            moves: 0,
            undo_stack: Vec::new(),
            won: false,
        }
    }

    /// Generates `level` from its number and clears all per-level state.
    pub fn init_level(&mut self, level: u32) {
        let level = level.max(1);
        let shape = self.levels.shape_for(level);
        let puzzle = self.generator.generate_level(shape, u64::from(level));
        info!(
            "Level {level}: {} colors in {} bottles.",
            shape.colors(),
            shape.bottles()
        );
        self.level = level;
        self.load_state(puzzle);
    }

    /// Starts over from an arbitrary position, e.g. a pasted puzzle.
    pub fn load_state(&mut self, puzzle: Puzzle) {
        self.puzzle = puzzle;
        self.selected = Selection::None;
        self.moves = 0;
        self.undo_stack.clear();
        self.won = false;
    }

    pub fn load_saved_progress(&mut self) {
        self.init_level(self.progress.highest_unlocked);
    }

    pub fn select_bottle(&mut self, id: usize) -> MoveOutcome {
        match self.selected {
            Selection::None => {
                let has_liquid = self
                    .puzzle
                    .index_of(id)
                    .is_some_and(|index| !self.puzzle.bottles()[index].is_empty());
                if has_liquid {
                    self.selected = Selection::Bottle(id);
                    MoveOutcome::Selected { id }
                } else {
                    MoveOutcome::Empty
                }
            }
            Selection::Bottle(current) if current == id => {
                self.selected = Selection::None;
                MoveOutcome::Deselected { id }
            }
            Selection::Bottle(current) => self.pour(current, id),
        }
    }

    /// Pours between bottle ids. Always clears the selection; invalid pours
    /// leave bottles and history untouched.
    pub fn pour(&mut self, from_id: usize, to_id: usize) -> MoveOutcome {
        self.selected = Selection::None;
        let (Some(from), Some(to)) = (self.puzzle.index_of(from_id), self.puzzle.index_of(to_id))
        else {
            return MoveOutcome::Invalid {
                reason: InvalidReason::UnknownBottle,
            };
        };
        let snapshot = HistoryEntry {
            puzzle: self.puzzle.clone(),
            moves: self.moves,
        };
        let action = match self.puzzle.apply_pour(from, to) {
            Ok(action) => action,
            Err(err) => {
                debug!("Rejected pour {from_id} -> {to_id}: {err}");
                return MoveOutcome::Invalid { reason: err.into() };
            }
        };
        self.undo_stack.push(snapshot);
        self.moves += 1;
        self.won = self.puzzle.is_solved();
        if self.won {
            info!("Level {} solved in {} moves.", self.level, self.moves);
        }

        MoveOutcome::Poured {
            from: from_id,
            to: to_id,
            color: action.color,
            count: action.amount,
            is_won: self.won,
            completed_bottle: self.puzzle.bottles()[to].is_complete(),
        }
    }

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo_stack.pop() else {
            return false;
        };
        self.puzzle = previous.puzzle;
        self.moves = previous.moves;
        self.selected = Selection::None;
        self.won = false;
        true
    }

    pub fn reset_level(&mut self) {
        self.init_level(self.level);
    }

    /// Advances one level. Returns the new watermark when it was raised so the
    /// caller can persist it.
    pub fn next_level(&mut self) -> Option<u32> {
        let next = self.level.saturating_add(1);
        let raised = if next > self.progress.highest_unlocked {
            self.progress.highest_unlocked = next;
            Some(next)
        } else {
            None
        };
        self.init_level(next);
        raised
    }

    pub fn play_level(&mut self, level: u32) -> bool {
        if level == 0 || level > self.progress.highest_unlocked {
            return false;
        }
        self.init_level(level);
        true
    }

    pub fn toggle_sound(&mut self) -> bool {
        self.progress.sound_enabled = !self.progress.sound_enabled;
        self.progress.sound_enabled
    }

    /// Levels a level-select screen should offer.
    pub fn unlocked_levels(&self) -> RangeInclusive<u32> {
        1..=self.progress.highest_unlocked.min(self.levels.max_level())
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn bottles(&self) -> &[Bottle] {
        self.puzzle.bottles()
    }

    pub fn selected(&self) -> Option<usize> {
        match self.selected {
            Selection::Bottle(id) => Some(id),
            Selection::None => None,
        }
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn history_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn levels(&self) -> &LevelTable {
        &self.levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with(repr: &str) -> GameEngine {
        let mut engine = GameEngine::new(Progress::default());
        engine.load_state(Puzzle::from_repr(repr).unwrap());
        engine
    }

    #[test]
    fn select_then_pour_single_layer() {
        let mut engine = engine_with("ABAB BABA ....");
        assert_eq!(engine.select_bottle(0), MoveOutcome::Selected { id: 0 });
        assert_eq!(engine.selected(), Some(0));
        let outcome = engine.select_bottle(2);
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
        assert_eq!(engine.puzzle().to_string(), "ABA. BABA B...");
        assert_eq!(engine.moves(), 1);
        assert_eq!(engine.history_len(), 1);
        assert_eq!(engine.selected(), None);
        assert!(!engine.is_won());
    }

    #[test]
    fn selecting_empty_bottle_is_noop() {
        let mut engine = engine_with("ABAB BABA ....");
        assert_eq!(engine.select_bottle(2), MoveOutcome::Empty);
        assert_eq!(engine.select_bottle(7), MoveOutcome::Empty);
        assert_eq!(engine.selected(), None);
    }

    #[test]
    fn selecting_twice_deselects() {
        let mut engine = engine_with("ABAB BABA ....");
        engine.select_bottle(1);
        assert_eq!(engine.select_bottle(1), MoveOutcome::Deselected { id: 1 });
        assert_eq!(engine.selected(), None);
    }

    #[test]
    fn invalid_pours_report_reason_and_keep_state() {
        let mut engine = engine_with("AABB BBAA AABA ....");
        let before = engine.puzzle().clone();

        engine.select_bottle(0);
        assert_eq!(
            engine.select_bottle(1),
            MoveOutcome::Invalid {
                reason: InvalidReason::Full
            }
        );
        assert_eq!(engine.selected(), None);
        assert_eq!(
            engine.pour(3, 0),
            MoveOutcome::Invalid {
                reason: InvalidReason::EmptySource
            }
        );
        assert_eq!(
            engine.pour(0, 9),
            MoveOutcome::Invalid {
                reason: InvalidReason::UnknownBottle
            }
        );
        assert_eq!(engine.puzzle(), &before);
        assert_eq!(engine.moves(), 0);
        assert!(!engine.can_undo());
    }

    #[test]
    fn color_mismatch_is_rejected() {
        let mut engine = engine_with("AAB. BBA. AB..");
        assert_eq!(
            engine.pour(0, 1),
            MoveOutcome::Invalid {
                reason: InvalidReason::ColorMismatch
            }
        );
    }

    #[test]
    fn solved_board_rejects_wasted_moves() {
        let mut engine = engine_with("AAAA BBBB ....");
        assert_eq!(engine.select_bottle(0), MoveOutcome::Selected { id: 0 });
        assert_eq!(
            engine.select_bottle(2),
            MoveOutcome::Invalid {
                reason: InvalidReason::NoOp
            }
        );
        assert_eq!(
            engine.pour(0, 1),
            MoveOutcome::Invalid {
                reason: InvalidReason::Full
            }
        );
        assert_eq!(engine.moves(), 0);
    }

    #[test]
    fn winning_pour_sets_flag_and_undo_clears_it() {
        let mut engine = engine_with("AAA. BBBB A...");
        let outcome = engine.pour(2, 0);
        assert_eq!(
            outcome,
            MoveOutcome::Poured {
                from: 2,
                to: 0,
                color: Color::Red,
                count: 1,
                is_won: true,
                completed_bottle: true,
            }
        );
        assert!(engine.is_won());
        assert!(engine.undo());
        assert!(!engine.is_won());
        assert_eq!(engine.puzzle().to_string(), "AAA. BBBB A...");
        assert_eq!(engine.moves(), 0);
        assert!(!engine.undo());
    }

    #[test]
    fn undo_restores_in_reverse_order() {
        let mut engine = engine_with("ABAB BABA ....");
        let start = engine.puzzle().clone();
        engine.pour(0, 2);
        let after_first = engine.puzzle().clone();
        engine.pour(1, 0);
        assert_eq!(engine.moves(), 2);
        assert!(engine.undo());
        assert_eq!(engine.puzzle(), &after_first);
        assert_eq!(engine.moves(), 1);
        assert!(engine.undo());
        assert_eq!(engine.puzzle(), &start);
        assert_eq!(engine.history_len(), 0);
    }

    #[test]
    fn reset_regenerates_identical_level() {
        let mut engine = GameEngine::new(Progress::default());
        engine.init_level(1);
        let original = engine.puzzle().clone();
        let moves: Vec<_> = engine.puzzle().legal_moves().collect();
        let first = moves[0];
        engine.pour(first.from, first.to);
        engine.reset_level();
        assert_eq!(engine.puzzle(), &original);
        assert_eq!(engine.moves(), 0);
        assert_eq!(engine.history_len(), 0);
    }

    #[test]
    fn next_level_raises_watermark_once() {
        let mut engine = GameEngine::new(Progress::default());
        engine.init_level(1);
        assert_eq!(engine.next_level(), Some(2));
        assert_eq!(engine.level(), 2);
        assert_eq!(engine.progress().highest_unlocked, 2);

        assert!(engine.play_level(1));
        assert_eq!(engine.next_level(), None);
        assert_eq!(engine.progress().highest_unlocked, 2);
    }

    #[test]
    fn play_level_respects_watermark() {
        let mut engine = GameEngine::new(Progress {
            highest_unlocked: 3,
            sound_enabled: true,
        });
        assert!(engine.play_level(3));
        assert_eq!(engine.level(), 3);
        assert!(!engine.play_level(4));
        assert!(!engine.play_level(0));
        assert_eq!(engine.level(), 3);
        assert_eq!(engine.unlocked_levels(), 1..=3);
    }

    #[test]
    fn levels_past_the_table_clamp_their_shape() {
        let mut engine = GameEngine::new(Progress {
            highest_unlocked: 150,
            sound_enabled: false,
        });
        engine.load_saved_progress();
        assert_eq!(engine.level(), 150);
        assert_eq!(engine.bottles().len(), 7);
        assert_eq!(engine.unlocked_levels(), 1..=100);
    }

    #[test]
    fn sound_toggle_flips_flag() {
        let mut engine = GameEngine::new(Progress::default());
        assert!(!engine.toggle_sound());
        assert!(engine.toggle_sound());
    }

    #[test]
    fn outcomes_serialize_with_action_tag() {
        let poured = MoveOutcome::Poured {
            from: 0,
            to: 2,
            color: Color::Blue,
            count: 1,
            is_won: false,
            completed_bottle: false,
        };
        assert_eq!(
            serde_json::to_value(poured).unwrap(),
            serde_json::json!({
                "action": "poured",
                "from": 0,
                "to": 2,
                "color": "blue",
                "count": 1,
                "is_won": false,
                "completed_bottle": false
            })
        );
        let invalid = MoveOutcome::Invalid {
            reason: InvalidReason::ColorMismatch,
        };
        assert_eq!(
            serde_json::to_value(invalid).unwrap(),
            serde_json::json!({"action": "invalid", "reason": "color_mismatch"})
        );
        assert_eq!(
            serde_json::to_value(MoveOutcome::Empty).unwrap(),
            serde_json::json!({"action": "empty"})
        );
    }
}
