// Library interface for liquid_sort.
// The binary is a thin terminal front end over these modules.

pub mod cli;
pub mod error;
pub mod gameplay;
pub mod generator;
pub mod levels;
pub mod model;
pub mod rng;
pub mod solver;
pub mod storage;

pub use error::{ConfigError, ParseError, PourError, ProgressError};
pub use gameplay::{GameEngine, InvalidReason, MoveOutcome, Progress};
pub use generator::{GeneratorConfig, LevelGenerator};
pub use levels::{LevelShape, LevelTable};
pub use model::{BOTTLE_CAPACITY, Bottle, Color, Layer, MoveAction, Puzzle};
pub use rng::SeededRng;
pub use solver::{Solver, is_solvable};
pub use storage::ProgressStore;
