use std::collections::HashSet;

use log::{debug, warn};
use rayon::prelude::*;

use crate::levels::LevelShape;
use crate::model::{BOTTLE_CAPACITY, Bottle, Color, Layer, Puzzle};
use crate::rng::SeededRng;
use crate::solver::{DEFAULT_MAX_MOVES, is_solvable};

pub const DEFAULT_MAX_ATTEMPTS: usize = 100;
pub const DEFAULT_ATTEMPT_SEED_STRIDE: u64 = 1000;

const SCRAMBLE_BASE_MOVES: usize = 12;
const SCRAMBLE_SPREAD: u64 = 24;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Random candidates tried before falling back to the scrambler.
    pub max_attempts: usize,
    /// Move ceiling for the solvability search.
    pub max_moves: usize,
    pub attempt_seed_stride: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_moves: DEFAULT_MAX_MOVES,
            attempt_seed_stride: DEFAULT_ATTEMPT_SEED_STRIDE,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct LevelGenerator {
    config: GeneratorConfig,
}

impl LevelGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Builds a solvable, unsolved puzzle. The same shape and seed always give
    /// the same puzzle.
    pub fn generate_level(&self, shape: LevelShape, level_seed: u64) -> Puzzle {
        let stride = self.config.attempt_seed_stride;
        let max_moves = self.config.max_moves;

        // find_map_first keeps the lowest successful attempt, same as a
        // sequential scan.
        let accepted = (0..self.config.max_attempts)
            .into_par_iter()
            .find_map_first(|attempt| {
                let seed = level_seed.wrapping_add((attempt as u64).wrapping_mul(stride));
                let candidate = random_puzzle(shape, seed);
                if candidate.is_solved() {
                    debug!("Attempt {attempt} is already solved, retrying.");
                    return None;
                }
                if !is_solvable(&candidate, max_moves) {
                    debug!("Attempt {attempt} not solvable within {max_moves} moves.");
                    return None;
                }
                Some((attempt, candidate))
            });

        match accepted {
            Some((attempt, mut puzzle)) => {
                debug!("Seed {level_seed} accepted on attempt {attempt}: {puzzle}");
                puzzle.reassign_ids();
                puzzle
            }
            None => {
                warn!(
                    "No solvable candidate for seed {level_seed} in {} attempts, scrambling instead.",
                    self.config.max_attempts
                );
                scrambled_puzzle(shape, level_seed)
            }
        }
    }
}

/// Picks the level's colors, deals four layers of each into the first
/// bottles, leaves the rest empty, then shuffles bottle order. May be
/// unsolvable.
pub fn random_puzzle(shape: LevelShape, seed: u64) -> Puzzle {
    let mut rng = SeededRng::new(seed);
    let colors = pick_colors(shape, &mut rng);

    let mut layers: Vec<Color> = colors
        .iter()
        .flat_map(|color| std::iter::repeat_n(*color, BOTTLE_CAPACITY))
        .collect();
    rng.shuffle(&mut layers);

    let mut bottles: Vec<Bottle> = layers
        .chunks(BOTTLE_CAPACITY)
        .enumerate()
        .map(|(id, chunk)| {
            let mut slots = [Layer::Empty; BOTTLE_CAPACITY];
            for (slot, color) in slots.iter_mut().zip(chunk) {
                *slot = Layer::Liquid(*color);
            }
            Bottle::new(id, slots)
        })
        .collect();
    bottles.extend((shape.colors()..shape.bottles()).map(Bottle::empty));

    let mut puzzle = Puzzle::new(bottles);
    puzzle.shuffle_bottles(&mut rng);
    puzzle
}

/// Works backwards from a solved arrangement. Every step is a pour that the
/// forward rules can undo exactly, so the result is always solvable.
pub fn scrambled_puzzle(shape: LevelShape, seed: u64) -> Puzzle {
    let mut rng = SeededRng::new(seed);
    let colors = pick_colors(shape, &mut rng);
    let mut puzzle = Puzzle::solved(&colors, shape.bottles());

    let target_moves = SCRAMBLE_BASE_MOVES + (seed % SCRAMBLE_SPREAD) as usize;
    let mut visited = HashSet::from([puzzle.state_key()]);
    let mut applied = 0;
    for _ in 0..target_moves {
        let candidates = reverse_pours(&puzzle);
        let fresh: Vec<&Puzzle> = candidates
            .iter()
            .filter(|p| !visited.contains(&p.state_key()))
            .collect();
        let pool: Vec<&Puzzle> = if fresh.is_empty() {
            candidates.iter().collect()
        } else {
            fresh
        };
        if pool.is_empty() {
            break;
        }
        let next = pool[rng.range_usize(pool.len())].clone();
        visited.insert(next.state_key());
        puzzle = next;
        applied += 1;
    }
    debug!("Scrambled seed {seed} with {applied} reverse pours.");

    puzzle.shuffle_bottles(&mut rng);
    puzzle.reassign_ids();
    puzzle
}

fn pick_colors(shape: LevelShape, rng: &mut SeededRng) -> Vec<Color> {
    let mut palette = Color::ALL;
    rng.shuffle(&mut palette);
    palette[..shape.colors()].to_vec()
}

/// Positions one pour before `puzzle`: each one returns to `puzzle` through a
/// single legal forward pour. Solved positions are left out.
fn reverse_pours(puzzle: &Puzzle) -> Vec<Puzzle> {
    let n = puzzle.len();
    let mut found = Vec::new();
    for from in 0..n {
        let Some(top) = puzzle.bottles()[from].top_info() else {
            continue;
        };
        for to in (0..n).filter(|&to| to != from) {
            let space = puzzle.bottles()[to].empty_count();
            for amount in 1..=top.count.min(space) {
                let mut previous = puzzle.clone();
                previous.transfer(from, to, amount);
                if previous.is_solved() {
                    continue;
                }
                if previous.pour(to, from).as_ref() == Some(puzzle) {
                    found.push(previous);
                }
            }
        }
    }
    found
}
