use std::collections::{HashSet, VecDeque};

use log::debug;

use crate::model::{MoveAction, Puzzle};

pub const DEFAULT_MAX_MOVES: usize = 150;

struct SearchNode {
    state: Puzzle,
    parent: Option<usize>,
    action: Option<MoveAction>,
    depth: usize,
}

/// Breadth-first search over pour sequences.
///
/// A `false` answer means no solved state is reachable within `max_moves`
/// pours, not that the puzzle is unsolvable in general.
pub struct Solver {
    starting_state: Puzzle,
    max_moves: usize,
}

impl Solver {
    pub fn new(starting_state: Puzzle) -> Solver {
        Solver {
            starting_state,
            max_moves: DEFAULT_MAX_MOVES,
        }
    }

    pub fn with_max_moves(mut self, max_moves: usize) -> Solver {
        self.max_moves = max_moves;
        self
    }

    pub fn is_solvable(&self) -> bool {
        if self.starting_state.is_solved() {
            return true;
        }
        self.search().is_some()
    }

    /// Shortest pour sequence that solves the puzzle, empty if it already is.
    /// Bottle indices refer to the starting puzzle; pours never reorder bottles.
    pub fn solve(&self) -> Option<Vec<MoveAction>> {
        let (nodes, goal) = self.search()?;
        let mut path = Vec::with_capacity(nodes[goal].depth);
        let mut cursor = Some(goal);
        while let Some(index) = cursor {
            let node = &nodes[index];
            if let Some(action) = node.action {
                path.push(action);
            }
            cursor = node.parent;
        }
        path.reverse();
        Some(path)
    }

    fn search(&self) -> Option<(Vec<SearchNode>, usize)> {
        let root = SearchNode {
            state: self.starting_state.clone(),
            parent: None,
            action: None,
            depth: 0,
        };
        if root.state.is_solved() {
            return Some((vec![root], 0));
        }
        if !root.state.can_complete_bottles() {
            debug!("Color counts can never form complete bottles, skipping search.");
            return None;
        }

        let mut visited = HashSet::new();
        visited.insert(root.state.state_key());
        let mut nodes = vec![root];
        let mut considering = VecDeque::from([0usize]);

        while let Some(index) = considering.pop_front() {
            let depth = nodes[index].depth;
            if depth >= self.max_moves {
                continue;
            }
            for (action, next) in successors(&nodes[index].state) {
                if !visited.insert(next.state_key()) {
                    continue;
                }
                let solved = next.is_solved();
                nodes.push(SearchNode {
                    state: next,
                    parent: Some(index),
                    action: Some(action),
                    depth: depth + 1,
                });
                let child = nodes.len() - 1;
                if solved {
                    debug!(
                        "Solved in {} moves after visiting {} states.",
                        depth + 1,
                        visited.len()
                    );
                    return Some((nodes, child));
                }
                considering.push_back(child);
            }
        }
        debug!(
            "Exhausted {} states without reaching a solution within {} moves.",
            visited.len(),
            self.max_moves
        );
        None
    }
}

fn successors(state: &Puzzle) -> Vec<(MoveAction, Puzzle)> {
    state
        .legal_moves()
        .filter_map(|action| {
            state
                .pour(action.from, action.to)
                .map(|next| (action, next))
        })
        .collect()
}

pub fn is_solvable(puzzle: &Puzzle, max_moves: usize) -> bool {
    Solver::new(puzzle.clone())
        .with_max_moves(max_moves)
        .is_solvable()
}
