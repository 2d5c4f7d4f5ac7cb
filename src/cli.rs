use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::gameplay::{GameEngine, MoveOutcome, Progress};
use crate::generator::{DEFAULT_ATTEMPT_SEED_STRIDE, DEFAULT_MAX_ATTEMPTS, GeneratorConfig};
use crate::model::Puzzle;
use crate::solver::DEFAULT_MAX_MOVES;

/// Liquid sort puzzle generator, solver and terminal player
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub generator: GeneratorArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct GeneratorArgs {
    /// Random candidates to try before scrambling a solved board
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS, global = true)]
    pub max_attempts: usize,

    /// Move ceiling for the solvability search
    #[arg(long, default_value_t = DEFAULT_MAX_MOVES, global = true)]
    pub max_moves: usize,
}

impl GeneratorArgs {
    pub fn config(&self) -> GeneratorConfig {
        GeneratorConfig {
            max_attempts: self.max_attempts,
            max_moves: self.max_moves,
            attempt_seed_stride: DEFAULT_ATTEMPT_SEED_STRIDE,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play in the terminal
    Play {
        /// Level to start on (defaults to the highest unlocked)
        #[arg(short, long)]
        level: Option<u32>,

        /// Where progress is kept (defaults to the user data directory)
        #[arg(long)]
        progress_file: Option<PathBuf>,
    },
    /// Print a generated puzzle
    Generate {
        #[arg(short, long, conflicts_with_all = ["colors", "bottles", "seed"])]
        level: Option<u32>,

        #[arg(long, requires = "bottles")]
        colors: Option<usize>,

        #[arg(long, requires = "colors")]
        bottles: Option<usize>,

        #[arg(long)]
        seed: Option<u64>,

        /// Use a random seed instead of --seed
        #[arg(long, conflicts_with = "seed")]
        random_seed: bool,
    },
    /// Print the shortest solution for a level
    Solve {
        #[arg(short, long, default_value_t = 1)]
        level: u32,
    },
}

#[must_use]
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// One line of player input during `play`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerInput {
    Tap(usize),
    Pour(usize, usize),
    Undo,
    Reset,
    Next,
    Quit,
    Invalid,
}

pub fn parse_player_input(line: &str) -> PlayerInput {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.as_slice() {
        ["u" | "undo"] => PlayerInput::Undo,
        ["r" | "reset"] => PlayerInput::Reset,
        ["n" | "next"] => PlayerInput::Next,
        ["q" | "quit" | "exit"] => PlayerInput::Quit,
        [id] => id.parse::<usize>().map_or(PlayerInput::Invalid, PlayerInput::Tap),
        [from, to] => match (from.parse::<usize>(), to.parse::<usize>()) {
            (Ok(from), Ok(to)) => PlayerInput::Pour(from, to),
            _ => PlayerInput::Invalid,
        },
        _ => PlayerInput::Invalid,
    }
}

pub fn render_board<W: Write>(engine: &GameEngine, out: &mut W) -> io::Result<()> {
    writeln!(out, "Level {}  moves {}", engine.level(), engine.moves())?;
    for bottle in engine.bottles() {
        let marker = if engine.selected() == Some(bottle.id()) { '*' } else { ' ' };
        writeln!(out, "{marker}{:>2} [{}]", bottle.id(), bottle.text_representation())?;
    }
    Ok(())
}

/// One `letter=name(hex)` entry per color on the board, in palette order.
pub fn palette_legend(puzzle: &Puzzle) -> String {
    puzzle
        .color_counts()
        .keys()
        .map(|color| format!("{}={}({})", color.letter(), color, color.hex()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn describe(outcome: &MoveOutcome) -> String {
    match outcome {
        MoveOutcome::Selected { id } => format!("Selected bottle {id}."),
        MoveOutcome::Deselected { id } => format!("Deselected bottle {id}."),
        MoveOutcome::Empty => "That bottle is empty.".to_string(),
        MoveOutcome::Poured {
            from, to, color, count, ..
        } => format!("Poured {count} {color} from {from} to {to}."),
        MoveOutcome::Invalid { reason } => format!("Can't pour there ({reason:?})."),
    }
}

/// Reads commands until quit or end of input. `save` receives the progress
/// whenever the watermark moves.
pub fn play_loop<R, W, F>(engine: &mut GameEngine, reader: &mut R, out: &mut W, mut save: F) -> io::Result<()>
where
    R: BufRead,
    W: Write,
    F: FnMut(Progress),
{
    render_board(engine, out)?;
    let mut line = String::new();
    loop {
        writeln!(out, "Tap a bottle, '<from> <to>', u(ndo), r(eset), n(ext), q(uit):")?;
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(());
        }
        let outcome = match parse_player_input(&line) {
            PlayerInput::Tap(id) => Some(engine.select_bottle(id)),
            PlayerInput::Pour(from, to) => Some(engine.pour(from, to)),
            PlayerInput::Undo => {
                if !engine.undo() {
                    writeln!(out, "Nothing to undo.")?;
                }
                None
            }
            PlayerInput::Reset => {
                engine.reset_level();
                None
            }
            PlayerInput::Next => {
                if engine.next_level().is_some() {
                    save(engine.progress());
                }
                None
            }
            PlayerInput::Quit => return Ok(()),
            PlayerInput::Invalid => {
                writeln!(out, "Unrecognised command.")?;
                continue;
            }
        };
        if let Some(outcome) = outcome {
            writeln!(out, "{}", describe(&outcome))?;
        }
        render_board(engine, out)?;
        if engine.is_won() {
            writeln!(out, "Solved in {} moves! Type 'n' for the next level.", engine.moves())?;
        }
    }
}
