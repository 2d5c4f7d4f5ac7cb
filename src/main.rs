use std::io;
use std::process::ExitCode;

use log::{error, info, warn};

use liquid_sort::cli::{Command, palette_legend, parse_cli, play_loop};
use liquid_sort::{GameEngine, LevelGenerator, LevelShape, LevelTable, ProgressStore, Solver};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = parse_cli();
    let generator = LevelGenerator::new(cli.generator.config());
    let levels = LevelTable::default();

    match cli.command {
        Command::Play {
            level,
            progress_file,
        } => {
            let store = match progress_file {
                Some(path) => ProgressStore::new(path),
                None => match ProgressStore::default_location() {
                    Ok(store) => store,
                    Err(e) => {
                        error!("{e}");
                        return ExitCode::FAILURE;
                    }
                },
            };
            info!("Progress file: {}", store.path().display());
            let progress = store.load().unwrap_or_else(|e| {
                warn!("{e}; starting from level 1.");
                Default::default()
            });
            let mut engine = GameEngine::with_config(levels, generator, progress);
            match level {
                Some(level) if !engine.play_level(level) => {
                    println!(
                        "Level {level} is locked, starting level {}.",
                        progress.highest_unlocked
                    );
                    engine.load_saved_progress();
                }
                Some(_) => {}
                None => engine.load_saved_progress(),
            }

            let stdin = io::stdin();
            let result = play_loop(&mut engine, &mut stdin.lock(), &mut io::stdout(), |progress| {
                if let Err(e) = store.save(&progress) {
                    warn!("{e}");
                }
            });
            if let Err(e) = result {
                error!("Terminal I/O failed: {e}");
                return ExitCode::FAILURE;
            }
        }
        Command::Generate {
            level,
            colors,
            bottles,
            seed,
            random_seed,
        } => {
            let (shape, seed) = match (colors, bottles) {
                (Some(colors), Some(bottles)) => match LevelShape::new(colors, bottles) {
                    Ok(shape) => {
                        let seed = if random_seed {
                            u64::from(rand::random::<u32>())
                        } else {
                            seed.unwrap_or(1)
                        };
                        (shape, seed)
                    }
                    Err(e) => {
                        error!("{e}");
                        return ExitCode::FAILURE;
                    }
                },
                _ => {
                    let level = level.unwrap_or(1);
                    (levels.shape_for(level), u64::from(level))
                }
            };
            let puzzle = generator.generate_level(shape, seed);
            println!("seed {seed}: {puzzle}");
            println!("{}", palette_legend(&puzzle));
        }
        Command::Solve { level } => {
            let puzzle = generator.generate_level(levels.shape_for(level), u64::from(level));
            println!("Level {level}: {puzzle}");
            println!("{}", palette_legend(&puzzle));
            match Solver::new(puzzle)
                .with_max_moves(generator.config().max_moves)
                .solve()
            {
                Some(path) => {
                    for (step, action) in path.iter().enumerate() {
                        println!(
                            "{:>3}. pour {} -> {} ({} layer{})",
                            step + 1,
                            action.from,
                            action.to,
                            action.amount,
                            if action.amount == 1 { "" } else { "s" }
                        );
                    }
                }
                None => println!("No solution within {} moves.", generator.config().max_moves),
            }
        }
    }
    ExitCode::SUCCESS
}
