use anyhow::{Context, Result};
use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use minefield::{
    render_board, Action, ActionOutcome, Difficulty, FlagResult, Game, GameConfig, GameStatus,
    Position,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Minesweeper in the terminal")]
struct Cli {
    /// Board preset to start from
    #[arg(short, long, value_enum, default_value_t = Difficulty::Easy)]
    difficulty: Difficulty,

    /// TOML file with columns, rows, mines and guaranteed_start
    #[arg(long, conflicts_with = "difficulty")]
    config: Option<PathBuf>,

    #[arg(long)]
    columns: Option<usize>,

    #[arg(long)]
    rows: Option<usize>,

    #[arg(long)]
    mines: Option<usize>,

    /// Seed for a reproducible mine layout
    #[arg(long)]
    seed: Option<u64>,

    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

impl Cli {
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => self.difficulty.config(),
        };
        config.columns = self.columns.unwrap_or(config.columns);
        config.rows = self.rows.unwrap_or(config.rows);
        config.mines = self.mines.unwrap_or(config.mines);
        Ok(config)
    }
}

enum Command {
    Act(Position, Action),
    Quit,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .parse_default_env()
        .init();

    let config = cli.game_config()?;
    let mut game = match cli.seed {
        Some(seed) => Game::with_seed(config, seed)?,
        None => Game::new(config)?,
    };

    run_game(&mut game)?;
    println!("Thanks for playing!");
    Ok(())
}

fn run_game(game: &mut Game) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while !game.is_over() {
        println!("{}", render_board(game));
        println!("Mines left: {}", game.mines_remaining());
        print!("Enter command (row column [r/f/c], a, q): ");
        io::stdout().flush()?;

        let Some(line) = lines.next().transpose()? else {
            return Ok(());
        };

        match parse_command(&line) {
            Some(Command::Quit) => return Ok(()),
            Some(Command::Act(pos, action)) => {
                if !game.grid().valid(pos) && action != Action::RevealAll {
                    println!("Position out of bounds");
                    continue;
                }
                report(game.perform_action(pos, action));
            }
            None => println!("Unrecognized command"),
        }
    }

    println!("{}", render_board(game));
    match game.status() {
        GameStatus::Solved => println!("Congratulations! You won!"),
        GameStatus::Exploded(pos) => println!("Game Over! Mine at {}, {}", pos.row, pos.column),
        GameStatus::NotStarted | GameStatus::InProgress => println!("Board revealed."),
    }

    Ok(())
}

fn report(outcome: ActionOutcome) {
    match outcome {
        ActionOutcome::Flagged(FlagResult::Ignored) => println!("Cannot flag that cell"),
        ActionOutcome::Revealed(result) if result.is_empty() => println!("Nothing to reveal"),
        _ => {}
    }
}

fn parse_command(input: &str) -> Option<Command> {
    let mut parts = input.split_whitespace();
    let first = parts.next()?;

    match first {
        "q" => return Some(Command::Quit),
        "a" => return Some(Command::Act(Position::new(0, 0), Action::RevealAll)),
        _ => {}
    }

    let row = first.parse().ok()?;
    let column = parts.next()?.parse().ok()?;
    let action = match parts.next().unwrap_or("r") {
        "r" => Action::Reveal,
        "f" => Action::Flag,
        "c" => Action::Chord,
        _ => return None,
    };

    Some(Command::Act(Position::new(row, column), action))
}
