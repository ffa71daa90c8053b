use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use rand::rngs::StdRng;
use rand::{CryptoRng, RngCore, SeedableRng};
use slide_2048::{Direction, EngineError, GameSession, RandomSource, SessionConfig, Tile};

#[derive(Parser, Debug)]
#[command(name = "slide-2048", version, about = "Play the 8x8 sliding-tile game in a terminal")]
struct Args {
    /// TOML file with session rules (winning_tile, four_threshold, initial_tiles)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,
    /// High score carried over from a previous run
    #[arg(long, default_value_t = 0)]
    high_score: u64,
    /// Override the winning tile from the config
    #[arg(long)]
    winning_tile: Option<Tile>,
    /// Seed a reproducible game instead of using the OS random source
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SessionConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if let Some(tile) = args.winning_tile {
        config.winning_tile = tile;
    }

    let high_score = match args.seed {
        Some(seed) => {
            let source = RandomSource::from_rng(StdRng::seed_from_u64(seed));
            let game = GameSession::with_source(config, source).context("invalid session rules")?;
            play(game.with_high_score(args.high_score))?
        }
        None => {
            let game = GameSession::new(config).context("invalid session rules")?;
            play(game.with_high_score(args.high_score))?
        }
    };
    println!("HIGHEST SCORE: {high_score}");
    Ok(())
}

/// Run the read-eval-print loop until EOF or `q`; returns the final high score.
fn play<R: RngCore + CryptoRng>(mut game: GameSession<R>) -> anyhow::Result<u64> {
    game.start_new_game()?;
    render(&game)?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("reading command from stdin")?;
        let cmd = line.trim();
        match cmd {
            "" => continue,
            "q" | "quit" => break,
            "n" | "new" => {
                game.start_new_game()?;
            }
            _ => match cmd.parse::<Direction>() {
                Ok(dir) => match game.request_move(dir) {
                    Ok(result) if result.is_noop() => println!("{dir} is not possible"),
                    Ok(_) => {}
                    Err(EngineError::SessionEnded(state)) => println!("game over ({state:?}); type n for a new game"),
                    Err(e) => return Err(e.into()),
                },
                Err(e) => println!("{e}; use w/a/s/d, n or q"),
            },
        }
        render(&game)?;
    }
    Ok(game.high_score())
}

fn render<R>(game: &GameSession<R>) -> anyhow::Result<()> {
    println!("{}", game.grid());
    println!("SCORE: {}   HIGHEST SCORE: {}", game.score(), game.high_score());
    if game.state().is_terminal() {
        println!("{:?}! type n for a new game or q to quit", game.state());
    } else {
        let moves: Vec<String> = game.legal_directions().iter().map(ToString::to_string).collect();
        println!("moves: {}", moves.join(" "));
    }
    print!("> ");
    io::stdout().flush().context("flushing stdout")?;
    Ok(())
}
