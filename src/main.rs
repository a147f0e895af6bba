//! Goban command line.
//!
//! ## Usage
//!
//! - `goban check <FILE>` - Parse a record and replay every variation
//! - `goban normalize <FILE>` - Print a record in canonical SGF
//! - `goban demo` - Play a random game and print it as SGF
//!
//! Logs go to stderr; set `RUST_LOG` to change the level.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use goban::board::{Color, Field};
use goban::constants::{DEFAULT_BOARD_SIZE, MAX_BOARD_SIZE, MAX_DEMO_MOVES};
use goban::game::{Game, Move, handicap_points};
use goban::path::Path;
use goban::record::{self, Node, RecordTree};
use goban::replay::replay;
use goban::rules::Rules;

/// Goban: Go rules engine and SGF toolkit
#[derive(Parser)]
#[command(name = "goban")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an SGF file and replay every variation under the rules
    Check {
        file: PathBuf,
        /// Override the ruleset named in the record (japanese, chinese, ing, none)
        #[arg(long)]
        rules: Option<Rules>,
        /// Place illegal moves instead of reporting them
        #[arg(long)]
        lenient: bool,
    },
    /// Parse an SGF file and print it back in canonical form
    Normalize { file: PathBuf },
    /// Play random legal moves and print the game as SGF
    Demo {
        #[arg(long, default_value_t = DEFAULT_BOARD_SIZE)]
        size: usize,
        #[arg(long, default_value_t = 200)]
        moves: usize,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = Rules::Japanese)]
        rules: Rules,
        #[arg(long, default_value_t = 0)]
        handicap: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("goban=info".parse()?))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Check {
            file,
            rules,
            lenient,
        } => run_check(&file, rules, !lenient),
        Commands::Normalize { file } => run_normalize(&file),
        Commands::Demo {
            size,
            moves,
            seed,
            rules,
            handicap,
        } => run_demo(size, moves, seed, rules, handicap),
    }
}

fn read_records(file: &std::path::Path) -> Result<Vec<RecordTree>> {
    let text =
        fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    record::parse_all(&text).with_context(|| format!("failed to parse {}", file.display()))
}

fn run_check(file: &std::path::Path, rules: Option<Rules>, strict: bool) -> Result<()> {
    let mut trees = read_records(file)?;
    for (i, tree) in trees.iter_mut().enumerate() {
        if let Some(rules) = rules {
            tree.info.rules = Some(rules.to_string());
        }
        let paths = tree.paths();
        let leaves: Vec<&Path> = paths
            .iter()
            .filter(|p| tree.node_at(p).is_some_and(|n| n.children.is_empty()))
            .collect();

        let mut last = None;
        for path in &leaves {
            let game = replay(tree, path, strict)
                .with_context(|| format!("game {}: variation {:?}", i + 1, path.variations))?;
            debug!(depth = path.move_number, ply = game.move_number(), "variation ok");
            last.get_or_insert(game);
        }

        info!(
            game = i + 1,
            nodes = paths.len(),
            variations = leaves.len(),
            "record replays cleanly"
        );
        if let Some(game) = last {
            let state = game.state();
            println!(
                "game {}: {} plies on the main line, captures B {} W {}, {} to move",
                i + 1,
                game.move_number(),
                state.black_captures,
                state.white_captures,
                game.player()
            );
            println!("{}", game.position());
        }
    }
    Ok(())
}

fn run_normalize(file: &std::path::Path) -> Result<()> {
    let trees = read_records(file)?;
    print!("{}", record::serialize_all(&trees));
    Ok(())
}

fn run_demo(
    size: usize,
    moves: usize,
    seed: Option<u64>,
    rules: Rules,
    handicap: usize,
) -> Result<()> {
    if !(1..=MAX_BOARD_SIZE).contains(&size) {
        bail!("board size must be between 1 and {MAX_BOARD_SIZE}, got {size}");
    }
    let moves = moves.min(MAX_DEMO_MOVES);
    let mut rng = match seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };

    let mut game = Game::with_handicap(size, size, rules, handicap);
    let mut tree = RecordTree::new(size, size);
    tree.info.rules = Some(rules.to_string());
    tree.info.komi = Some(game.komi());
    tree.info.application = Some(format!("goban:{}", env!("CARGO_PKG_VERSION")));

    if handicap >= 2 {
        let stones = handicap_points(size, size, handicap);
        if stones.is_empty() {
            warn!(handicap, size, "no standard handicap placement, playing without");
        }
        for p in stones {
            game.set_stone(p.x, p.y, Color::Black)?;
            tree.root.add_setup(Field::new(p.x, p.y, Color::Black));
        }
        tree.info.handicap = Some(handicap);
    }

    let mut node = &mut tree.root;
    let mut passes = 0;
    for _ in 0..moves {
        let color = game.player();
        let candidates = legal_points(&game);

        let mv = if candidates.is_empty() {
            game.pass();
            passes += 1;
            Move::pass(color)
        } else {
            let (x, y) = candidates[rng.usize(..candidates.len())];
            game.play(x, y)?;
            passes = 0;
            Move::play(x, y, color)
        };
        node = node.push_child(Node::with_move(mv));
        if passes == 2 {
            break;
        }
    }

    let state = game.state();
    info!(
        plies = game.move_number(),
        black_captures = state.black_captures,
        white_captures = state.white_captures,
        "demo finished"
    );
    eprintln!("{}", game.position());
    print!("{}", record::serialize(&tree));
    Ok(())
}

/// Empty points the player to move may take.
fn legal_points(game: &Game) -> Vec<(usize, usize)> {
    let board = game.position();
    let mut points = Vec::new();
    for y in 0..board.rows() {
        for x in 0..board.cols() {
            if game.is_valid_move(x, y) {
                points.push((x, y));
            }
        }
    }
    points
}
