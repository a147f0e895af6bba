//! Goban: Go rules engine and SGF game records.
//!
//! The crate plays moves on a rectangular board under a choice of rulesets
//! and reads, edits and writes game records in the Smart Game Format.
//!
//! ## Modules
//!
//! - [`constants`] - Board limits and defaults
//! - [`board`] - Stones, chains, captures
//! - [`rules`] - Move legality: suicide and ko/superko per ruleset
//! - [`game`] - Game state, history and turn order
//! - [`sgf`] - SGF syntax: collections, game trees, raw properties
//! - [`properties`] - Typed property descriptors and the registry
//! - [`record`] - Record trees built from SGF
//! - [`path`] - Addressing and searching nodes of a record tree
//! - [`replay`] - Rebuilding a game from a record
//!
//! ## Example
//!
//! ```
//! use goban::game::Game;
//! use goban::path::Path;
//! use goban::record::parse;
//! use goban::replay::replay;
//! use goban::rules::Rules;
//!
//! let mut game = Game::new(9, 9, Rules::Japanese);
//! game.play(2, 2).unwrap();
//! assert!(!game.is_valid_move(2, 2));
//!
//! let tree = parse("(;SZ[9];B[cc](;W[dd])(;W[ee]))").unwrap();
//! let replayed = replay(&tree, &Path::new(2, vec![1]), true).unwrap();
//! assert_eq!(replayed.move_number(), 2);
//! ```

pub mod board;
pub mod constants;
pub mod error;
pub mod game;
pub mod path;
pub mod properties;
pub mod record;
pub mod replay;
pub mod rules;
pub mod sgf;

pub use board::{Board, Color, Field, Placement, Point};
pub use error::{GoError, Result};
pub use game::{Game, GameState, Move};
pub use path::{Cursor, Path};
pub use record::{Node, RecordTree};
pub use rules::Rules;
