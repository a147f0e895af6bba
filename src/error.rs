//! Error types shared by the engine and the record layer.

use thiserror::Error;

use crate::board::Color;

/// Errors raised by the board, the game engine and the SGF record layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GoError {
    /// The move is not legal under the active ruleset.
    #[error("Invalid move: {color:?} at ({x}, {y})")]
    InvalidMove { x: usize, y: usize, color: Color },

    /// Coordinate outside the board.
    #[error("Coordinate out of range: ({x}, {y})")]
    OutOfRange { x: usize, y: usize },

    /// Malformed SGF text.
    #[error("Syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    /// A path that does not resolve to any node of the record tree.
    #[error("No node at move {move_number} with variations {variations:?}")]
    PathNotFound {
        move_number: usize,
        variations: Vec<usize>,
    },

    /// A known property carries a value it cannot hold.
    #[error("Invalid value for property {code}: {value:?}")]
    InvalidProperty { code: String, value: String },

    /// A property code registered twice.
    #[error("Property {0} is already registered")]
    DuplicateProperty(String),

    /// Ruleset name that maps to no rule variant.
    #[error("Unknown ruleset: {0}")]
    UnknownRules(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GoError>;
