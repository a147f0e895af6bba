//! Defaults and limits for boards, records and the demo player.
//!
//! Board dimensions are chosen at runtime; these values only apply when a
//! record or a command line leaves them unspecified.

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size used when a record carries no `SZ` property.
pub const DEFAULT_BOARD_SIZE: usize = 19;

/// Largest dimension an SGF coordinate can address (`a`-`z`, then `A`-`Z`).
pub const MAX_BOARD_SIZE: usize = 52;

/// Largest board on which the coordinate `tt` is read as a pass.
pub const PASS_THRESHOLD: usize = 19;

// =============================================================================
// Game Defaults
// =============================================================================

/// Komi used by the demo player and by records without `KM`.
pub const DEFAULT_KOMI: f64 = 6.5;

/// Upper bound on the number of plies the demo player generates.
pub const MAX_DEMO_MOVES: usize = 1000;
