//! Turn-tracking game engine.
//!
//! A [`Game`] owns the current [`GameState`] plus a stack of every earlier
//! state. The stack serves both undo ([`Game::previous`]) and the ko checks
//! of the active [`Rules`].

use tracing::debug;

use crate::board::{Board, Color, Placement, Point};
use crate::constants::DEFAULT_KOMI;
use crate::error::{GoError, Result};
use crate::rules::{RuleContext, Rules};

/// A play at a point or a pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Move {
    Play { point: Point, color: Color },
    Pass { color: Color },
}

impl Move {
    pub fn play(x: usize, y: usize, color: Color) -> Self {
        Move::Play {
            point: Point::new(x, y),
            color,
        }
    }

    pub fn pass(color: Color) -> Self {
        Move::Pass { color }
    }

    pub fn color(&self) -> Color {
        match *self {
            Move::Play { color, .. } | Move::Pass { color } => color,
        }
    }

    /// The played point; `None` for a pass.
    pub fn point(&self) -> Option<Point> {
        match *self {
            Move::Play { point, .. } => Some(point),
            Move::Pass { .. } => None,
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Move::Pass { .. })
    }
}

/// Everything that changes from one ply to the next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    pub position: Board,
    /// Stones captured by Black.
    pub black_captures: usize,
    /// Stones captured by White.
    pub white_captures: usize,
    /// Player to move.
    pub player: Color,
}

impl GameState {
    pub fn new(position: Board, player: Color) -> Self {
        Self {
            position,
            black_captures: 0,
            white_captures: 0,
            player,
        }
    }

    fn credit(&mut self, color: Color, stones: usize) {
        match color {
            Color::Black => self.black_captures += stones,
            Color::White => self.white_captures += stones,
            Color::Empty => {}
        }
    }
}

/// Standard handicap stone placement for a board, or an empty list when the
/// board has no fixed star points for that many stones.
///
/// Boards of at least 7×7 get up to 4 stones on the corner star points;
/// boards with odd dimensions of at least 9×9 support up to 9 stones.
pub fn handicap_points(cols: usize, rows: usize, count: usize) -> Vec<Point> {
    if count < 2 || cols < 7 || rows < 7 {
        return Vec::new();
    }
    let odd = cols % 2 == 1 && rows % 2 == 1 && cols >= 9 && rows >= 9;
    let max = if odd { 9 } else { 4 };
    if count > max {
        return Vec::new();
    }

    let near_x = if cols >= 13 { 3 } else { 2 };
    let near_y = if rows >= 13 { 3 } else { 2 };
    let (far_x, far_y) = (cols - near_x - 1, rows - near_y - 1);
    let (mid_x, mid_y) = (cols / 2, rows / 2);

    let mut points = vec![Point::new(far_x, near_y), Point::new(near_x, far_y)];
    if count >= 3 {
        points.push(Point::new(far_x, far_y));
    }
    if count >= 4 {
        points.push(Point::new(near_x, near_y));
    }
    if count >= 5 && count % 2 == 1 {
        points.push(Point::new(mid_x, mid_y));
    }
    if count >= 6 {
        points.push(Point::new(near_x, mid_y));
        points.push(Point::new(far_x, mid_y));
    }
    if count >= 8 {
        points.push(Point::new(mid_x, near_y));
        points.push(Point::new(mid_x, far_y));
    }
    points
}

/// A game in progress.
#[derive(Clone, Debug)]
pub struct Game {
    rules: Rules,
    komi: f64,
    state: GameState,
    history: Vec<GameState>,
}

impl Game {
    /// Empty board, Black to move.
    pub fn new(cols: usize, rows: usize, rules: Rules) -> Self {
        Self::with_handicap(cols, rows, rules, 0)
    }

    /// Empty board; White moves first when `handicap` is 2 or more.
    ///
    /// The handicap stones themselves are not placed: call
    /// [`Game::place_handicap`] or [`Game::set_stone`] before the first move.
    pub fn with_handicap(cols: usize, rows: usize, rules: Rules, handicap: usize) -> Self {
        let player = if handicap >= 2 {
            Color::White
        } else {
            Color::Black
        };
        Self {
            rules,
            komi: DEFAULT_KOMI,
            state: GameState::new(Board::new(cols, rows), player),
            history: Vec::new(),
        }
    }

    pub fn rules(&self) -> Rules {
        self.rules
    }

    pub fn komi(&self) -> f64 {
        self.komi
    }

    pub fn set_komi(&mut self, komi: f64) {
        self.komi = komi;
    }

    /// The current state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Earlier states, oldest first.
    pub fn history(&self) -> &[GameState] {
        &self.history
    }

    /// Number of plies since the start of the game.
    pub fn move_number(&self) -> usize {
        self.history.len()
    }

    pub fn position(&self) -> &Board {
        &self.state.position
    }

    pub fn player(&self) -> Color {
        self.state.player
    }

    /// Sets a stone directly, bypassing the rules. Meant for setup positions.
    pub fn set_stone(&mut self, x: usize, y: usize, color: Color) -> Result<()> {
        self.state.position.set(x, y, color)
    }

    pub fn set_player(&mut self, color: Color) {
        self.state.player = color;
    }

    /// Places the standard handicap stones for Black. Returns how many were
    /// placed; zero when the board has no standard placement for `count`.
    pub fn place_handicap(&mut self, count: usize) -> Result<usize> {
        let points = handicap_points(self.state.position.cols(), self.state.position.rows(), count);
        for p in &points {
            self.set_stone(p.x, p.y, Color::Black)?;
        }
        Ok(points.len())
    }

    /// Starts a new ply: the current state is saved and stays editable.
    pub fn next(&mut self) {
        self.history.push(self.state.clone());
    }

    /// Returns to the previous ply. `false` if already at the start.
    pub fn previous(&mut self) -> bool {
        match self.history.pop() {
            Some(state) => {
                self.state = state;
                true
            }
            None => false,
        }
    }

    /// Returns to ply 0 and clears the history.
    pub fn initial(&mut self) {
        if !self.history.is_empty() {
            self.state = self.history.swap_remove(0);
            self.history.clear();
        }
    }

    fn context(&self) -> RuleContext<'_> {
        RuleContext {
            state: &self.state,
            history: &self.history,
            komi: Some(self.komi),
        }
    }

    /// Whether `mv` is legal in the current state under the active rules.
    pub fn is_valid(&self, mv: &Move) -> bool {
        self.rules.is_valid_move(mv, &self.context())
    }

    /// Whether the player to move may play at `(x, y)`.
    pub fn is_valid_move(&self, x: usize, y: usize) -> bool {
        self.is_valid(&Move::play(x, y, self.state.player))
    }

    /// Plays for the player to move.
    ///
    /// # Errors
    /// `GoError::InvalidMove` if the rules forbid the move; the game is left
    /// unchanged.
    pub fn play(&mut self, x: usize, y: usize) -> Result<Placement> {
        let color = self.state.player;
        if !self.is_valid_move(x, y) {
            return Err(GoError::InvalidMove { x, y, color });
        }
        self.next();
        let placement = self.make_move(&Move::play(x, y, color));
        debug!(ply = self.move_number(), %color, x, y, ?placement, "play");
        Ok(placement)
    }

    pub fn pass(&mut self) {
        let color = self.state.player;
        self.next();
        self.make_move(&Move::pass(color));
        debug!(ply = self.move_number(), %color, "pass");
    }

    /// Applies `mv` to the current state without checking legality and
    /// without starting a new ply.
    ///
    /// Captured stones are credited to the mover; a suicided chain is
    /// credited to the opponent. The opponent of the move's color is to move
    /// afterwards, even if the placement was rejected by the board.
    pub fn make_move(&mut self, mv: &Move) -> Placement {
        let color = mv.color();
        let placement = match *mv {
            Move::Pass { .. } => Placement::Captured(0),
            Move::Play { point, color } => {
                let placement = self.state.position.make_move(point.x, point.y, color);
                match placement {
                    Placement::Captured(n) => self.state.credit(color, n),
                    Placement::Suicide(n) => self.state.credit(color.opposite(), n),
                    Placement::Illegal => {}
                }
                placement
            }
        };
        self.state.player = color.opposite();
        placement
    }
}
