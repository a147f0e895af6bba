//! Board grid with chain capture and suicide detection.
//!
//! The board is a rectangular `cols × rows` array of [`Color`] cells indexed
//! by 0-based `(x, y)`. Out-of-range coordinates are never a cell value:
//! [`Board::get`] reports them as `None` and [`Board::set`] rejects them.

use std::fmt;

use crate::error::{GoError, Result};

/// Stone color of a cell, or the player of a move.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
    Empty,
}

impl Color {
    /// Black and White swap; `Empty` has no opposite and stays `Empty`.
    pub fn opposite(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
            Color::Empty => Color::Empty,
        }
    }

    /// SGF spelling: `"B"`, `"W"` or `""`.
    pub fn as_str(self) -> &'static str {
        match self {
            Color::Black => "B",
            Color::White => "W",
            Color::Empty => "",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A 0-based board coordinate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// A point together with the color found (or to be placed) there.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Field {
    pub point: Point,
    pub color: Color,
}

impl Field {
    pub const fn new(x: usize, y: usize, color: Color) -> Self {
        Self {
            point: Point::new(x, y),
            color,
        }
    }
}

/// Outcome of [`Board::make_move`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Nothing was placed: the point is occupied, off the board, or the
    /// color was `Empty`.
    Illegal,
    /// The stone stands; this many opponent stones were removed.
    Captured(usize),
    /// The stone captured nothing and had no liberties, so the mover's own
    /// chain of this size was removed.
    Suicide(usize),
}

impl Placement {
    /// Signed capture count: positive for captured opponent stones, negative
    /// for the size of a self-captured chain, `None` when nothing was placed.
    pub fn signed(self) -> Option<isize> {
        match self {
            Placement::Illegal => None,
            Placement::Captured(n) => Some(n as isize),
            Placement::Suicide(n) => Some(-(n as isize)),
        }
    }

    pub fn is_suicide(self) -> bool {
        matches!(self, Placement::Suicide(_))
    }
}

/// A rectangular Go board.
///
/// Cloning copies every cell, so clones never alias each other.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    cols: usize,
    rows: usize,
    cells: Vec<Color>,
}

impl Board {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![Color::Empty; cols * rows],
        }
    }

    pub fn square(size: usize) -> Self {
        Self::new(size, size)
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    fn idx(&self, x: usize, y: usize) -> usize {
        y * self.cols + x
    }

    /// Whether `(x, y)` lies on the board.
    pub fn has(&self, x: usize, y: usize) -> bool {
        x < self.cols && y < self.rows
    }

    /// Cell color, or `None` for an out-of-range coordinate.
    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        if !self.has(x, y) {
            return None;
        }
        Some(self.cells[self.idx(x, y)])
    }

    pub fn set(&mut self, x: usize, y: usize, color: Color) -> Result<()> {
        if !self.has(x, y) {
            return Err(GoError::OutOfRange { x, y });
        }
        let i = self.idx(x, y);
        self.cells[i] = color;
        Ok(())
    }

    /// Every occupied cell in row-major order.
    pub fn stones(&self) -> impl Iterator<Item = Field> + '_ {
        let cols = self.cols;
        self.cells.iter().enumerate().filter_map(move |(i, &color)| {
            (color != Color::Empty).then(|| Field::new(i % cols, i / cols, color))
        })
    }

    fn neighbors(&self, x: usize, y: usize) -> Vec<Point> {
        let (cols, rows) = (self.cols, self.rows);
        let mut v = Vec::with_capacity(4);
        if x > 0 {
            v.push(Point::new(x - 1, y));
        }
        if x + 1 < cols {
            v.push(Point::new(x + 1, y));
        }
        if y > 0 {
            v.push(Point::new(x, y - 1));
        }
        if y + 1 < rows {
            v.push(Point::new(x, y + 1));
        }
        v
    }

    /// Whether the chain containing `(x, y)` touches at least one empty cell.
    ///
    /// Empty and out-of-range starting points have no liberties.
    pub fn has_liberties(&self, x: usize, y: usize) -> bool {
        let color = match self.get(x, y) {
            Some(Color::Empty) | None => return false,
            Some(c) => c,
        };
        let mut stack = vec![Point::new(x, y)];
        let mut visited = vec![false; self.cells.len()];
        while let Some(p) = stack.pop() {
            let i = self.idx(p.x, p.y);
            if visited[i] {
                continue;
            }
            visited[i] = true;
            for n in self.neighbors(p.x, p.y) {
                match self.cells[self.idx(n.x, n.y)] {
                    Color::Empty => return true,
                    c if c == color && !visited[self.idx(n.x, n.y)] => stack.push(n),
                    _ => {}
                }
            }
        }
        false
    }

    /// All stones of the chain containing `(x, y)`; empty for an empty or
    /// out-of-range point.
    pub fn chain(&self, x: usize, y: usize) -> Vec<Point> {
        let color = match self.get(x, y) {
            Some(Color::Empty) | None => return Vec::new(),
            Some(c) => c,
        };
        let mut out = Vec::new();
        let mut stack = vec![Point::new(x, y)];
        let mut visited = vec![false; self.cells.len()];
        while let Some(p) = stack.pop() {
            let i = self.idx(p.x, p.y);
            if visited[i] {
                continue;
            }
            visited[i] = true;
            out.push(p);
            for n in self.neighbors(p.x, p.y) {
                let ni = self.idx(n.x, n.y);
                if !visited[ni] && self.cells[ni] == color {
                    stack.push(n);
                }
            }
        }
        out
    }

    /// Empties the chain containing `(x, y)` and returns its size.
    pub fn remove_chain(&mut self, x: usize, y: usize) -> usize {
        let chain = self.chain(x, y);
        for p in &chain {
            let i = self.idx(p.x, p.y);
            self.cells[i] = Color::Empty;
        }
        chain.len()
    }

    /// Places a stone and resolves captures.
    ///
    /// Opponent chains left without liberties are removed first. If none
    /// were removed and the new stone's own chain has no liberties, that
    /// whole chain is removed and the move reports [`Placement::Suicide`].
    /// Whether a suicide is acceptable is for the ruleset to decide.
    pub fn make_move(&mut self, x: usize, y: usize, color: Color) -> Placement {
        if color == Color::Empty || self.get(x, y) != Some(Color::Empty) {
            return Placement::Illegal;
        }
        let idx = self.idx(x, y);
        self.cells[idx] = color;

        let opp = color.opposite();
        let mut captured = 0;
        for n in self.neighbors(x, y) {
            if self.get(n.x, n.y) == Some(opp) && !self.has_liberties(n.x, n.y) {
                captured += self.remove_chain(n.x, n.y);
            }
        }

        if captured == 0 && !self.has_liberties(x, y) {
            return Placement::Suicide(self.remove_chain(x, y));
        }
        Placement::Captured(captured)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.rows {
            for x in 0..self.cols {
                let ch = match self.cells[self.idx(x, y)] {
                    Color::Black => 'X',
                    Color::White => 'O',
                    Color::Empty => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(size: usize, black: &[(usize, usize)], white: &[(usize, usize)]) -> Board {
        let mut board = Board::square(size);
        for &(x, y) in black {
            board.set(x, y, Color::Black).unwrap();
        }
        for &(x, y) in white {
            board.set(x, y, Color::White).unwrap();
        }
        board
    }

    #[test]
    fn test_get_out_of_range() {
        let board = Board::new(9, 5);
        assert_eq!(board.get(8, 4), Some(Color::Empty));
        assert_eq!(board.get(9, 0), None);
        assert_eq!(board.get(0, 5), None);
        assert!(!board.has(9, 4));
    }

    #[test]
    fn test_set_out_of_range() {
        let mut board = Board::square(9);
        assert_eq!(
            board.set(9, 9, Color::Black),
            Err(GoError::OutOfRange { x: 9, y: 9 })
        );
    }

    #[test]
    fn test_clone_does_not_alias() {
        let mut board = Board::square(9);
        board.set(4, 4, Color::Black).unwrap();
        let copy = board.clone();
        board.set(4, 4, Color::White).unwrap();
        board.set(0, 0, Color::Black).unwrap();
        assert_eq!(copy.get(4, 4), Some(Color::Black));
        assert_eq!(copy.get(0, 0), Some(Color::Empty));
    }

    #[test]
    fn test_equality() {
        let a = board_with(9, &[(2, 2)], &[(3, 3)]);
        assert_eq!(a, a.clone());

        let mut b = a.clone();
        b.set(8, 8, Color::White).unwrap();
        assert_ne!(a, b);

        assert_ne!(Board::new(9, 9), Board::new(9, 10));
        assert_ne!(Board::new(6, 4), Board::new(4, 6));
    }

    #[test]
    fn test_liberties() {
        let board = board_with(5, &[(0, 0), (1, 0)], &[(2, 0), (0, 1)]);
        assert!(board.has_liberties(0, 0));
        assert!(!board.has_liberties(2, 2));
        assert!(!board.has_liberties(7, 7));

        let surrounded = board_with(5, &[(0, 0), (1, 0)], &[(2, 0), (0, 1), (1, 1)]);
        assert!(!surrounded.has_liberties(1, 0));
    }

    #[test]
    fn test_remove_chain() {
        let mut board = board_with(9, &[(3, 3), (3, 4), (4, 4)], &[(5, 5)]);
        assert_eq!(board.remove_chain(3, 3), 3);
        assert_eq!(board.get(4, 4), Some(Color::Empty));
        assert_eq!(board.get(5, 5), Some(Color::White));
        assert_eq!(board.remove_chain(0, 0), 0);
    }

    #[test]
    fn test_make_move_capture() {
        let mut board = board_with(9, &[(0, 1), (1, 0), (2, 1)], &[(1, 1)]);
        assert_eq!(board.make_move(1, 2, Color::Black), Placement::Captured(1));
        assert_eq!(board.get(1, 1), Some(Color::Empty));
        assert_eq!(board.get(1, 2), Some(Color::Black));
    }

    #[test]
    fn test_make_move_occupied() {
        let mut board = board_with(9, &[(4, 4)], &[]);
        assert_eq!(board.make_move(4, 4, Color::White), Placement::Illegal);
        assert_eq!(board.make_move(9, 0, Color::White), Placement::Illegal);
        assert_eq!(board.make_move(0, 0, Color::Empty), Placement::Illegal);
        assert_eq!(Placement::Illegal.signed(), None);
    }

    #[test]
    fn test_make_move_suicide() {
        // Two black stones in the corner, fully enclosed by white except (0,0).
        let mut board = board_with(9, &[(1, 0)], &[(2, 0), (1, 1), (0, 1)]);
        let result = board.make_move(0, 0, Color::Black);
        assert_eq!(result, Placement::Suicide(2));
        assert_eq!(result.signed(), Some(-2));
        assert_eq!(board.get(0, 0), Some(Color::Empty));
        assert_eq!(board.get(1, 0), Some(Color::Empty));
    }

    #[test]
    fn test_capture_prevents_suicide() {
        // Black at (0,0) has no liberty of its own but captures (1,0).
        let mut board = board_with(9, &[(2, 0), (1, 1)], &[(1, 0), (0, 1)]);
        assert_eq!(board.make_move(0, 0, Color::Black), Placement::Captured(1));
        assert!(board.has_liberties(0, 0));
    }

    #[test]
    fn test_multiple_chains_captured() {
        let mut board = board_with(9, &[(0, 1), (3, 0), (2, 1)], &[(0, 0), (2, 0)]);
        assert_eq!(board.make_move(1, 0, Color::Black), Placement::Captured(2));
    }

    #[test]
    fn test_display() {
        let board = board_with(3, &[(0, 0)], &[(2, 2)]);
        assert_eq!(board.to_string(), "X . . \n. . . \n. . O \n");
    }

    #[test]
    fn test_stones() {
        let board = board_with(3, &[(1, 0)], &[(0, 2)]);
        let stones: Vec<Field> = board.stones().collect();
        assert_eq!(
            stones,
            vec![Field::new(1, 0, Color::Black), Field::new(0, 2, Color::White)]
        );
    }
}
