//! Rebuilding a game from a record.
//!
//! The root's setup stones are placed in ply 0. Every later node that adds
//! setup stones or carries a move starts a new ply; nodes holding only
//! comments or markup leave the game as it is. A `PL` property is applied
//! last and overrides the player the move left to play.

use tracing::{debug, warn};

use crate::error::{GoError, Result};
use crate::game::{Game, Move};
use crate::path::Path;
use crate::properties::GameInfo;
use crate::record::{Node, RecordTree};
use crate::rules::Rules;

impl Game {
    /// A fresh game configured from the root properties of a record.
    ///
    /// Unknown `RU` values fall back to the default ruleset.
    pub fn from_info(info: &GameInfo) -> Self {
        let (cols, rows) = info.board_size();
        let rules = match info.rules.as_deref().map(str::parse::<Rules>) {
            None => Rules::default(),
            Some(Ok(rules)) => rules,
            Some(Err(err)) => {
                warn!(%err, "falling back to {}", Rules::default());
                Rules::default()
            }
        };
        let mut game = Game::with_handicap(cols, rows, rules, info.handicap.unwrap_or(0));
        if let Some(komi) = info.komi {
            game.set_komi(komi);
        }
        game
    }

    /// Applies the content of a non-root node.
    ///
    /// With `strict`, a move the rules forbid fails with
    /// `GoError::InvalidMove`; otherwise it is placed regardless. On error
    /// the game is left as it was before the call.
    pub fn apply_node(&mut self, node: &Node, strict: bool) -> Result<()> {
        self.apply(node, strict, false)
    }

    fn apply(&mut self, node: &Node, strict: bool, in_place: bool) -> Result<()> {
        let ply_started = !in_place && !node.setup().is_empty();
        if ply_started {
            self.next();
        }
        let result = self.apply_content(node, strict, ply_started);
        if result.is_err() && ply_started {
            self.previous();
        }
        result
    }

    fn apply_content(&mut self, node: &Node, strict: bool, ply_started: bool) -> Result<()> {
        for field in node.setup() {
            self.set_stone(field.point.x, field.point.y, field.color)?;
        }

        if let Some(mv) = &node.mv {
            if let Move::Play { point, color } = *mv
                && strict
                && !self.is_valid(mv)
            {
                return Err(GoError::InvalidMove {
                    x: point.x,
                    y: point.y,
                    color,
                });
            }
            if !ply_started {
                self.next();
            }
            let placement = self.make_move(mv);
            debug!(ply = self.move_number(), color = %mv.color(), ?placement, "replayed");
        }

        if let Some(turn) = node.turn {
            self.set_player(turn);
        }
        Ok(())
    }
}

/// Replays `tree` from the root down to the node at `path`.
///
/// # Errors
/// `GoError::PathNotFound` if `path` names no node; `GoError::InvalidMove`
/// in `strict` mode when a move on the way is illegal.
pub fn replay(tree: &RecordTree, path: &Path, strict: bool) -> Result<Game> {
    let missing = || GoError::PathNotFound {
        move_number: path.move_number,
        variations: path.variations.clone(),
    };

    let mut game = Game::from_info(&tree.info);
    game.apply(&tree.root, strict, true)?;

    let mut variations = path.variations.iter();
    let mut node = &tree.root;
    for _ in 0..path.move_number {
        let i = match node.children.len() {
            0 => return Err(missing()),
            1 => 0,
            _ => *variations.next().ok_or_else(missing)?,
        };
        node = node.children.get(i).ok_or_else(missing)?;
        game.apply_node(node, strict)?;
    }
    if variations.next().is_some() {
        return Err(missing());
    }

    debug!(
        depth = path.move_number,
        ply = game.move_number(),
        rules = %game.rules(),
        "replay done"
    );
    Ok(game)
}

/// Replays the main line to its last node.
pub fn replay_main_line(tree: &RecordTree, strict: bool) -> Result<Game> {
    let mut depth = 0;
    let mut node = &tree.root;
    while let Some(child) = node.children.first() {
        node = child;
        depth += 1;
    }
    let path = tree.main_line(depth).unwrap_or_default();
    replay(tree, &path, strict)
}
