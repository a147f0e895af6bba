//! Move legality under the supported rulesets.
//!
//! Every ruleset shares the same precheck (the point must be empty and the
//! simulated placement must not be a forbidden suicide) and differs only in
//! how much history it compares against to detect ko:
//!
//! | Ruleset    | Suicide   | Repetition check                               |
//! |------------|-----------|------------------------------------------------|
//! | `NoRules`  | allowed   | none                                           |
//! | `Japanese` | forbidden | simple ko: the position one ply back           |
//! | `Chinese`  | forbidden | positional superko: any earlier position       |
//! | `Ing`      | allowed   | situational superko: earlier position with the |
//! |            |           | opponent of the mover to play                  |

use std::fmt;
use std::str::FromStr;

use tracing::trace;

use crate::board::{Board, Color, Placement};
use crate::error::GoError;
use crate::game::{GameState, Move};

/// Inputs a ruleset needs to judge a move.
#[derive(Clone, Copy, Debug)]
pub struct RuleContext<'a> {
    /// State the move would be played from.
    pub state: &'a GameState,
    /// Earlier states, oldest first; the last entry is one ply back.
    pub history: &'a [GameState],
    /// Komi of the game, if known.
    pub komi: Option<f64>,
}

/// A Go ruleset, as far as move legality is concerned.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Rules {
    /// Any play on an empty point, including suicide and ko retakes.
    NoRules,
    #[default]
    Japanese,
    Chinese,
    Ing,
}

impl Rules {
    pub fn allows_suicide(self) -> bool {
        matches!(self, Rules::NoRules | Rules::Ing)
    }

    /// Whether `mv` may be played in `ctx`. Never touches `ctx.state`.
    pub fn is_valid_move(self, mv: &Move, ctx: &RuleContext<'_>) -> bool {
        let (point, color) = match *mv {
            Move::Pass { .. } => return true,
            Move::Play { point, color } => (point, color),
        };
        let Some(result) = self.simulate(point.x, point.y, color, ctx.state) else {
            return false;
        };

        let repeated = match self {
            Rules::NoRules => false,
            Rules::Japanese => ctx
                .history
                .last()
                .is_some_and(|prior| repeats(prior, &result, point.x, point.y, color)),
            Rules::Chinese => ctx
                .history
                .iter()
                .any(|prior| repeats(prior, &result, point.x, point.y, color)),
            Rules::Ing => ctx.history.iter().any(|prior| {
                prior.player == color.opposite()
                    && repeats(prior, &result, point.x, point.y, color)
            }),
        };
        if repeated {
            trace!(rules = %self, x = point.x, y = point.y, "rejected: repeated position");
        }
        !repeated
    }

    /// Plays the stone on a copy of the position; `None` if the placement
    /// itself is not allowed.
    fn simulate(self, x: usize, y: usize, color: Color, state: &GameState) -> Option<Board> {
        if state.position.get(x, y) != Some(Color::Empty) {
            trace!(rules = %self, x, y, "rejected: point not empty");
            return None;
        }
        let mut position = state.position.clone();
        match position.make_move(x, y, color) {
            Placement::Illegal => None,
            Placement::Suicide(_) if !self.allows_suicide() => {
                trace!(rules = %self, x, y, "rejected: suicide");
                None
            }
            _ => Some(position),
        }
    }
}

/// An earlier state is repeated when it held the mover's stone at the played
/// point and its position equals the simulated result.
fn repeats(prior: &GameState, result: &Board, x: usize, y: usize, color: Color) -> bool {
    prior.position.get(x, y) == Some(color) && prior.position == *result
}

impl fmt::Display for Rules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rules::NoRules => "None",
            Rules::Japanese => "Japanese",
            Rules::Chinese => "Chinese",
            Rules::Ing => "Ing",
        };
        f.write_str(name)
    }
}

impl FromStr for Rules {
    type Err = GoError;

    /// Accepts the common spellings found in the SGF `RU` property.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "free" => Ok(Rules::NoRules),
            "japanese" | "jp" | "korean" => Ok(Rules::Japanese),
            "chinese" | "cn" => Ok(Rules::Chinese),
            "ing" | "goe" => Ok(Rules::Ing),
            _ => Err(GoError::UnknownRules(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Point;

    fn state_with(size: usize, black: &[(usize, usize)], white: &[(usize, usize)]) -> GameState {
        let mut state = GameState::new(Board::square(size), Color::Black);
        for &(x, y) in black {
            state.position.set(x, y, Color::Black).unwrap();
        }
        for &(x, y) in white {
            state.position.set(x, y, Color::White).unwrap();
        }
        state
    }

    fn play(x: usize, y: usize, color: Color) -> Move {
        Move::Play {
            point: Point::new(x, y),
            color,
        }
    }

    #[test]
    fn test_pass_always_valid() {
        let state = state_with(9, &[], &[]);
        let ctx = RuleContext {
            state: &state,
            history: &[],
            komi: None,
        };
        for rules in [Rules::NoRules, Rules::Japanese, Rules::Chinese, Rules::Ing] {
            assert!(rules.is_valid_move(&Move::Pass { color: Color::Black }, &ctx));
        }
    }

    #[test]
    fn test_occupied_rejected_everywhere() {
        let state = state_with(9, &[(3, 3)], &[]);
        let ctx = RuleContext {
            state: &state,
            history: &[],
            komi: Some(6.5),
        };
        for rules in [Rules::NoRules, Rules::Japanese, Rules::Chinese, Rules::Ing] {
            assert!(!rules.is_valid_move(&play(3, 3, Color::White), &ctx));
            assert!(!rules.is_valid_move(&play(9, 3, Color::White), &ctx));
        }
    }

    #[test]
    fn test_suicide_by_ruleset() {
        let state = state_with(9, &[], &[(1, 0), (0, 1)]);
        let ctx = RuleContext {
            state: &state,
            history: &[],
            komi: None,
        };
        let mv = play(0, 0, Color::Black);
        assert!(!Rules::Japanese.is_valid_move(&mv, &ctx));
        assert!(!Rules::Chinese.is_valid_move(&mv, &ctx));
        assert!(Rules::Ing.is_valid_move(&mv, &ctx));
        assert!(Rules::NoRules.is_valid_move(&mv, &ctx));
    }

    #[test]
    fn test_validity_check_is_pure() {
        let state = state_with(9, &[(0, 1), (1, 0), (2, 1)], &[(1, 1)]);
        let before = state.clone();
        let ctx = RuleContext {
            state: &state,
            history: &[],
            komi: None,
        };
        assert!(Rules::Japanese.is_valid_move(&play(1, 2, Color::Black), &ctx));
        assert_eq!(state, before);
    }

    #[test]
    fn test_simple_ko_only_checks_one_ply() {
        // Ko shape: white at (1,1) can be taken by black at (2,1).
        let black = [(1, 0), (0, 1), (1, 2)];
        let white = [(2, 0), (3, 1), (2, 2)];
        let mut before = state_with(9, &black, &white);
        before.position.set(1, 1, Color::White).unwrap();

        let mut after = before.clone();
        assert_eq!(after.position.make_move(2, 1, Color::Black), Placement::Captured(1));
        after.player = Color::White;

        let retake = play(1, 1, Color::White);
        let history = [before.clone()];
        let ctx = RuleContext {
            state: &after,
            history: &history,
            komi: None,
        };
        assert!(!Rules::Japanese.is_valid_move(&retake, &ctx));
        assert!(!Rules::Chinese.is_valid_move(&retake, &ctx));
        assert!(!Rules::Ing.is_valid_move(&retake, &ctx));
        assert!(Rules::NoRules.is_valid_move(&retake, &ctx));

        // The same position two plies back is not simple ko.
        let filler = state_with(9, &[], &[]);
        let history = [before, filler];
        let ctx = RuleContext {
            state: &after,
            history: &history,
            komi: None,
        };
        assert!(Rules::Japanese.is_valid_move(&retake, &ctx));
        assert!(!Rules::Chinese.is_valid_move(&retake, &ctx));
    }

    #[test]
    fn test_situational_superko_checks_player() {
        let black = [(1, 0), (0, 1), (1, 2)];
        let white = [(2, 0), (3, 1), (2, 2)];
        let mut before = state_with(9, &black, &white);
        before.position.set(1, 1, Color::White).unwrap();

        let mut after = before.clone();
        after.position.make_move(2, 1, Color::Black);
        after.player = Color::White;

        // Same position, but White was to move there: not the same situation.
        let mut other_turn = before.clone();
        other_turn.player = Color::White;
        let history = [other_turn];
        let ctx = RuleContext {
            state: &after,
            history: &history,
            komi: None,
        };
        assert!(Rules::Ing.is_valid_move(&play(1, 1, Color::White), &ctx));
        assert!(!Rules::Chinese.is_valid_move(&play(1, 1, Color::White), &ctx));
    }

    #[test]
    fn test_parse_rules() {
        assert_eq!("Japanese".parse::<Rules>(), Ok(Rules::Japanese));
        assert_eq!(" chinese ".parse::<Rules>(), Ok(Rules::Chinese));
        assert_eq!("GOE".parse::<Rules>(), Ok(Rules::Ing));
        assert_eq!("None".parse::<Rules>(), Ok(Rules::NoRules));
        assert!("Tromp-Taylor".parse::<Rules>().is_err());
        assert_eq!(Rules::Ing.to_string(), "Ing");
    }
}
