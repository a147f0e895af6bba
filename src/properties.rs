//! Property descriptors: how SGF codes map onto typed record fields.
//!
//! A [`Registry`] holds two ordered descriptor lists, one for tree-level
//! game information ([`GameInfo`], read from the root node only) and one for
//! per-node fields ([`Node`]). The list order is the order properties are
//! written in. Callers can register further codes; registered descriptors
//! are never replaced.

use std::fmt::Display;
use std::str::FromStr;

use tracing::warn;

use crate::board::{Color, Field, Point};
use crate::constants::{DEFAULT_BOARD_SIZE, MAX_BOARD_SIZE};
use crate::error::{GoError, Result};
use crate::game::Move;
use crate::record::{LineKind, Markup, Node, Shape};

// =============================================================================
// Game Information
// =============================================================================

/// Tree-level metadata, stored apart from the root node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GameInfo {
    /// `FF`
    pub file_format: Option<u32>,
    /// `GM`
    pub game: Option<u32>,
    /// `CA`
    pub charset: Option<String>,
    /// `AP`
    pub application: Option<String>,
    /// `SZ` as `(cols, rows)`.
    pub size: Option<(usize, usize)>,
    pub komi: Option<f64>,
    pub handicap: Option<usize>,
    /// `RU`, the ruleset name as written.
    pub rules: Option<String>,
    pub black_player: Option<String>,
    pub black_rank: Option<String>,
    pub black_team: Option<String>,
    pub white_player: Option<String>,
    pub white_rank: Option<String>,
    pub white_team: Option<String>,
    pub result: Option<String>,
    /// `TM`, main time in seconds.
    pub time_limit: Option<f64>,
    /// `OT`
    pub overtime: Option<String>,
    pub game_name: Option<String>,
    pub event: Option<String>,
    pub date: Option<String>,
    pub place: Option<String>,
    pub round: Option<String>,
    pub game_comment: Option<String>,
    pub annotator: Option<String>,
    pub source: Option<String>,
    pub copyright: Option<String>,
    pub user: Option<String>,
}

impl GameInfo {
    /// Board dimensions, defaulting to 19×19.
    pub fn board_size(&self) -> (usize, usize) {
        self.size.unwrap_or((DEFAULT_BOARD_SIZE, DEFAULT_BOARD_SIZE))
    }
}

// =============================================================================
// Coordinates
// =============================================================================

fn letter(n: usize) -> Option<char> {
    match n {
        0..26 => Some((b'a' + n as u8) as char),
        26..52 => Some((b'A' + (n - 26) as u8) as char),
        _ => None,
    }
}

fn letter_value(c: char) -> Option<usize> {
    match c {
        'a'..='z' => Some(c as usize - 'a' as usize),
        'A'..='Z' => Some(c as usize - 'A' as usize + 26),
        _ => None,
    }
}

/// Two-letter SGF code of a point, e.g. `(2, 3)` → `"cd"`.
///
/// Coordinates beyond the 52 letters an SGF code can express are clamped to
/// the last letter.
pub fn encode_point(point: Point) -> String {
    let last = MAX_BOARD_SIZE - 1;
    let x = letter(point.x.min(last)).unwrap_or('Z');
    let y = letter(point.y.min(last)).unwrap_or('Z');
    format!("{x}{y}")
}

/// Reads a two-letter point code.
pub fn decode_point(code: &str, value: &str) -> Result<Point> {
    let invalid = || GoError::InvalidProperty {
        code: code.to_string(),
        value: value.to_string(),
    };
    let mut chars = value.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(x), Some(y), None) => Ok(Point::new(
            letter_value(x).ok_or_else(invalid)?,
            letter_value(y).ok_or_else(invalid)?,
        )),
        _ => Err(invalid()),
    }
}

/// Reads a point list, expanding compressed rectangles such as `aa:cc`.
pub fn decode_point_list(code: &str, values: &[String]) -> Result<Vec<Point>> {
    let mut points = Vec::new();
    for value in values {
        match value.split_once(':') {
            Some((a, b)) => {
                let (a, b) = (decode_point(code, a)?, decode_point(code, b)?);
                for y in a.y.min(b.y)..=a.y.max(b.y) {
                    for x in a.x.min(b.x)..=a.x.max(b.x) {
                        points.push(Point::new(x, y));
                    }
                }
            }
            None => points.push(decode_point(code, value)?),
        }
    }
    Ok(points)
}

fn decode_pair(code: &str, value: &str) -> Result<(Point, Point)> {
    let (a, b) = value.split_once(':').ok_or_else(|| GoError::InvalidProperty {
        code: code.to_string(),
        value: value.to_string(),
    })?;
    Ok((decode_point(code, a)?, decode_point(code, b)?))
}

fn decode_color(code: &str, value: &str) -> Result<Color> {
    match value.trim() {
        "B" | "b" => Ok(Color::Black),
        "W" | "w" => Ok(Color::White),
        _ => Err(GoError::InvalidProperty {
            code: code.to_string(),
            value: value.to_string(),
        }),
    }
}

fn decode_size(code: &str, value: &str) -> Result<(usize, usize)> {
    let invalid = || GoError::InvalidProperty {
        code: code.to_string(),
        value: value.to_string(),
    };
    let parse = |s: &str| {
        s.trim()
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=MAX_BOARD_SIZE).contains(n))
            .ok_or_else(invalid)
    };
    match value.split_once(':') {
        Some((cols, rows)) => Ok((parse(cols)?, parse(rows)?)),
        None => {
            let size = parse(value)?;
            Ok((size, size))
        }
    }
}

fn encode_size(&(cols, rows): &(usize, usize)) -> String {
    if cols == rows {
        cols.to_string()
    } else {
        format!("{cols}:{rows}")
    }
}

// =============================================================================
// Descriptors
// =============================================================================

type ReadFn<T> = dyn Fn(&T) -> Vec<String> + Send + Sync;
type WriteFn<T> = dyn Fn(&mut T, &[String]) -> Result<()> + Send + Sync;

/// Maps one property code onto a target type.
///
/// `read` returns the values to write out; an empty list means the property
/// is absent. `write` receives every value given for the code in one node.
pub struct Descriptor<T> {
    code: String,
    read: Box<ReadFn<T>>,
    write: Box<WriteFn<T>>,
}

impl<T> Descriptor<T> {
    pub fn new(
        code: impl Into<String>,
        read: impl Fn(&T) -> Vec<String> + Send + Sync + 'static,
        write: impl Fn(&mut T, &[String]) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            code: code.into(),
            read: Box::new(read),
            write: Box::new(write),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn read(&self, target: &T) -> Vec<String> {
        (self.read)(target)
    }

    pub fn write(&self, target: &mut T, values: &[String]) -> Result<()> {
        (self.write)(target, values)
    }
}

impl<T> std::fmt::Debug for Descriptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Descriptor").field("code", &self.code).finish()
    }
}

/// A single-valued optional field. Only the first value is kept.
fn scalar<T: 'static, V: 'static>(
    code: &'static str,
    get: fn(&T) -> &Option<V>,
    get_mut: fn(&mut T) -> &mut Option<V>,
    encode: fn(&V) -> String,
    decode: fn(&str, &str) -> Result<V>,
) -> Descriptor<T> {
    Descriptor::new(
        code,
        move |t: &T| get(t).iter().map(encode).collect(),
        move |t: &mut T, values: &[String]| {
            let value = values.first().map(String::as_str).unwrap_or_default();
            if values.len() > 1 {
                warn!(code, dropped = values.len() - 1, "extra values ignored");
            }
            *get_mut(t) = Some(decode(code, value)?);
            Ok(())
        },
    )
}

fn text<T: 'static>(
    code: &'static str,
    get: fn(&T) -> &Option<String>,
    get_mut: fn(&mut T) -> &mut Option<String>,
) -> Descriptor<T> {
    scalar(code, get, get_mut, String::clone, |_, v| Ok(v.to_string()))
}

fn number<T: 'static, V: FromStr + Display + 'static>(
    code: &'static str,
    get: fn(&T) -> &Option<V>,
    get_mut: fn(&mut T) -> &mut Option<V>,
) -> Descriptor<T> {
    scalar(code, get, get_mut, V::to_string, |code, v| {
        v.trim().parse().map_err(|_| GoError::InvalidProperty {
            code: code.to_string(),
            value: v.to_string(),
        })
    })
}

fn move_descriptor(code: &'static str, color: Color) -> Descriptor<Node> {
    Descriptor::new(
        code,
        move |node: &Node| match node.mv {
            Some(Move::Play { point, color: c }) if c == color => vec![encode_point(point)],
            Some(Move::Pass { color: c }) if c == color => vec![String::new()],
            _ => Vec::new(),
        },
        move |node: &mut Node, values: &[String]| {
            let value = values.first().map(String::as_str).unwrap_or_default();
            node.mv = Some(if value.is_empty() {
                Move::Pass { color }
            } else {
                Move::Play {
                    point: decode_point(code, value)?,
                    color,
                }
            });
            Ok(())
        },
    )
}

fn setup_descriptor(code: &'static str, color: Color) -> Descriptor<Node> {
    Descriptor::new(
        code,
        move |node: &Node| {
            node.setup()
                .iter()
                .filter(|f| f.color == color)
                .map(|f| encode_point(f.point))
                .collect()
        },
        move |node: &mut Node, values: &[String]| {
            for point in decode_point_list(code, values)? {
                node.add_setup(Field { point, color });
            }
            Ok(())
        },
    )
}

fn shape_descriptor(code: &'static str, shape: Shape) -> Descriptor<Node> {
    Descriptor::new(
        code,
        move |node: &Node| {
            node.markup()
                .iter()
                .filter_map(|m| match m {
                    Markup::Shape { shape: s, point } if *s == shape => Some(encode_point(*point)),
                    _ => None,
                })
                .collect()
        },
        move |node: &mut Node, values: &[String]| {
            for point in decode_point_list(code, values)? {
                node.add_markup(Markup::Shape { shape, point });
            }
            Ok(())
        },
    )
}

fn line_descriptor(code: &'static str, kind: LineKind) -> Descriptor<Node> {
    Descriptor::new(
        code,
        move |node: &Node| {
            node.markup()
                .iter()
                .filter_map(|m| match m {
                    Markup::Line { kind: k, from, to } if *k == kind => {
                        Some(format!("{}:{}", encode_point(*from), encode_point(*to)))
                    }
                    _ => None,
                })
                .collect()
        },
        move |node: &mut Node, values: &[String]| {
            for value in values {
                let (from, to) = decode_pair(code, value)?;
                node.add_markup(Markup::Line { kind, from, to });
            }
            Ok(())
        },
    )
}

fn label_descriptor() -> Descriptor<Node> {
    Descriptor::new(
        "LB",
        |node: &Node| {
            node.markup()
                .iter()
                .filter_map(|m| match m {
                    Markup::Label { point, text } => {
                        Some(format!("{}:{text}", encode_point(*point)))
                    }
                    _ => None,
                })
                .collect()
        },
        |node: &mut Node, values: &[String]| {
            for value in values {
                let (point, text) = value.split_once(':').ok_or_else(|| GoError::InvalidProperty {
                    code: "LB".to_string(),
                    value: value.clone(),
                })?;
                node.add_markup(Markup::Label {
                    point: decode_point("LB", point)?,
                    text: text.to_string(),
                });
            }
            Ok(())
        },
    )
}

fn dimmed_descriptor() -> Descriptor<Node> {
    Descriptor::new(
        "DD",
        |node: &Node| match &node.dimmed {
            None => Vec::new(),
            Some(points) if points.is_empty() => vec![String::new()],
            Some(points) => points.iter().copied().map(encode_point).collect(),
        },
        |node: &mut Node, values: &[String]| {
            let listed: Vec<String> = values.iter().filter(|v| !v.is_empty()).cloned().collect();
            node.dimmed = Some(decode_point_list("DD", &listed)?);
            Ok(())
        },
    )
}

// =============================================================================
// Registry
// =============================================================================

/// The set of property codes the record layer interprets.
#[derive(Debug)]
pub struct Registry {
    info: Vec<Descriptor<GameInfo>>,
    node: Vec<Descriptor<Node>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}

impl Registry {
    /// A registry that knows no codes; everything is kept verbatim.
    pub fn empty() -> Self {
        Self {
            info: Vec::new(),
            node: Vec::new(),
        }
    }

    /// The standard Go properties of SGF FF[4].
    pub fn standard() -> Self {
        let info = vec![
            number("FF", |i: &GameInfo| &i.file_format, |i: &mut GameInfo| &mut i.file_format),
            number("GM", |i: &GameInfo| &i.game, |i: &mut GameInfo| &mut i.game),
            text("CA", |i: &GameInfo| &i.charset, |i: &mut GameInfo| &mut i.charset),
            text("AP", |i: &GameInfo| &i.application, |i: &mut GameInfo| &mut i.application),
            scalar(
                "SZ",
                |i: &GameInfo| &i.size,
                |i: &mut GameInfo| &mut i.size,
                encode_size,
                decode_size,
            ),
            number("KM", |i: &GameInfo| &i.komi, |i: &mut GameInfo| &mut i.komi),
            number("HA", |i: &GameInfo| &i.handicap, |i: &mut GameInfo| &mut i.handicap),
            text("RU", |i: &GameInfo| &i.rules, |i: &mut GameInfo| &mut i.rules),
            text("PB", |i: &GameInfo| &i.black_player, |i: &mut GameInfo| &mut i.black_player),
            text("BR", |i: &GameInfo| &i.black_rank, |i: &mut GameInfo| &mut i.black_rank),
            text("BT", |i: &GameInfo| &i.black_team, |i: &mut GameInfo| &mut i.black_team),
            text("PW", |i: &GameInfo| &i.white_player, |i: &mut GameInfo| &mut i.white_player),
            text("WR", |i: &GameInfo| &i.white_rank, |i: &mut GameInfo| &mut i.white_rank),
            text("WT", |i: &GameInfo| &i.white_team, |i: &mut GameInfo| &mut i.white_team),
            text("RE", |i: &GameInfo| &i.result, |i: &mut GameInfo| &mut i.result),
            number("TM", |i: &GameInfo| &i.time_limit, |i: &mut GameInfo| &mut i.time_limit),
            text("OT", |i: &GameInfo| &i.overtime, |i: &mut GameInfo| &mut i.overtime),
            text("GN", |i: &GameInfo| &i.game_name, |i: &mut GameInfo| &mut i.game_name),
            text("EV", |i: &GameInfo| &i.event, |i: &mut GameInfo| &mut i.event),
            text("DT", |i: &GameInfo| &i.date, |i: &mut GameInfo| &mut i.date),
            text("PC", |i: &GameInfo| &i.place, |i: &mut GameInfo| &mut i.place),
            text("RO", |i: &GameInfo| &i.round, |i: &mut GameInfo| &mut i.round),
            text("GC", |i: &GameInfo| &i.game_comment, |i: &mut GameInfo| &mut i.game_comment),
            text("AN", |i: &GameInfo| &i.annotator, |i: &mut GameInfo| &mut i.annotator),
            text("SO", |i: &GameInfo| &i.source, |i: &mut GameInfo| &mut i.source),
            text("CP", |i: &GameInfo| &i.copyright, |i: &mut GameInfo| &mut i.copyright),
            text("US", |i: &GameInfo| &i.user, |i: &mut GameInfo| &mut i.user),
        ];

        let node = vec![
            move_descriptor("B", Color::Black),
            move_descriptor("W", Color::White),
            setup_descriptor("AB", Color::Black),
            setup_descriptor("AW", Color::White),
            setup_descriptor("AE", Color::Empty),
            scalar(
                "PL",
                |n: &Node| &n.turn,
                |n: &mut Node| &mut n.turn,
                |c| c.to_string(),
                decode_color,
            ),
            text("C", |n: &Node| &n.comment, |n: &mut Node| &mut n.comment),
            text("N", |n: &Node| &n.name, |n: &mut Node| &mut n.name),
            shape_descriptor("CR", Shape::Circle),
            shape_descriptor("SQ", Shape::Square),
            shape_descriptor("TR", Shape::Triangle),
            shape_descriptor("MA", Shape::Cross),
            shape_descriptor("SL", Shape::Selected),
            label_descriptor(),
            line_descriptor("LN", LineKind::Line),
            line_descriptor("AR", LineKind::Arrow),
            dimmed_descriptor(),
            number("BL", |n: &Node| &n.black_time, |n: &mut Node| &mut n.black_time),
            number("WL", |n: &Node| &n.white_time, |n: &mut Node| &mut n.white_time),
            number("OB", |n: &Node| &n.black_periods, |n: &mut Node| &mut n.black_periods),
            number("OW", |n: &Node| &n.white_periods, |n: &mut Node| &mut n.white_periods),
        ];

        Self { info, node }
    }

    /// Whether any descriptor handles `code`.
    pub fn claims(&self, code: &str) -> bool {
        self.info_descriptor(code).is_some() || self.node_descriptor(code).is_some()
    }

    pub fn info_descriptor(&self, code: &str) -> Option<&Descriptor<GameInfo>> {
        self.info.iter().find(|d| d.code == code)
    }

    pub fn node_descriptor(&self, code: &str) -> Option<&Descriptor<Node>> {
        self.node.iter().find(|d| d.code == code)
    }

    pub fn info_descriptors(&self) -> &[Descriptor<GameInfo>] {
        &self.info
    }

    pub fn node_descriptors(&self) -> &[Descriptor<Node>] {
        &self.node
    }

    /// Adds a game-information code.
    ///
    /// # Errors
    /// `GoError::DuplicateProperty` if the code is already handled.
    pub fn register_info(&mut self, descriptor: Descriptor<GameInfo>) -> Result<()> {
        self.check_free(&descriptor.code)?;
        self.info.push(descriptor);
        Ok(())
    }

    /// Adds a per-node code.
    ///
    /// # Errors
    /// `GoError::DuplicateProperty` if the code is already handled.
    pub fn register_node(&mut self, descriptor: Descriptor<Node>) -> Result<()> {
        self.check_free(&descriptor.code)?;
        self.node.push(descriptor);
        Ok(())
    }

    fn check_free(&self, code: &str) -> Result<()> {
        if self.claims(code) {
            return Err(GoError::DuplicateProperty(code.to_string()));
        }
        Ok(())
    }
}
