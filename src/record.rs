//! Game records: typed nodes, the record tree and SGF conversion.
//!
//! A [`RecordTree`] owns the tree-level [`GameInfo`] and the root [`Node`].
//! Every node owns its children; siblings are alternative lines in
//! presentation order. Conversion to and from the generic [`crate::sgf`]
//! tree goes through a [`Registry`] of property descriptors, so codes the
//! registry does not know survive a round trip untouched.

use std::sync::LazyLock;

use tracing::debug;

use crate::board::{Color, Field, Point};
use crate::constants::PASS_THRESHOLD;
use crate::error::Result;
use crate::game::Move;
use crate::properties::{GameInfo, Registry};
use crate::sgf::{self, GameTree, Property, SgfNode};

static STANDARD: LazyLock<Registry> = LazyLock::new(Registry::standard);

/// Point markup shapes (`CR`, `SQ`, `TR`, `MA`, `SL`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    Circle,
    Square,
    Triangle,
    Cross,
    Selected,
}

/// Two-point markup kinds (`LN`, `AR`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LineKind {
    Line,
    Arrow,
}

/// A board annotation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Markup {
    Shape { shape: Shape, point: Point },
    Line { kind: LineKind, from: Point, to: Point },
    Label { point: Point, text: String },
}

impl Markup {
    /// Whether the markup sits on `point` (either end, for lines).
    pub fn touches(&self, point: Point) -> bool {
        match self {
            Markup::Shape { point: p, .. } | Markup::Label { point: p, .. } => *p == point,
            Markup::Line { from, to, .. } => *from == point || *to == point,
        }
    }
}

/// One node of a game record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Node {
    pub children: Vec<Node>,
    pub mv: Option<Move>,
    pub comment: Option<String>,
    pub name: Option<String>,
    /// Player to move after this node (`PL`).
    pub turn: Option<Color>,
    /// Dimmed points (`DD`); `Some(empty)` undims everything.
    pub dimmed: Option<Vec<Point>>,
    pub black_time: Option<f64>,
    pub white_time: Option<f64>,
    pub black_periods: Option<u32>,
    pub white_periods: Option<u32>,
    setup: Vec<Field>,
    markup: Vec<Markup>,
    custom: Vec<(String, Vec<String>)>,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_move(mv: Move) -> Self {
        Self {
            mv: Some(mv),
            ..Self::default()
        }
    }

    /// Appends a child and returns it.
    pub fn push_child(&mut self, child: Node) -> &mut Node {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Setup stones in insertion order. `Color::Empty` clears a point.
    pub fn setup(&self) -> &[Field] {
        &self.setup
    }

    pub fn setup_at(&self, point: Point) -> Option<Color> {
        self.setup.iter().find(|f| f.point == point).map(|f| f.color)
    }

    /// Adds a setup stone, replacing any earlier entry at the same point.
    pub fn add_setup(&mut self, field: Field) {
        match self.setup.iter_mut().find(|f| f.point == field.point) {
            Some(existing) => existing.color = field.color,
            None => self.setup.push(field),
        }
    }

    /// Removes the setup entry at `point`. Returns whether one existed.
    pub fn remove_setup_at(&mut self, point: Point) -> bool {
        let before = self.setup.len();
        self.setup.retain(|f| f.point != point);
        self.setup.len() != before
    }

    pub fn markup(&self) -> &[Markup] {
        &self.markup
    }

    /// Adds markup unless an identical entry is already present.
    pub fn add_markup(&mut self, markup: Markup) -> bool {
        if self.markup.contains(&markup) {
            return false;
        }
        self.markup.push(markup);
        true
    }

    pub fn remove_markup(&mut self, markup: &Markup) -> bool {
        let before = self.markup.len();
        self.markup.retain(|m| m != markup);
        self.markup.len() != before
    }

    /// Removes every markup touching `point`. Returns how many went away.
    pub fn remove_markup_at(&mut self, point: Point) -> usize {
        let before = self.markup.len();
        self.markup.retain(|m| !m.touches(point));
        before - self.markup.len()
    }

    /// Values of a property the registry does not interpret.
    pub fn custom(&self, code: &str) -> Option<&[String]> {
        self.custom
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, v)| v.as_slice())
    }

    /// Uninterpreted properties in first-seen order.
    pub fn custom_properties(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.custom.iter().map(|(c, v)| (c.as_str(), v.as_slice()))
    }

    /// Replaces the values stored for `code`.
    pub fn set_custom(&mut self, code: &str, values: Vec<String>) {
        match self.custom.iter_mut().find(|(c, _)| c == code) {
            Some((_, existing)) => *existing = values,
            None => self.custom.push((code.to_string(), values)),
        }
    }

    /// Appends values to those stored for `code`.
    pub fn push_custom(&mut self, code: &str, values: impl IntoIterator<Item = String>) {
        match self.custom.iter_mut().find(|(c, _)| c == code) {
            Some((_, existing)) => existing.extend(values),
            None => self
                .custom
                .push((code.to_string(), values.into_iter().collect())),
        }
    }

    pub fn remove_custom(&mut self, code: &str) -> Option<Vec<String>> {
        let i = self.custom.iter().position(|(c, _)| c == code)?;
        Some(self.custom.remove(i).1)
    }
}

/// A complete game record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordTree {
    pub info: GameInfo,
    pub root: Node,
}

impl RecordTree {
    /// An empty record for a board of the given size.
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            info: GameInfo {
                size: Some((cols, rows)),
                ..GameInfo::default()
            },
            root: Node::new(),
        }
    }

    /// Builds a record from a parsed game tree.
    pub fn from_game_tree(tree: &GameTree, registry: &Registry) -> Result<Self> {
        let mut info = GameInfo::default();
        let mut root = decode_tree(tree, Some(&mut info), registry)?;
        let (cols, rows) = info.board_size();
        if cols <= PASS_THRESHOLD && rows <= PASS_THRESHOLD {
            normalize_passes(&mut root);
        }
        Ok(Self { info, root })
    }

    /// Converts the record back into a generic game tree.
    pub fn to_game_tree(&self, registry: &Registry) -> GameTree {
        encode_tree(&self.root, Some(&self.info), registry)
    }
}

/// Parses the first game of an SGF collection.
pub fn parse(text: &str) -> Result<RecordTree> {
    let mut trees = parse_all(text)?;
    // A collection always holds at least one tree.
    Ok(trees.swap_remove(0))
}

/// Parses every game of an SGF collection.
pub fn parse_all(text: &str) -> Result<Vec<RecordTree>> {
    parse_with(text, &STANDARD)
}

pub fn parse_with(text: &str, registry: &Registry) -> Result<Vec<RecordTree>> {
    let trees = sgf::parse_collection(text)?
        .iter()
        .map(|tree| RecordTree::from_game_tree(tree, registry))
        .collect::<Result<Vec<_>>>()?;
    debug!(games = trees.len(), "decoded records");
    Ok(trees)
}

pub fn serialize(tree: &RecordTree) -> String {
    serialize_with(std::slice::from_ref(tree), &STANDARD)
}

pub fn serialize_all(trees: &[RecordTree]) -> String {
    serialize_with(trees, &STANDARD)
}

pub fn serialize_with(trees: &[RecordTree], registry: &Registry) -> String {
    let collection: Vec<GameTree> = trees.iter().map(|t| t.to_game_tree(registry)).collect();
    sgf::write_collection(&collection)
}

/// Groups a node's properties by code, keeping first-seen order.
fn merged_properties(node: &SgfNode) -> Vec<(&str, Vec<String>)> {
    let mut merged: Vec<(&str, Vec<String>)> = Vec::new();
    for prop in &node.properties {
        match merged.iter_mut().find(|(code, _)| *code == prop.code) {
            Some((_, values)) => values.extend(prop.values.iter().cloned()),
            None => merged.push((prop.code.as_str(), prop.values.clone())),
        }
    }
    merged
}

fn decode_node(
    sgf: &SgfNode,
    mut info: Option<&mut GameInfo>,
    registry: &Registry,
) -> Result<Node> {
    let mut node = Node::new();
    for (code, values) in merged_properties(sgf) {
        if let (Some(info), Some(d)) = (info.as_deref_mut(), registry.info_descriptor(code)) {
            d.write(info, &values)?;
        } else if let Some(d) = registry.node_descriptor(code) {
            d.write(&mut node, &values)?;
        } else {
            node.push_custom(code, values);
        }
    }
    Ok(node)
}

fn decode_tree(
    tree: &GameTree,
    mut info: Option<&mut GameInfo>,
    registry: &Registry,
) -> Result<Node> {
    let mut nodes = Vec::with_capacity(tree.sequence.len());
    for sgf in &tree.sequence {
        // Game info is only read from the root node.
        nodes.push(decode_node(sgf, info.take(), registry)?);
    }
    let mut tail = nodes.pop().unwrap_or_default();
    for variation in &tree.variations {
        tail.children.push(decode_tree(variation, None, registry)?);
    }
    while let Some(mut prev) = nodes.pop() {
        prev.children.push(tail);
        tail = prev;
    }
    Ok(tail)
}

/// `tt` stands for a pass on boards up to 19×19.
fn normalize_passes(root: &mut Node) {
    let tt = Point::new(PASS_THRESHOLD, PASS_THRESHOLD);
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if let Some(Move::Play { point, color }) = node.mv {
            if point == tt {
                node.mv = Some(Move::Pass { color });
            }
        }
        stack.extend(node.children.iter_mut());
    }
}

fn encode_node(node: &Node, info: Option<&GameInfo>, registry: &Registry) -> SgfNode {
    let mut properties = Vec::new();
    if let Some(info) = info {
        for d in registry.info_descriptors() {
            let values = d.read(info);
            if !values.is_empty() {
                properties.push(Property::new(d.code(), values));
            }
        }
    }
    for d in registry.node_descriptors() {
        let values = d.read(node);
        if !values.is_empty() {
            properties.push(Property::new(d.code(), values));
        }
    }
    // Info codes are only claimed on the root.
    let claimed = |code: &str| {
        registry.node_descriptor(code).is_some()
            || (info.is_some() && registry.info_descriptor(code).is_some())
    };
    for (code, values) in node.custom_properties() {
        if !claimed(code) && !values.is_empty() {
            properties.push(Property::new(code, values.to_vec()));
        }
    }
    SgfNode { properties }
}

fn encode_tree(node: &Node, info: Option<&GameInfo>, registry: &Registry) -> GameTree {
    let mut sequence = vec![encode_node(node, info, registry)];
    let mut current = node;
    while let [only] = current.children.as_slice() {
        current = only;
        sequence.push(encode_node(current, None, registry));
    }
    let variations = current
        .children
        .iter()
        .map(|child| encode_tree(child, None, registry))
        .collect();
    GameTree {
        sequence,
        variations,
    }
}
