//! SGF text reader and writer.
//!
//! This layer knows only the syntax: a collection of game trees, each a
//! sequence of nodes followed by variations, each node a list of properties
//! with one or more bracketed values. Property meanings live in
//! [`crate::properties`].
//!
//! ```text
//! Collection = GameTree { GameTree }
//! GameTree   = "(" Sequence { GameTree } ")"
//! Sequence   = Node { Node }
//! Node       = ";" { Property }
//! Property   = Code Value { Value }
//! Value      = "[" text "]"
//! ```
//!
//! Inside a value only `\]` and `\\` are escapes; any other backslash is
//! kept as is. Line breaks (`\r\n`, `\r`) are normalized to `\n`.

use tracing::debug;

use crate::error::{GoError, Result};

/// A property code with its raw (unescaped) values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Property {
    pub code: String,
    pub values: Vec<String>,
}

impl Property {
    pub fn new(code: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            code: code.into(),
            values,
        }
    }
}

/// A node: its properties in source order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SgfNode {
    pub properties: Vec<Property>,
}

/// A sequence of nodes followed by zero or more variations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameTree {
    pub sequence: Vec<SgfNode>,
    pub variations: Vec<GameTree>,
}

pub type Collection = Vec<GameTree>;

/// Parses a whole collection. Fails without a partial result.
pub fn parse_collection(text: &str) -> Result<Collection> {
    let mut parser = Parser::new(text);
    let collection = parser.collection()?;
    debug!(trees = collection.len(), "parsed SGF collection");
    Ok(collection)
}

/// Writes a collection, one game tree per line.
pub fn write_collection(collection: &[GameTree]) -> String {
    let mut out = String::new();
    for tree in collection {
        write_tree(tree, &mut out);
        out.push('\n');
    }
    out
}

fn write_tree(tree: &GameTree, out: &mut String) {
    out.push('(');
    for node in &tree.sequence {
        write_node(node, out);
    }
    for variation in &tree.variations {
        out.push('\n');
        write_tree(variation, out);
    }
    out.push(')');
}

fn write_node(node: &SgfNode, out: &mut String) {
    out.push(';');
    for prop in &node.properties {
        out.push_str(&prop.code);
        for value in &prop.values {
            out.push('[');
            out.push_str(&escape(value));
            out.push(']');
        }
    }
}

/// Escapes `\` and `]` for use inside a bracketed value.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '\\' || c == ']' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

struct Parser<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn error(&self, message: impl Into<String>) -> GoError {
        GoError::Syntax {
            line: self.line,
            column: self.column,
            message: message.into(),
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn collection(&mut self) -> Result<Collection> {
        let mut trees = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some('(') => trees.push(self.game_tree()?),
                Some(c) => {
                    return Err(self.error(format!("unexpected {c:?} outside of a game tree")));
                }
            }
        }
        if trees.is_empty() {
            return Err(self.error("expected at least one game tree"));
        }
        Ok(trees)
    }

    fn game_tree(&mut self) -> Result<GameTree> {
        self.bump(); // '('
        let mut sequence = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(';') => sequence.push(self.node()?),
                Some('(') | Some(')') | None => break,
                Some(c) => {
                    return Err(self.error(format!("expected ';' to start a node, found {c:?}")));
                }
            }
        }
        if sequence.is_empty() {
            return Err(self.error("game tree without nodes"));
        }

        let mut variations = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('(') => variations.push(self.game_tree()?),
                Some(')') => {
                    self.bump();
                    break;
                }
                Some(c) => {
                    let message = format!("expected ')' to close the game tree, found {c:?}");
                    return Err(self.error(message));
                }
                None => {
                    return Err(self.error("unexpected end of input: game tree not closed by ')'"));
                }
            }
        }
        Ok(GameTree {
            sequence,
            variations,
        })
    }

    fn node(&mut self) -> Result<SgfNode> {
        self.bump(); // ';'
        let mut node = SgfNode::default();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(c) if c.is_ascii_alphabetic() => node.properties.push(self.property()?),
                _ => break,
            }
        }
        Ok(node)
    }

    fn property(&mut self) -> Result<Property> {
        let mut code = String::new();
        let mut raw = String::new();
        while let Some(c) = self.peek().filter(char::is_ascii_alphabetic) {
            self.bump();
            raw.push(c);
            // Lowercase letters in a code are FF[3] decoration (`CoPyright`).
            if c.is_ascii_uppercase() {
                code.push(c);
            }
        }
        if code.is_empty() {
            return Err(self.error(format!("property code {raw:?} has no uppercase letter")));
        }

        let mut values = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() != Some('[') {
                break;
            }
            values.push(self.value()?);
        }
        if values.is_empty() {
            return Err(self.error(format!("property {code} has no values")));
        }
        Ok(Property { code, values })
    }

    fn value(&mut self) -> Result<String> {
        let (line, column) = (self.line, self.column);
        self.bump(); // '['
        let mut value = String::new();
        loop {
            match self.bump() {
                Some(']') => return Ok(value),
                Some('\\') => match self.peek() {
                    Some(c @ (']' | '\\')) => {
                        self.bump();
                        value.push(c);
                    }
                    _ => value.push('\\'),
                },
                Some('\r') => {
                    if self.peek() == Some('\n') {
                        self.bump();
                    }
                    value.push('\n');
                }
                Some(c) => value.push(c),
                None => {
                    return Err(GoError::Syntax {
                        line,
                        column,
                        message: "unterminated value".to_string(),
                    });
                }
            }
        }
    }
}
