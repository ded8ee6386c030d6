//! A small CSS selector engine.
//!
//! Supports what the page widgets need: type (`pre`), universal (`*`), id
//! (`#name`), class (`.card`), attribute presence and equality (`[data-x]`,
//! `[type='submit']`), descendant and child combinators, and comma lists.
//! Pseudo-classes are not supported.

use vitrine_types::error::{Result, VitrineError};

use crate::dom::{Document, NodeId};

/// A parsed selector list (`a, b c, d > e`).
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    alternatives: Vec<Complex>,
}

/// How a compound relates to the one on its left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

/// Compounds from left to right. The combinator of the first entry is
/// unused.
#[derive(Debug, Clone, PartialEq)]
struct Complex {
    parts: Vec<(Combinator, Compound)>,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttrMatch>,
}

#[derive(Debug, Clone, PartialEq)]
struct AttrMatch {
    name: String,
    value: Option<String>,
}

impl Selector {
    /// Parse a selector list.
    pub fn parse(text: &str) -> Result<Self> {
        let mut p = Parser {
            chars: text.chars().collect(),
            pos: 0,
        };
        let mut alternatives = Vec::new();
        loop {
            p.skip_ws();
            alternatives.push(p.complex()?);
            p.skip_ws();
            match p.peek() {
                Some(',') => p.pos += 1,
                None => break,
                Some(c) => return Err(p.error(&format!("unexpected '{c}'"))),
            }
        }
        Ok(Self { alternatives })
    }

    /// Whether the node is an element matched by any alternative.
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.alternatives
            .iter()
            .any(|c| matches_parts(doc, node, &c.parts))
    }
}

impl std::str::FromStr for Selector {
    type Err = VitrineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Right-to-left match of a compound chain ending at `node`.
fn matches_parts(doc: &Document, node: NodeId, parts: &[(Combinator, Compound)]) -> bool {
    let Some(((combinator, last), rest)) = parts.split_last() else {
        return false;
    };
    if !last.matches(doc, node) {
        return false;
    }
    if rest.is_empty() {
        return true;
    }
    match combinator {
        Combinator::Child => doc
            .get(node)
            .parent
            .is_some_and(|p| matches_parts(doc, p, rest)),
        Combinator::Descendant => doc.ancestors(node).any(|a| matches_parts(doc, a, rest)),
    }
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attributes.is_empty()
    }

    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(el) = doc.element(node) else {
            return false;
        };
        if let Some(tag) = &self.tag
            && el.tag.as_str() != tag.as_str()
        {
            return false;
        }
        if let Some(id) = &self.id
            && el.id() != Some(id.as_str())
        {
            return false;
        }
        if !self.classes.iter().all(|c| el.has_class(c)) {
            return false;
        }
        self.attributes.iter().all(|a| match &a.value {
            None => el.has_attribute(&a.name),
            Some(v) => el.get_attribute(&a.name) == Some(v.as_str()),
        })
    }
}

// ------------------------------------------------------------------
// Parser
// ------------------------------------------------------------------

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Skip whitespace, returning whether any was consumed.
    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn error(&self, msg: &str) -> VitrineError {
        let text: String = self.chars.iter().collect();
        VitrineError::Dom(format!("selector {text:?} at {}: {msg}", self.pos))
    }

    fn complex(&mut self) -> Result<Complex> {
        let mut parts = Vec::new();
        let mut combinator = Combinator::Descendant;
        loop {
            let compound = self.compound()?;
            parts.push((combinator, compound));
            let had_ws = self.skip_ws();
            match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_ws();
                    combinator = Combinator::Child;
                },
                Some(_) if had_ws => combinator = Combinator::Descendant,
                Some(c) => return Err(self.error(&format!("unexpected '{c}'"))),
            }
        }
        Ok(Complex { parts })
    }

    fn compound(&mut self) -> Result<Compound> {
        let mut c = Compound::default();
        let mut universal = false;
        loop {
            match self.peek() {
                Some('*') => {
                    self.pos += 1;
                    universal = true;
                },
                Some(ch) if ch.is_ascii_alphabetic() => {
                    c.tag = Some(self.ident()?.to_ascii_lowercase());
                },
                Some('#') => {
                    self.pos += 1;
                    c.id = Some(self.ident()?);
                },
                Some('.') => {
                    self.pos += 1;
                    c.classes.push(self.ident()?);
                },
                Some('[') => {
                    self.pos += 1;
                    c.attributes.push(self.attribute()?);
                },
                _ => break,
            }
        }
        if c.is_empty() && !universal {
            return Err(self.error("expected a selector"));
        }
        Ok(c)
    }

    fn ident(&mut self) -> Result<String> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected an identifier"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn attribute(&mut self) -> Result<AttrMatch> {
        self.skip_ws();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_ws();
        let value = match self.peek() {
            Some('=') => {
                self.pos += 1;
                self.skip_ws();
                let v = match self.peek() {
                    Some(q @ ('"' | '\'')) => {
                        self.pos += 1;
                        let start = self.pos;
                        while self.peek().is_some_and(|c| c != q) {
                            self.pos += 1;
                        }
                        if self.peek().is_none() {
                            return Err(self.error("unterminated string"));
                        }
                        let v: String = self.chars[start..self.pos].iter().collect();
                        self.pos += 1;
                        v
                    },
                    _ => self.ident()?,
                };
                self.skip_ws();
                Some(v)
            },
            _ => None,
        };
        if self.peek() != Some(']') {
            return Err(self.error("expected ']'"));
        }
        self.pos += 1;
        Ok(AttrMatch { name, value })
    }
}
