//! # Constituency Trees
//!
//! Bracketed parse trees in the Penn Treebank notation, e.g.
//! `(S (NP (DT the) (NN dog)))`. Provides a parser from the bracket
//! string form, span extraction for scoring, and label normalization.

pub mod normalize;
pub mod score;

pub use normalize::{LabelNormalizer, LabelRule};
pub use score::{score_trees, TreeScore};

use std::fmt;

use crate::error::{Result, SintagmaError};

/// A constituency tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tree {
    /// An internal constituent with a phrase label.
    Node {
        /// Phrase label (e.g. `NP`).
        label: String,
        /// Child constituents, in surface order.
        children: Vec<Tree>,
    },
    /// A preterminal: part-of-speech tag over a surface form.
    Leaf {
        /// Part-of-speech tag.
        tag: String,
        /// Surface form.
        form: String,
    },
}

/// A labeled constituent span: label plus half-open terminal range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    /// Constituent label.
    pub label: String,
    /// Index of the first covered terminal.
    pub start: usize,
    /// One past the last covered terminal.
    pub end: usize,
}

impl Tree {
    /// Parses a bracketed tree string.
    ///
    /// # Errors
    ///
    /// [`SintagmaError::MalformedTree`] on unbalanced brackets, empty
    /// constituents, or trailing garbage.
    pub fn parse(input: &str) -> Result<Tree> {
        let chars: Vec<char> = input.chars().collect();
        let mut pos = 0usize;
        skip_whitespace(&chars, &mut pos);
        let tree = parse_node(&chars, &mut pos)?;
        skip_whitespace(&chars, &mut pos);
        if pos != chars.len() {
            return Err(SintagmaError::MalformedTree(format!(
                "trailing input after tree at character {pos}"
            )));
        }
        Ok(tree)
    }

    /// The terminals as `(tag, form)` pairs, left to right.
    pub fn terminals(&self) -> Vec<(&str, &str)> {
        let mut out = Vec::new();
        self.collect_terminals(&mut out);
        out
    }

    /// Labeled spans of every internal constituent, preterminals excluded.
    pub fn spans(&self) -> Vec<Span> {
        let mut out = Vec::new();
        self.collect_spans(0, &mut out);
        out
    }

    fn collect_terminals<'a>(&'a self, out: &mut Vec<(&'a str, &'a str)>) {
        match self {
            Tree::Leaf { tag, form } => out.push((tag, form)),
            Tree::Node { children, .. } => {
                for child in children {
                    child.collect_terminals(out);
                }
            }
        }
    }

    /// Returns the number of terminals under this node while collecting
    /// spans, so the walk stays single-pass.
    fn collect_spans(&self, start: usize, out: &mut Vec<Span>) -> usize {
        match self {
            Tree::Leaf { .. } => 1,
            Tree::Node { label, children } => {
                let mut offset = start;
                for child in children {
                    offset += child.collect_spans(offset, out);
                }
                out.push(Span {
                    label: label.clone(),
                    start,
                    end: offset,
                });
                offset - start
            }
        }
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tree::Leaf { tag, form } => write!(f, "({tag} {form})"),
            Tree::Node { label, children } => {
                write!(f, "({label}")?;
                for child in children {
                    write!(f, " {child}")?;
                }
                write!(f, ")")
            }
        }
    }
}

fn skip_whitespace(chars: &[char], pos: &mut usize) {
    while *pos < chars.len() && chars[*pos].is_whitespace() {
        *pos += 1;
    }
}

fn read_symbol(chars: &[char], pos: &mut usize) -> String {
    let start = *pos;
    while *pos < chars.len() && !chars[*pos].is_whitespace() && chars[*pos] != '(' && chars[*pos] != ')' {
        *pos += 1;
    }
    chars[start..*pos].iter().collect()
}

fn parse_node(chars: &[char], pos: &mut usize) -> Result<Tree> {
    if *pos >= chars.len() || chars[*pos] != '(' {
        return Err(SintagmaError::MalformedTree(format!(
            "expected '(' at character {pos}",
            pos = *pos
        )));
    }
    *pos += 1;
    skip_whitespace(chars, pos);

    let label = read_symbol(chars, pos);
    if label.is_empty() {
        return Err(SintagmaError::MalformedTree(format!(
            "missing constituent label at character {pos}",
            pos = *pos
        )));
    }
    skip_whitespace(chars, pos);

    if *pos < chars.len() && chars[*pos] == '(' {
        // Internal node: one or more child constituents.
        let mut children = Vec::new();
        while *pos < chars.len() && chars[*pos] == '(' {
            children.push(parse_node(chars, pos)?);
            skip_whitespace(chars, pos);
        }
        if *pos >= chars.len() || chars[*pos] != ')' {
            return Err(SintagmaError::MalformedTree(format!(
                "unbalanced brackets near character {pos}",
                pos = *pos
            )));
        }
        *pos += 1;
        Ok(Tree::Node { label, children })
    } else {
        // Preterminal: the label is a tag over a single form.
        let form = read_symbol(chars, pos);
        if form.is_empty() {
            return Err(SintagmaError::MalformedTree(format!(
                "empty constituent at character {pos}",
                pos = *pos
            )));
        }
        skip_whitespace(chars, pos);
        if *pos >= chars.len() || chars[*pos] != ')' {
            return Err(SintagmaError::MalformedTree(format!(
                "unbalanced brackets near character {pos}",
                pos = *pos
            )));
        }
        *pos += 1;
        Ok(Tree::Leaf { tag: label, form })
    }
}
