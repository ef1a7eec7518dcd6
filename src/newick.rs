//! Newick reader for Clustal Omega guide trees.
//!
//! Unlabelled internal nodes are named after their children joined with `|`,
//! so `((a:0.1,b:0.2):0.05,c:0.3);` yields a root called `a|b|c` with an
//! inner node `a|b`. Branch lengths become node scores.

use crate::error::{ReportError, Result};
use msa_protocol::{MAX_TREE_DEPTH, PhyloNode};

pub const INTERNAL_NAME_SEPARATOR: &str = "|";

pub fn parse_newick(text: &str) -> Result<PhyloNode> {
    let mut parser = NewickParser { text, pos: 0 };
    let root = parser.subtree(1)?;
    parser.skip_blank()?;
    match parser.peek() {
        Some(b';') => parser.pos += 1,
        None => {}
        Some(c) => return Err(parser.error(format!("unexpected '{}'", c as char))),
    }
    parser.skip_blank()?;
    if parser.peek().is_some() {
        return Err(parser.error("trailing input after ';'"));
    }
    Ok(root)
}

struct NewickParser<'a> {
    text: &'a str,
    pos: usize,
}

impl NewickParser<'_> {
    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn error(&self, message: impl Into<String>) -> ReportError {
        ReportError::Newick {
            offset: self.pos,
            message: message.into(),
        }
    }

    /// Skips whitespace and `[...]` comments.
    fn skip_blank(&mut self) -> Result<()> {
        while let Some(c) = self.peek() {
            if c.is_ascii_whitespace() {
                self.pos += 1;
            } else if c == b'[' {
                match self.text[self.pos..].find(']') {
                    Some(close) => self.pos += close + 1,
                    None => return Err(self.error("unterminated comment")),
                }
            } else {
                break;
            }
        }
        Ok(())
    }

    fn subtree(&mut self, depth: usize) -> Result<PhyloNode> {
        if depth > MAX_TREE_DEPTH {
            return Err(self.error(format!("tree nested deeper than {MAX_TREE_DEPTH} levels")));
        }
        self.skip_blank()?;
        let mut children = vec![];
        if self.peek() == Some(b'(') {
            self.pos += 1;
            loop {
                children.push(self.subtree(depth + 1)?);
                self.skip_blank()?;
                match self.peek() {
                    Some(b',') => self.pos += 1,
                    Some(b')') => {
                        self.pos += 1;
                        break;
                    }
                    Some(c) => return Err(self.error(format!("expected ',' or ')', found '{}'", c as char))),
                    None => return Err(self.error("unbalanced '('")),
                }
            }
        }
        self.skip_blank()?;
        let label = self.label()?;
        let score = self.branch_length()?;
        let name = match label {
            Some(label) => label,
            None if !children.is_empty() => children
                .iter()
                .map(|c: &PhyloNode| c.name.as_str())
                .collect::<Vec<_>>()
                .join(INTERNAL_NAME_SEPARATOR),
            None => return Err(self.error("leaf without a name")),
        };
        Ok(PhyloNode {
            name,
            score,
            children,
        })
    }

    fn label(&mut self) -> Result<Option<String>> {
        if self.peek() == Some(b'\'') {
            return self.quoted_label().map(Some);
        }
        let start = self.pos;
        while let Some(c) = self.peek() {
            if matches!(c, b'(' | b')' | b',' | b':' | b';' | b'[') || c.is_ascii_whitespace() {
                break;
            }
            self.pos += 1;
        }
        let label = &self.text[start..self.pos];
        Ok((!label.is_empty()).then(|| label.to_string()))
    }

    // Quoted labels double a quote to escape it: 'it''s'.
    fn quoted_label(&mut self) -> Result<String> {
        self.pos += 1;
        let mut label = String::new();
        loop {
            let rest = &self.text[self.pos..];
            let Some(quote) = rest.find('\'') else {
                return Err(self.error("unterminated quoted label"));
            };
            label.push_str(&rest[..quote]);
            self.pos += quote + 1;
            if self.peek() == Some(b'\'') {
                label.push('\'');
                self.pos += 1;
            } else {
                return Ok(label);
            }
        }
    }

    fn branch_length(&mut self) -> Result<Option<f64>> {
        self.skip_blank()?;
        if self.peek() != Some(b':') {
            return Ok(None);
        }
        self.pos += 1;
        self.skip_blank()?;
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || matches!(c, b'.' | b'-' | b'+' | b'e' | b'E') {
                self.pos += 1;
            } else {
                break;
            }
        }
        let text = &self.text[start..self.pos];
        text.parse::<f64>()
            .map(Some)
            .map_err(|_| self.error(format!("invalid branch length '{text}'")))
    }
}
