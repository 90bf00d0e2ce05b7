//! Recursive descent parser for the locator text syntax.
//!
//! ```text
//! locator   := nodes? ("outer" nodes)?
//! nodes     := node+
//! node      := "{" role name? attribute* "}"
//! role      := [a-z]+
//! name      := quoted
//! attribute := [a-z]+ ":" (value | quoted)
//! value     := [A-Za-z0-9_-]+
//! quoted    := "'" ... "'" | '"' ... '"'     backslash escapes the next char
//! ```
//!
//! Whitespace between tokens is insignificant. Escapes are resolved here,
//! so `\*` reads as a plain `*`, which is still a wildcard at either end of
//! a name: a name can't require a literal leading or trailing asterisk.

use crate::attribute::{Attribute, SupportedAttribute};
use crate::result::{SemlocError, SemlocResult};
use crate::role_map::AriaRole;
use crate::semantic_locator::{SemanticLocator, SemanticNode};

const OUTER: &str = "outer";

/// Parse a locator.
///
/// # Errors
///
/// Returns [`SemlocError::InvalidLocator`] on syntax errors, unknown roles,
/// unsupported attributes, empty input, or when a role with presentational
/// children appears before the final node.
pub fn parse(text: &str) -> SemlocResult<SemanticLocator> {
    if text.trim().is_empty() {
        return Err(SemlocError::invalid_locator("Locator is empty"));
    }
    let mut parser = Parser { text, pos: 0 };
    let (pre_outer, post_outer) = parser.locator()?;
    SemanticLocator::new(pre_outer, post_outer)
}

struct Parser<'s> {
    text: &'s str,
    /// Byte offset
    pos: usize,
}

impl<'s> Parser<'s> {
    fn locator(&mut self) -> SemlocResult<(Vec<SemanticNode>, Vec<SemanticNode>)> {
        let pre_outer = self.nodes()?;
        self.skip_whitespace();
        let post_outer = if self.rest().starts_with(OUTER) {
            self.pos += OUTER.len();
            self.skip_whitespace();
            if self.peek() != Some('{') {
                return Err(self.expected("\"{\""));
            }
            self.nodes()?
        } else {
            Vec::new()
        };
        self.skip_whitespace();
        if self.peek().is_some() {
            let expected = if post_outer.is_empty() {
                "\"{\", \"outer\" or end of input"
            } else {
                "\"{\" or end of input"
            };
            return Err(self.expected(expected));
        }
        Ok((pre_outer, post_outer))
    }

    fn nodes(&mut self) -> SemlocResult<Vec<SemanticNode>> {
        let mut nodes = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() != Some('{') {
                return Ok(nodes);
            }
            nodes.push(self.node()?);
        }
    }

    fn node(&mut self) -> SemlocResult<SemanticNode> {
        self.eat('{');
        self.skip_whitespace();

        let role_text = self.word();
        if role_text.is_empty() {
            return Err(self.expected("role"));
        }
        let role: AriaRole = role_text.parse().map_err(|_| {
            SemlocError::invalid_locator(format!(
                "Unknown role: {role_text}. Please check the ARIA specification \
                 (https://www.w3.org/TR/wai-aria-1.1/#role_definitions) for valid roles."
            ))
        })?;
        let mut node = SemanticNode::new(role);

        self.skip_whitespace();
        if matches!(self.peek(), Some('\'' | '"')) {
            let name = self.quoted()?;
            node = node.with_name(name);
        }

        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('}') => {
                    self.eat('}');
                    return Ok(node);
                }
                Some(c) if c.is_ascii_lowercase() => {
                    node = node.with_attribute(self.attribute()?);
                }
                _ => return Err(self.expected("\"}\" or attribute")),
            }
        }
    }

    fn attribute(&mut self) -> SemlocResult<Attribute> {
        let name_text = self.word();
        let name: SupportedAttribute = name_text.parse().map_err(|unsupported: String| {
            SemlocError::invalid_locator(format!(
                "Unsupported attribute: {unsupported}. Supported attributes: {}",
                SupportedAttribute::supported_list()
            ))
        })?;
        self.skip_whitespace();
        if self.peek() != Some(':') {
            return Err(self.expected("\":\""));
        }
        self.eat(':');
        self.skip_whitespace();

        let value = if matches!(self.peek(), Some('\'' | '"')) {
            self.quoted()?
        } else {
            let value = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
            if value.is_empty() {
                return Err(self.expected("attribute value"));
            }
            value.to_string()
        };
        Ok(Attribute::new(name, value))
    }

    fn quoted(&mut self) -> SemlocResult<String> {
        let Some(quote) = self.peek() else {
            return Err(self.expected("quoted string"));
        };
        self.eat(quote);
        let text = self.text;
        let mut value = String::new();
        let mut chars = text[self.pos..].char_indices();
        while let Some((offset, c)) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some((_, escaped)) => value.push(escaped),
                    None => break,
                },
                c if c == quote => {
                    self.pos += offset + c.len_utf8();
                    return Ok(value);
                }
                c => value.push(c),
            }
        }
        self.pos = self.text.len();
        Err(self.expected(&format!("closing {quote}")))
    }

    fn word(&mut self) -> &'s str {
        self.take_while(|c| c.is_ascii_lowercase())
    }

    fn take_while(&mut self, accept: impl Fn(char) -> bool) -> &'s str {
        let text = self.text;
        let start = self.pos;
        let len = self
            .rest()
            .find(|c: char| !accept(c))
            .unwrap_or_else(|| self.rest().len());
        self.pos += len;
        &text[start..self.pos]
    }

    fn skip_whitespace(&mut self) {
        self.take_while(char::is_whitespace);
    }

    fn eat(&mut self, c: char) {
        debug_assert_eq!(self.peek(), Some(c));
        self.pos += c.len_utf8();
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn rest(&self) -> &'s str {
        let text = self.text;
        &text[self.pos..]
    }

    fn expected(&self, what: &str) -> SemlocError {
        let position = self.text[..self.pos].chars().count();
        SemlocError::invalid_locator(format!(
            "Failed to parse semantic locator \"{}\". Error message: Expected {what} at position {position}",
            self.text
        ))
    }
}
