//! The locator data model and its canonical text form.

use crate::attribute::Attribute;
use crate::result::{SemlocError, SemlocResult};
use crate::role_map::AriaRole;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quote character used around accessible names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteChar {
    /// `'`
    #[default]
    Single,
    /// `"`
    Double,
}

impl QuoteChar {
    /// The character itself
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Single => '\'',
            Self::Double => '"',
        }
    }

    /// The quote which needs no escaping for `raw`: `"` when it contains `'`
    /// but no `"`, otherwise `'`
    #[must_use]
    pub fn preferred_for(raw: &str) -> Self {
        if raw.contains('\'') && !raw.contains('"') {
            Self::Double
        } else {
            Self::Single
        }
    }
}

impl FromStr for QuoteChar {
    type Err = SemlocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "'" | "single" => Ok(Self::Single),
            "\"" | "double" => Ok(Self::Double),
            other => Err(SemlocError::value(format!(
                "Invalid quote character: {other}. Expected ' or \""
            ))),
        }
    }
}

/// Surround `raw` with quotes, escaping the quote character and backslashes
#[must_use]
pub fn quote(raw: &str, quote: Option<QuoteChar>) -> String {
    let q = quote.unwrap_or_else(|| QuoteChar::preferred_for(raw)).as_char();
    let mut quoted = String::with_capacity(raw.len() + 2);
    quoted.push(q);
    for c in raw.chars() {
        if c == q || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push(q);
    quoted
}

/// One `{role 'name' attr:value}` step of a locator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SemanticNode {
    /// Required role
    pub role: AriaRole,
    /// Attribute constraints, checked in order
    pub attributes: Vec<Attribute>,
    /// Accessible name pattern, possibly with `*` wildcards
    pub name: Option<String>,
}

impl SemanticNode {
    /// A node matching any element with `role`
    #[must_use]
    pub const fn new(role: AriaRole) -> Self {
        Self {
            role,
            attributes: Vec::new(),
            name: None,
        }
    }

    /// Require an accessible name. Empty names are dropped.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.name = (!name.is_empty()).then_some(name);
        self
    }

    /// Require an attribute value
    #[must_use]
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Render with a specific quote character for the name
    #[must_use]
    pub fn to_string_with_quote(&self, quote_char: Option<QuoteChar>) -> String {
        let mut text = format!("{{{}", self.role);
        if let Some(name) = self.name.as_deref().filter(|name| !name.is_empty()) {
            text.push(' ');
            text.push_str(&quote(name, quote_char));
        }
        for attribute in &self.attributes {
            text.push(' ');
            text.push_str(&attribute.to_string());
        }
        text.push('}');
        text
    }
}

impl fmt::Display for SemanticNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with_quote(None))
    }
}

/// A parsed locator: `node1 node2 ... [outer nodeK ...]`.
///
/// An empty `pre_outer` with a non-empty `post_outer` means `outer` is the
/// first token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SemanticLocator {
    pre_outer: Vec<SemanticNode>,
    post_outer: Vec<SemanticNode>,
}

impl SemanticLocator {
    /// Build a validated locator.
    ///
    /// # Errors
    ///
    /// Fails when both sequences are empty, or when a node other than the
    /// last one has a role with presentational children.
    pub fn new(pre_outer: Vec<SemanticNode>, post_outer: Vec<SemanticNode>) -> SemlocResult<Self> {
        let locator = Self {
            pre_outer,
            post_outer,
        };
        if locator.is_empty() {
            return Err(SemlocError::invalid_locator("Locator is empty"));
        }
        let non_final = locator.nodes().count() - 1;
        if let Some(node) = locator
            .nodes()
            .take(non_final)
            .find(|node| node.role.is_children_presentational())
        {
            return Err(SemlocError::invalid_locator(format!(
                "Semantic locator {locator} contains a role with presentational children ({}) \
                 before the final node; descendants of such roles cannot be located.",
                node.role
            )));
        }
        Ok(locator)
    }

    /// A locator built from generated nodes, which are valid by construction
    pub(crate) fn from_nodes(pre_outer: Vec<SemanticNode>, post_outer: Vec<SemanticNode>) -> Self {
        let locator = Self {
            pre_outer,
            post_outer,
        };
        debug_assert!(
            Self::new(locator.pre_outer.clone(), locator.post_outer.clone()).is_ok(),
            "generated an invalid locator: {locator}"
        );
        locator
    }

    /// Nodes before `outer`
    #[must_use]
    pub fn pre_outer(&self) -> &[SemanticNode] {
        &self.pre_outer
    }

    /// Nodes after `outer`
    #[must_use]
    pub fn post_outer(&self) -> &[SemanticNode] {
        &self.post_outer
    }

    /// Every node, `pre_outer` first
    pub fn nodes(&self) -> impl Iterator<Item = &SemanticNode> {
        self.pre_outer.iter().chain(&self.post_outer)
    }

    /// Whether the locator has no nodes at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pre_outer.is_empty() && self.post_outer.is_empty()
    }

    /// Render with a specific quote character for names
    #[must_use]
    pub fn to_string_with_quote(&self, quote_char: Option<QuoteChar>) -> String {
        let mut parts: Vec<String> = self
            .pre_outer
            .iter()
            .map(|node| node.to_string_with_quote(quote_char))
            .collect();
        if !self.post_outer.is_empty() {
            parts.push("outer".to_string());
            parts.extend(
                self.post_outer
                    .iter()
                    .map(|node| node.to_string_with_quote(quote_char)),
            );
        }
        parts.join(" ")
    }
}

impl fmt::Display for SemanticLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with_quote(None))
    }
}
