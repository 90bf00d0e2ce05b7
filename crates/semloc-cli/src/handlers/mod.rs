//! Command handlers - extracted from main.rs for testability
//!
//! Each handler turns parsed arguments and a loaded document into a
//! [`Report`](crate::output::Report); main.rs does the printing.

pub mod find;
pub mod generate;
pub mod inspect;

pub use find::{execute_find, FindReport};
pub use generate::{execute_batch, execute_generate, BatchEntry, BatchReport, GenerateReport};
pub use inspect::{execute_parse, execute_role, ParseReport, RoleEntry, RoleReport};

use crate::error::{CliError, CliResult};
use scraper::ElementRef;
use semloc::role::is_hidden;
use semloc::{accessible_name, get_role, AriaRole, Document};
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Read and parse the HTML at `path`, or stdin for `-`
pub fn load_document(path: &Path) -> CliResult<Document> {
    let html = if path == Path::new("-") {
        let mut html = String::new();
        std::io::stdin()
            .read_to_string(&mut html)
            .map_err(|e| CliError::input("<stdin>", e))?;
        html
    } else {
        std::fs::read_to_string(path).map_err(|e| CliError::input(path.display().to_string(), e))?
    };
    debug!(path = %path.display(), bytes = html.len(), "loaded document");
    Ok(Document::parse(&html))
}

/// The first element matching `css`
pub fn select_one<'a>(doc: &'a Document, css: &str) -> CliResult<ElementRef<'a>> {
    doc.query_selector(css)?.ok_or_else(|| CliError::no_match(css))
}

/// The element matching the optional root selector, or the default root
pub fn select_root<'a>(doc: &'a Document, css: Option<&str>) -> CliResult<ElementRef<'a>> {
    css.map_or_else(|| Ok(doc.default_root()), |css| select_one(doc, css))
}

/// What a user sees of an element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementSummary {
    /// Lowercase tag name
    pub tag: String,
    /// `id` attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Computed role
    pub role: Option<AriaRole>,
    /// Computed accessible name
    pub name: String,
    /// Whether the element is hidden from assistive technology
    pub hidden: bool,
}

impl ElementSummary {
    /// Summarise `el`
    #[must_use]
    pub fn of(el: ElementRef<'_>) -> Self {
        Self {
            tag: el.value().name().to_string(),
            id: el.value().id().map(str::to_string),
            role: get_role(&el),
            name: accessible_name(el),
            hidden: is_hidden(&el),
        }
    }

    /// `<tag#id>`
    #[must_use]
    pub fn label(&self) -> String {
        match &self.id {
            Some(id) => format!("<{}#{id}>", self.tag),
            None => format!("<{}>", self.tag),
        }
    }
}
