//! Semloc: semantic locators for HTML documents
//!
//! Find elements by what they mean to a user (ARIA role, accessible name and
//! a handful of ARIA states) instead of by CSS structure, and generate such
//! locators for existing elements.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    SEMLOC Architecture                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Locator    │    │ Lookup     │    │ Role, Name │            │
//! │   │ Text       │───►│ Engine     │───►│ Attribute  │            │
//! │   │ (parser)   │    │ (find)     │    │ Resolvers  │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! │         ▲                 ▲                  ▲                  │
//! │         └──── Generator ──┴── BatchContext ──┘                  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use semloc::prelude::*;
//!
//! let doc = Document::parse("<ul><li><button id=foo>OK</button></li></ul>");
//! let found = find_elements_by_semantic_locator("{button 'OK'}", doc.default_root())?;
//! assert_eq!(found.len(), 1);
//!
//! let locator = precise_locator_for(found[0], &GenerateOptions::default())?;
//! assert_eq!(locator.as_deref(), Some("{button 'OK'}"));
//! # Ok::<(), semloc::SemlocError>(())
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

/// Accessible name computation and name patterns
pub mod accessible_name;
/// ARIA attribute values with native HTML fallbacks
pub mod attribute;
/// Memoisation scopes for related lookups
pub mod batch;
/// Host DOM helpers over `scraper`
#[allow(clippy::missing_errors_doc)]
pub mod dom;
/// Locator resolution
pub mod find;
/// Locator generation
pub mod generate;
/// Lookup results and failure explanations
pub mod lookup_result;
/// Outer-node filtering
pub mod outer;
/// Locator text parser
pub mod parser;
mod result;
/// Role resolution
pub mod role;
/// The role table
#[allow(clippy::missing_errors_doc, clippy::doc_markdown)]
pub mod role_map;
/// The locator data model
pub mod semantic_locator;
/// Rendered table grids for row and column indices
#[allow(clippy::cast_possible_truncation)]
pub mod table;

pub use accessible_name::{accessible_name, name_matches};
pub use attribute::{compute_aria_attribute_value, Attribute, SupportedAttribute};
pub use batch::{BatchContext, BatchGuard};
pub use dom::Document;
pub use find::{
    find_by_semantic_locator, find_element_by_semantic_locator,
    find_elements_by_semantic_locator, get_failure_message, FindOptions,
};
pub use generate::{
    batch_closest_precise_locator_for, batch_closest_simple_locator_for, batch_generate,
    batch_precise_locator_for, closest_precise_locator_for, closest_simple_locator_for,
    generate_locator, precise_locator_for, simple_locator_for, BatchLocators, BatchOptions,
    GenerateOptions, GeneratorMode,
};
pub use lookup_result::{EmptyResultsMetadata, LookupResult, NodeField, PartialNode};
pub use outer::outer_nodes_only;
pub use parser::parse;
pub use result::{ErrorKind, SemlocError, SemlocResult};
pub use role::{find_by_role, get_role};
pub use role_map::{AriaRole, UnknownRole};
pub use semantic_locator::{QuoteChar, SemanticLocator, SemanticNode};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::batch::{BatchContext, BatchGuard};
    pub use super::dom::Document;
    pub use super::find::*;
    pub use super::generate::{
        batch_closest_precise_locator_for, batch_closest_simple_locator_for, batch_generate,
        batch_precise_locator_for, closest_precise_locator_for, closest_simple_locator_for,
        generate_locator, precise_locator_for, simple_locator_for, BatchLocators, BatchOptions,
        GenerateOptions, GeneratorMode,
    };
    pub use super::lookup_result::{LookupResult, NodeField};
    pub use super::parser::parse;
    pub use super::result::*;
    pub use super::role_map::AriaRole;
    pub use super::semantic_locator::*;
}
