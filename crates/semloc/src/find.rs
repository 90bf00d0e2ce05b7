//! Resolving locators to elements.

use crate::accessible_name::name_matches;
use crate::attribute::compute_aria_attribute_value;
use crate::batch::{BatchContext, LookupKey};
use crate::dom::{is_in_document_order, sort_and_dedup};
use crate::lookup_result::{
    build_failure_message, combine_most_specific, EmptyResultsMetadata, LookupResult, NodeField,
    PartialNode,
};
use crate::outer::outer_nodes_only;
use crate::parser::parse;
use crate::result::{SemlocError, SemlocResult};
use crate::role::find_by_role;
use crate::semantic_locator::{SemanticLocator, SemanticNode};
use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which elements a lookup may return besides the default ones
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FindOptions {
    /// Also match elements hidden from the accessibility tree
    pub include_hidden: bool,
    /// Also match descendants of roles with presentational children
    pub include_presentational: bool,
}

impl FindOptions {
    /// Include hidden elements
    #[must_use]
    pub const fn with_hidden(mut self, include_hidden: bool) -> Self {
        self.include_hidden = include_hidden;
        self
    }

    /// Include descendants of presentational-children roles
    #[must_use]
    pub const fn with_presentational(mut self, include_presentational: bool) -> Self {
        self.include_presentational = include_presentational;
        self
    }
}

/// Every element below `root` matching `locator`, in document order.
///
/// # Errors
///
/// Fails if `locator` doesn't parse, or uses a bare `*` name.
pub fn find_elements_by_semantic_locator<'a>(
    locator: &str,
    root: ElementRef<'a>,
) -> SemlocResult<Vec<ElementRef<'a>>> {
    let parsed = parse(locator)?;
    let result = find_by_semantic_locator(&BatchContext::new(), &parsed, root, FindOptions::default())?;
    Ok(result.into_found())
}

/// The first element below `root` matching `locator`.
///
/// # Errors
///
/// [`SemlocError::NoSuchElement`] with an explanation when nothing matches,
/// or the errors of [`find_elements_by_semantic_locator`].
pub fn find_element_by_semantic_locator<'a>(
    locator: &str,
    root: ElementRef<'a>,
) -> SemlocResult<ElementRef<'a>> {
    let parsed = parse(locator)?;
    let context = BatchContext::new();
    match find_by_semantic_locator(&context, &parsed, root, FindOptions::default())? {
        LookupResult::Found(found) => found
            .first()
            .copied()
            .ok_or_else(|| SemlocError::no_such_element(format!("No elements match {parsed}"))),
        LookupResult::Empty(metadata) => Err(SemlocError::no_such_element(get_failure_message(
            &context, &parsed, root, &metadata,
        )?)),
    }
}

/// Explain why `locator` found nothing below `root`.
///
/// Resolves the locator again including hidden and presentational elements
/// to suggest why the expected element was missed.
///
/// # Errors
///
/// Fails only if the locator uses a bare `*` name.
pub fn get_failure_message<'a>(
    context: &BatchContext<'a>,
    locator: &SemanticLocator,
    root: ElementRef<'a>,
    metadata: &EmptyResultsMetadata<ElementRef<'_>>,
) -> SemlocResult<String> {
    let options = FindOptions::default();
    let hidden =
        find_by_semantic_locator(context, locator, root, options.with_hidden(true))?.into_found();
    let presentational =
        find_by_semantic_locator(context, locator, root, options.with_presentational(true))?
            .into_found();
    Ok(build_failure_message(locator, metadata, &hidden, &presentational))
}

/// Resolve `locator` below `root` (which is never itself a match).
///
/// Runs inside the batch of `context` when there is one, memoising the
/// result, otherwise inside a fresh batch of its own.
///
/// # Errors
///
/// Fails if the locator uses a bare `*` name, or in the unlikely event that
/// starting the fresh batch races with another one.
pub fn find_by_semantic_locator<'a>(
    context: &BatchContext<'a>,
    locator: &SemanticLocator,
    root: ElementRef<'a>,
    options: FindOptions,
) -> SemlocResult<LookupResult<ElementRef<'a>>> {
    if context.is_active() {
        return find_cached(context, locator, root, options);
    }
    let _batch = context.begin()?;
    find_cached(context, locator, root, options)
}

fn find_cached<'a>(
    context: &BatchContext<'a>,
    locator: &SemanticLocator,
    root: ElementRef<'a>,
    options: FindOptions,
) -> SemlocResult<LookupResult<ElementRef<'a>>> {
    let key = LookupKey::new(
        &root,
        locator.to_string(),
        options.include_hidden,
        options.include_presentational,
    );
    context.cached_lookup(key, root, || resolve(context, locator, root, options))
}

fn resolve<'a>(
    context: &BatchContext<'a>,
    locator: &SemanticLocator,
    root: ElementRef<'a>,
    options: FindOptions,
) -> SemlocResult<LookupResult<ElementRef<'a>>> {
    debug!(%locator, ?options, "resolving locator");

    let search_base = match find_by_semantic_nodes(context, locator.pre_outer(), vec![root], options)? {
        LookupResult::Found(found) => found,
        empty @ LookupResult::Empty(_) => return Ok(empty),
    };
    if locator.post_outer().is_empty() {
        debug!(found = search_base.len(), "locator resolved");
        return Ok(LookupResult::Found(search_base));
    }

    // `outer` is relative to each base, so each one is searched and
    // filtered on its own
    let mut found = Vec::new();
    let mut failures = Vec::new();
    for base in search_base {
        match find_by_semantic_nodes(context, locator.post_outer(), vec![base], options)? {
            LookupResult::Found(elements) => found.extend(outer_nodes_only(&elements)),
            LookupResult::Empty(metadata) => failures.push(metadata),
        }
    }

    if found.is_empty() {
        let Some(mut none_found) = combine_most_specific(failures) else {
            return Ok(LookupResult::Found(found));
        };
        let mut closest_find = locator.pre_outer().to_vec();
        closest_find.append(&mut none_found.closest_find);
        none_found.closest_find = closest_find;
        debug!(%locator, "locator matched nothing");
        return Ok(LookupResult::Empty(none_found));
    }

    // Nested bases can yield the same element twice, out of order
    sort_and_dedup(&mut found);
    debug!(found = found.len(), "locator resolved");
    Ok(LookupResult::Found(found))
}

fn find_by_semantic_nodes<'a>(
    context: &BatchContext<'a>,
    nodes: &[SemanticNode],
    mut search_base: Vec<ElementRef<'a>>,
    options: FindOptions,
) -> SemlocResult<LookupResult<ElementRef<'a>>> {
    for (i, node) in nodes.iter().enumerate() {
        match find_by_semantic_node(context, node, &search_base, options)? {
            LookupResult::Found(found) => search_base = found,
            LookupResult::Empty(mut metadata) => {
                metadata.closest_find = nodes[..i].to_vec();
                return Ok(LookupResult::Empty(metadata));
            }
        }
    }
    Ok(LookupResult::Found(search_base))
}

/// Elements below `search_base` matching `node`, in document order
fn find_by_semantic_node<'a>(
    context: &BatchContext<'a>,
    node: &SemanticNode,
    search_base: &[ElementRef<'a>],
    options: FindOptions,
) -> SemlocResult<LookupResult<ElementRef<'a>>> {
    // Anything below a contained base is also below its container
    let search_base = outer_nodes_only(search_base);

    let mut elements: Vec<ElementRef<'a>> = search_base
        .iter()
        .flat_map(|base| {
            find_by_role(
                node.role,
                *base,
                options.include_hidden,
                options.include_presentational,
            )
        })
        .collect();
    if elements.is_empty() {
        return Ok(LookupResult::Empty(EmptyResultsMetadata {
            closest_find: Vec::new(),
            partial_find: None,
            elements_found: search_base,
            not_found: NodeField::Role(node.role),
        }));
    }

    for (i, attribute) in node.attributes.iter().enumerate() {
        let next: Vec<_> = elements
            .iter()
            .copied()
            .filter(|el| {
                compute_aria_attribute_value(el, attribute.name).as_deref()
                    == Some(attribute.value.as_str())
            })
            .collect();
        if next.is_empty() {
            return Ok(LookupResult::Empty(EmptyResultsMetadata {
                closest_find: Vec::new(),
                partial_find: Some(PartialNode {
                    role: node.role,
                    attributes: node.attributes[..i].to_vec(),
                }),
                elements_found: elements,
                not_found: NodeField::Attribute(attribute.clone()),
            }));
        }
        elements = next;
    }

    if let Some(name) = node.name.as_deref().filter(|name| !name.is_empty()) {
        let mut next = Vec::with_capacity(elements.len());
        for el in &elements {
            if name_matches(name, &context.accessible_name(*el))? {
                next.push(*el);
            }
        }
        if next.is_empty() {
            return Ok(LookupResult::Empty(EmptyResultsMetadata {
                closest_find: Vec::new(),
                partial_find: Some(PartialNode {
                    role: node.role,
                    attributes: node.attributes.clone(),
                }),
                elements_found: elements,
                not_found: NodeField::Name(name.to_string()),
            }));
        }
        elements = next;
    }

    debug_assert!(is_in_document_order(&elements), "lookup results out of order");
    Ok(LookupResult::Found(elements))
}
