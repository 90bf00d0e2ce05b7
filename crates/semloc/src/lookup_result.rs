//! Lookup outcomes and the failure explanations built from them.

use crate::accessible_name::accessible_name;
use crate::attribute::{compute_aria_attribute_value, Attribute};
use crate::dom::sort_and_dedup;
use crate::role::get_role;
use crate::role_map::AriaRole;
use crate::semantic_locator::{SemanticLocator, SemanticNode};
use scraper::ElementRef;
use serde::Serialize;

/// Either the matched elements, or why nothing matched
#[derive(Debug, Clone, PartialEq)]
pub enum LookupResult<E> {
    /// At least one element, in document order without duplicates
    Found(Vec<E>),
    /// Nothing matched
    Empty(EmptyResultsMetadata<E>),
}

impl<E> LookupResult<E> {
    /// The matches, if any
    #[must_use]
    pub fn found(&self) -> Option<&[E]> {
        match self {
            Self::Found(found) => Some(found),
            Self::Empty(_) => None,
        }
    }

    /// Whether something matched
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// The matches, or nothing
    #[must_use]
    pub fn into_found(self) -> Vec<E> {
        match self {
            Self::Found(found) => found,
            Self::Empty(_) => Vec::new(),
        }
    }

    /// Convert the element representation
    pub fn map<T>(self, mut f: impl FnMut(E) -> T) -> LookupResult<T> {
        match self {
            Self::Found(found) => LookupResult::Found(found.into_iter().map(f).collect()),
            Self::Empty(metadata) => LookupResult::Empty(metadata.map(&mut f)),
        }
    }

    /// Convert the element representation, dropping elements `f` rejects
    pub fn filter_map<T>(self, mut f: impl FnMut(E) -> Option<T>) -> LookupResult<T> {
        match self {
            Self::Found(found) => LookupResult::Found(found.into_iter().filter_map(f).collect()),
            Self::Empty(metadata) => LookupResult::Empty(EmptyResultsMetadata {
                closest_find: metadata.closest_find,
                partial_find: metadata.partial_find,
                elements_found: metadata.elements_found.into_iter().filter_map(&mut f).collect(),
                not_found: metadata.not_found,
            }),
        }
    }
}

/// Details about why a locator didn't resolve to any elements
#[derive(Debug, Clone, PartialEq)]
pub struct EmptyResultsMetadata<E> {
    /// The longest prefix of nodes which did resolve
    pub closest_find: Vec<SemanticNode>,
    /// The part of the next node which resolved after `closest_find`
    pub partial_find: Option<PartialNode>,
    /// Elements found by `closest_find` plus `partial_find`
    pub elements_found: Vec<E>,
    /// The condition none of `elements_found` satisfied
    pub not_found: NodeField,
}

impl<E> EmptyResultsMetadata<E> {
    /// How far the search got before failing. Higher is more specific.
    #[must_use]
    pub fn specificity(&self) -> f64 {
        // A partial find never has anywhere near 50 conditions
        let partial = self.partial_find.as_ref().map_or(0, PartialNode::specificity);
        self.closest_find.len() as f64 + partial as f64 / 50.0
    }

    /// Convert the element representation
    pub fn map<T>(self, f: impl FnMut(E) -> T) -> EmptyResultsMetadata<T> {
        EmptyResultsMetadata {
            closest_find: self.closest_find,
            partial_find: self.partial_find,
            elements_found: self.elements_found.into_iter().map(f).collect(),
            not_found: self.not_found,
        }
    }
}

/// One condition of a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeField {
    /// The role
    Role(AriaRole),
    /// An attribute value
    Attribute(Attribute),
    /// The accessible name
    Name(String),
}

impl NodeField {
    fn explain(&self) -> String {
        match self {
            Self::Role(role) => format!("an ARIA role of {role}"),
            Self::Attribute(attribute) => {
                format!("aria-{} = {}", attribute.name, attribute.value)
            }
            Self::Name(name) => format!("an accessible name of \"{name}\""),
        }
    }
}

/// A node with only some of its conditions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartialNode {
    /// The role, which always resolved
    pub role: AriaRole,
    /// Attributes which resolved
    pub attributes: Vec<Attribute>,
}

impl PartialNode {
    fn specificity(&self) -> usize {
        1 + self.attributes.len()
    }

    fn explain(&self) -> String {
        let mut parts = vec![NodeField::Role(self.role).explain()];
        parts.extend(
            self.attributes
                .iter()
                .map(|attribute| NodeField::Attribute(attribute.clone()).explain()),
        );
        match parts.split_last() {
            Some((last, rest)) if !rest.is_empty() => format!("{}, and {last}", rest.join(", ")),
            _ => parts.concat(),
        }
    }
}

/// Merge the failures which got furthest.
///
/// Every branch tied for the highest specificity contributes its
/// `elements_found`; the remaining fields come from the first of them.
/// `None` when `metadatas` is empty.
#[must_use]
pub fn combine_most_specific<'a>(
    metadatas: Vec<EmptyResultsMetadata<ElementRef<'a>>>,
) -> Option<EmptyResultsMetadata<ElementRef<'a>>> {
    let max = metadatas
        .iter()
        .map(EmptyResultsMetadata::specificity)
        .fold(f64::NEG_INFINITY, f64::max);

    let mut closest = metadatas
        .into_iter()
        .filter(|metadata| metadata.specificity() == max);
    let mut combined = closest.next()?;
    for other in closest {
        combined.elements_found.extend(other.elements_found);
    }
    sort_and_dedup(&mut combined.elements_found);
    Some(combined)
}

/// Explain why `locator` found nothing.
///
/// `hidden` and `presentational` are what the locator matches when hidden
/// elements, or descendants of presentational-children roles, are included.
#[must_use]
pub fn build_failure_message(
    locator: &SemanticLocator,
    metadata: &EmptyResultsMetadata<ElementRef<'_>>,
    hidden: &[ElementRef<'_>],
    presentational: &[ElementRef<'_>],
) -> String {
    let mut message = format!("Didn't find any elements matching semantic locator {locator}. ");

    let EmptyResultsMetadata {
        closest_find,
        partial_find,
        elements_found,
        not_found,
    } = metadata;
    let count = elements_found.len();
    let plural = count > 1;
    let s = if plural { "s" } else { "" };
    let none_had = if plural { "none had" } else { "it didn't have" };
    let closest = closest_find
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");

    match (closest_find.is_empty(), partial_find) {
        (true, None) => {
            message.push_str(&format!("No elements have {}.", not_found.explain()));
        }
        (true, Some(partial)) => {
            message.push_str(&format!(
                "{count} element{s} with {} were found. However {none_had} {}. {}.",
                partial.explain(),
                not_found.explain(),
                values_for_near_misses(not_found, elements_found)
            ));
        }
        (false, None) => {
            message.push_str(&format!(
                "{count} element{s} matched the locator {closest}, but {none_had} a descendant with {}.",
                not_found.explain()
            ));
        }
        (false, Some(partial)) => {
            message.push_str(&format!(
                "{count} descendant{s} of {closest} with {} were found. However {none_had} {}. {}.",
                partial.explain(),
                not_found.explain(),
                values_for_near_misses(not_found, elements_found)
            ));
        }
    }

    if !hidden.is_empty() {
        let s = if hidden.len() > 1 { "s" } else { "" };
        message.push_str(&format!(
            " {} hidden element{s} matched the locator. To match these elements, ensure \
             they're not hidden (aria-hidden is false and they're not hidden by css).",
            hidden.len()
        ));
    }

    if !presentational.is_empty() {
        let plural = presentational.len() > 1;
        message.push_str(&format!(
            " {} element{} would have matched the locator, but {} an ancestor with \
             presentational children \
             (https://www.w3.org/TR/wai-aria-practices/#children_presentational), \
             erasing its semantics.",
            presentational.len(),
            if plural { "s" } else { "" },
            if plural { "have" } else { "it has" },
        ));
    }

    message
}

/// What the near misses had instead of `field`
fn values_for_near_misses(field: &NodeField, near_misses: &[ElementRef<'_>]) -> String {
    match field {
        NodeField::Role(_) => {
            let roles = first_seen(near_misses.iter().filter_map(get_role).map(AriaRole::as_str));
            format!("Roles found: {}", to_json(&roles))
        }
        NodeField::Attribute(attribute) => {
            let values = first_seen(
                near_misses
                    .iter()
                    .map(|el| compute_aria_attribute_value(el, attribute.name)),
            );
            format!("Values found for aria-{}: {}", attribute.name, to_json(&values))
        }
        NodeField::Name(_) => {
            let names = first_seen(
                near_misses
                    .iter()
                    .map(|el| accessible_name(*el))
                    .filter(|name| !name.is_empty()),
            );
            if names.is_empty() {
                "No matching elements had an accessible name".to_string()
            } else {
                format!("Accessible names found: {}", to_json(&names))
            }
        }
    }
}

fn first_seen<T: PartialEq>(values: impl Iterator<Item = T>) -> Vec<T> {
    let mut unique = Vec::new();
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}

fn to_json<T: Serialize>(values: &[T]) -> String {
    serde_json::to_string(values).unwrap_or_default()
}
