//! Outer-node filtering used by `outer` locators and to prune search bases.

use crate::dom::{contains, is_in_document_order};
use scraper::ElementRef;

/// Keep only the elements not contained by an earlier element of `nodes`.
///
/// `nodes` must be in document order. Duplicates are removed too, since an
/// element contains itself.
#[must_use]
pub fn outer_nodes_only<'a>(nodes: &[ElementRef<'a>]) -> Vec<ElementRef<'a>> {
    debug_assert!(is_in_document_order(nodes), "nodes are not in document order");

    let mut filtered: Vec<ElementRef<'a>> = Vec::with_capacity(nodes.len());
    for node in nodes {
        // The last kept node is the current outer node
        if !filtered.last().is_some_and(|outer| contains(outer, node)) {
            filtered.push(*node);
        }
    }
    filtered
}
