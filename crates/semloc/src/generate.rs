//! Generating locators for elements.
//!
//! Four flavours, from most to least precise:
//!
//! - [`precise_locator_for`]: the shortest locator which matches as few
//!   elements as possible, or `None` when the element has no role itself.
//! - [`closest_precise_locator_for`]: as above, for the nearest ancestor-or-self
//!   with a role.
//! - [`closest_simple_locator_for`]: a single node for the nearest
//!   ancestor-or-self with a role.
//! - [`simple_locator_for`]: a single node for the element itself.
//!
//! Generated locators never carry attribute constraints.

use crate::batch::BatchContext;
use crate::dom::{ancestors_or_self, contains, default_root_of, parent_element, tag_name};
use crate::find::{find_by_semantic_locator, FindOptions};
use crate::result::{SemlocError, SemlocResult};
use crate::role::{get_role, is_hidden};
use crate::semantic_locator::{QuoteChar, SemanticLocator, SemanticNode};
use ego_tree::NodeId;
use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const NOT_CONTAINED: &str =
    "Can't generate locator for element that is not contained within the root element.";

/// Which generator to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeneratorMode {
    /// [`precise_locator_for`]
    Precise,
    /// [`closest_precise_locator_for`]
    #[default]
    ClosestPrecise,
    /// [`simple_locator_for`]
    Simple,
    /// [`closest_simple_locator_for`]
    ClosestSimple,
}

impl GeneratorMode {
    /// Every mode
    pub const ALL: [Self; 4] = [
        Self::Precise,
        Self::ClosestPrecise,
        Self::Simple,
        Self::ClosestSimple,
    ];

    /// Name as used on the command line
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Precise => "precise",
            Self::ClosestPrecise => "closest-precise",
            Self::Simple => "simple",
            Self::ClosestSimple => "closest-simple",
        }
    }
}

impl fmt::Display for GeneratorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeneratorMode {
    type Err = SemlocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| SemlocError::value(format!("Unknown generator mode: {s}")))
    }
}

/// Options shared by the generators
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Generate relative to this element instead of the document body
    #[serde(skip)]
    pub root: Option<NodeId>,
    /// Quote character for names. By default `'`, or `"` for names
    /// containing only `'`.
    pub quote_char: Option<QuoteChar>,
}

impl GenerateOptions {
    /// Default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate relative to `root`
    #[must_use]
    pub const fn with_root(mut self, root: NodeId) -> Self {
        self.root = Some(root);
        self
    }

    /// Quote names with `quote_char`
    #[must_use]
    pub const fn with_quote_char(mut self, quote_char: QuoteChar) -> Self {
        self.quote_char = Some(quote_char);
        self
    }
}

/// Options for the batch generators
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOptions {
    /// Per-element options
    pub generate: GenerateOptions,
    /// Stop starting new elements after this long
    pub timeout: Option<Duration>,
}

impl BatchOptions {
    /// Default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `generate` for each element
    #[must_use]
    pub const fn with_generate(mut self, generate: GenerateOptions) -> Self {
        self.generate = generate;
        self
    }

    /// Give up after `timeout`
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Generated locators keyed by element. Elements the batch didn't reach
/// before its deadline are absent.
pub type BatchLocators = HashMap<NodeId, Option<String>>;

/// The most precise locator for `element`, or `None` if `element` itself
/// has no role or is hidden.
///
/// # Errors
///
/// [`SemlocError::Value`] if `options.root` doesn't contain `element`.
pub fn precise_locator_for(element: ElementRef<'_>, options: &GenerateOptions) -> SemlocResult<Option<String>> {
    generate_locator(element, GeneratorMode::Precise, options)
}

/// The most precise locator for the nearest ancestor-or-self of `element`
/// with a role.
///
/// # Errors
///
/// [`SemlocError::Value`] if `options.root` doesn't contain `element`.
pub fn closest_precise_locator_for(
    element: ElementRef<'_>,
    options: &GenerateOptions,
) -> SemlocResult<Option<String>> {
    generate_locator(element, GeneratorMode::ClosestPrecise, options)
}

/// A single-node locator for the nearest ancestor-or-self of `element` with
/// a role.
///
/// # Errors
///
/// [`SemlocError::Value`] if `options.root` doesn't contain `element`.
pub fn closest_simple_locator_for(
    element: ElementRef<'_>,
    options: &GenerateOptions,
) -> SemlocResult<Option<String>> {
    generate_locator(element, GeneratorMode::ClosestSimple, options)
}

/// A single-node locator for `element`, or `None` if it has no role or is
/// hidden
#[must_use]
pub fn simple_locator_for(element: ElementRef<'_>, quote_char: Option<QuoteChar>) -> Option<String> {
    semantic_node_for(&BatchContext::new(), element).map(|node| node.to_string_with_quote(quote_char))
}

/// Run the generator selected by `mode` inside a batch of its own.
///
/// # Errors
///
/// [`SemlocError::Value`] if `options.root` doesn't contain `element`.
pub fn generate_locator(
    element: ElementRef<'_>,
    mode: GeneratorMode,
    options: &GenerateOptions,
) -> SemlocResult<Option<String>> {
    let context = BatchContext::new();
    context.run(|| generate_in(&context, element, mode, options))?
}

/// [`precise_locator_for`] for many elements sharing one batch
///
/// # Errors
///
/// Only if the batch can't start. See [`batch_generate`].
pub fn batch_precise_locator_for(
    elements: &[ElementRef<'_>],
    options: &BatchOptions,
) -> SemlocResult<BatchLocators> {
    batch_generate(elements, GeneratorMode::Precise, options)
}

/// [`closest_precise_locator_for`] for many elements sharing one batch
///
/// # Errors
///
/// Only if the batch can't start. See [`batch_generate`].
pub fn batch_closest_precise_locator_for(
    elements: &[ElementRef<'_>],
    options: &BatchOptions,
) -> SemlocResult<BatchLocators> {
    batch_generate(elements, GeneratorMode::ClosestPrecise, options)
}

/// [`closest_simple_locator_for`] for many elements sharing one batch
///
/// # Errors
///
/// Only if the batch can't start. See [`batch_generate`].
pub fn batch_closest_simple_locator_for(
    elements: &[ElementRef<'_>],
    options: &BatchOptions,
) -> SemlocResult<BatchLocators> {
    batch_generate(elements, GeneratorMode::ClosestSimple, options)
}

/// Run the generator selected by `mode` for each element in turn, inside a
/// single batch. The deadline is only checked between elements.
///
/// An element whose generator fails maps to `None` and the failure is
/// logged; the rest of the batch carries on.
///
/// # Errors
///
/// [`SemlocError::BatchInProgress`] if the batch can't start.
pub fn batch_generate(
    elements: &[ElementRef<'_>],
    mode: GeneratorMode,
    options: &BatchOptions,
) -> SemlocResult<BatchLocators> {
    let deadline = options.timeout.map(|timeout| Instant::now() + timeout);
    let context = BatchContext::new();
    let _batch = context.begin()?;

    let mut locators = BatchLocators::with_capacity(elements.len());
    for (processed, element) in elements.iter().enumerate() {
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            info!(processed, total = elements.len(), %mode, "batch generation ran out of time");
            break;
        }
        let locator = generate_in(&context, *element, mode, &options.generate).unwrap_or_else(|err| {
            warn!(element = tag_name(element), %mode, error = %err, "skipping element in batch generation");
            None
        });
        locators.insert(element.id(), locator);
    }
    Ok(locators)
}

fn generate_in<'a>(
    context: &BatchContext<'a>,
    element: ElementRef<'a>,
    mode: GeneratorMode,
    options: &GenerateOptions,
) -> SemlocResult<Option<String>> {
    let quote_char = options.quote_char;
    if mode == GeneratorMode::Simple {
        return Ok(semantic_node_for(context, element).map(|node| node.to_string_with_quote(quote_char)));
    }

    let root = resolve_root(element, options)?;
    if mode == GeneratorMode::ClosestSimple {
        return Ok(closest_semantic_node(context, element, root)
            .map(|located| located.node.to_string_with_quote(quote_char)));
    }

    let Some((nodes, target)) = closest_full_locator(context, element, root)? else {
        return Ok(None);
    };
    if mode == GeneratorMode::Precise && target != element {
        return Ok(None);
    }
    let locator = refine(context, nodes, target, root)?;
    debug!(%locator, %mode, "generated locator");
    Ok(Some(locator.to_string_with_quote(quote_char)))
}

fn resolve_root<'a>(element: ElementRef<'a>, options: &GenerateOptions) -> SemlocResult<ElementRef<'a>> {
    let Some(id) = options.root else {
        return Ok(default_root_of(element));
    };
    let root = element
        .tree()
        .get(id)
        .and_then(ElementRef::wrap)
        .ok_or_else(|| SemlocError::value("The root is not an element of the element's document."))?;
    if !contains(&root, &element) {
        return Err(SemlocError::value(NOT_CONTAINED));
    }
    Ok(root)
}

/// A node together with the element it was built from
struct Located<'a> {
    node: SemanticNode,
    element: ElementRef<'a>,
}

fn semantic_node_for<'a>(context: &BatchContext<'a>, element: ElementRef<'a>) -> Option<SemanticNode> {
    if is_hidden(&element) {
        return None;
    }
    let role = get_role(&element)?;
    Some(SemanticNode::new(role).with_name(context.accessible_name(element)))
}

/// The nearest ancestor-or-self of `element` strictly inside `root` which
/// has a role and isn't hidden
fn closest_semantic_node<'a>(
    context: &BatchContext<'a>,
    element: ElementRef<'a>,
    root: ElementRef<'a>,
) -> Option<Located<'a>> {
    if !contains(&root, &element) {
        return None;
    }
    ancestors_or_self(element)
        .take_while(|candidate| *candidate != root)
        .find_map(|candidate| {
            semantic_node_for(context, candidate).map(|node| Located {
                node,
                element: candidate,
            })
        })
}

/// The nodes which locate the closest semantic element of `element`, and
/// that element.
///
/// Ancestors are only kept while they narrow down the matches.
fn closest_full_locator<'a>(
    context: &BatchContext<'a>,
    element: ElementRef<'a>,
    root: ElementRef<'a>,
) -> SemlocResult<Option<(Vec<SemanticNode>, ElementRef<'a>)>> {
    let Some(mut first) = closest_semantic_node(context, element, root) else {
        return Ok(None);
    };

    // Descendants of presentational-children roles can't be located, so
    // target the outermost such ancestor instead
    let presentational = ancestors_or_self(first.element)
        .skip(1)
        .take_while(|ancestor| *ancestor != root)
        .filter(|ancestor| get_role(ancestor).is_some_and(|role| role.is_children_presentational()))
        .last();
    if let Some(located) = presentational.and_then(|ancestor| closest_semantic_node(context, ancestor, root)) {
        warn!(
            element = tag_name(&located.element),
            role = %located.node.role,
            ignored = %first.node,
            "element has presentational children; its descendants are ignored while generating a locator"
        );
        first = located;
    }

    let mut nodes = vec![first.node.clone()];
    let mut matches = find_by_nodes(context, &nodes, root)?;
    let mut cursor = parent_element(&first.element);
    while let Some(ancestor) = cursor.and_then(|parent| closest_semantic_node(context, parent, root)) {
        // Nothing above an ancestor containing every match can narrow them
        if matches.iter().all(|el| contains(&ancestor.element, el)) {
            break;
        }
        let mut trial = Vec::with_capacity(nodes.len() + 1);
        trial.push(ancestor.node.clone());
        trial.extend(nodes.iter().cloned());
        let trial_matches = find_by_nodes(context, &trial, root)?;
        if trial_matches.len() < matches.len() {
            nodes = trial;
            matches = trial_matches;
        }
        cursor = parent_element(&ancestor.element);
    }

    debug_assert!(
        matches.contains(&first.element),
        "cannot find element again with the locator just generated: {}",
        SemanticLocator::from_nodes(nodes.clone(), Vec::new())
    );
    Ok(Some((nodes, first.element)))
}

/// Drop nodes which don't affect the matches, then add `outer` if it helps
fn refine<'a>(
    context: &BatchContext<'a>,
    nodes: Vec<SemanticNode>,
    element: ElementRef<'a>,
    root: ElementRef<'a>,
) -> SemlocResult<SemanticLocator> {
    debug_assert!(!nodes.is_empty(), "refining an empty node list");
    let required = remove_redundant_nodes(context, &nodes, root, false)?;
    debug_assert!(
        find_by_nodes(context, &required, root).is_ok_and(|found| found.contains(&element)),
        "removing redundant nodes lost the element: {} became {}",
        SemanticLocator::from_nodes(nodes.clone(), Vec::new()),
        SemanticLocator::from_nodes(required.clone(), Vec::new())
    );
    possibly_add_outer(context, required, element, root)
}

/// Remove nodes, left to right, whose absence doesn't widen the matches.
/// The last node is always kept, and so is the first with `pin_first`.
///
/// Nodes nearer the target are preferred: for
/// `<ul><li><button>OK</button></li></ul>` this keeps `{listitem}` over
/// `{list}` when either would do.
pub(crate) fn remove_redundant_nodes<'a>(
    context: &BatchContext<'a>,
    nodes: &[SemanticNode],
    root: ElementRef<'a>,
    pin_first: bool,
) -> SemlocResult<Vec<SemanticNode>> {
    let Some((last, init)) = nodes.split_last() else {
        return Ok(Vec::new());
    };
    if init.is_empty() {
        return Ok(nodes.to_vec());
    }
    let targets = find_by_nodes(context, nodes, root)?.len();
    let mut required: Vec<SemanticNode> = Vec::with_capacity(nodes.len());
    let skip = usize::from(pin_first);
    required.extend(init[..skip].iter().cloned());
    for (i, node) in init.iter().enumerate().skip(skip) {
        let trial: Vec<SemanticNode> = required.iter().chain(&nodes[i + 1..]).cloned().collect();
        if find_by_nodes(context, &trial, root)?.len() > targets {
            required.push(node.clone());
        }
    }
    required.push(last.clone());
    Ok(required)
}

/// Put every node after `outer` when that still matches `element` and
/// matches fewer elements
fn possibly_add_outer<'a>(
    context: &BatchContext<'a>,
    nodes: Vec<SemanticNode>,
    element: ElementRef<'a>,
    root: ElementRef<'a>,
) -> SemlocResult<SemanticLocator> {
    let without_outer = SemanticLocator::from_nodes(nodes.clone(), Vec::new());
    let without_count = assured_find(context, &without_outer, root)?.len();
    let with_outer = SemanticLocator::from_nodes(Vec::new(), nodes);
    let with_found = assured_find(context, &with_outer, root)?;

    if with_found.contains(&element) && with_found.len() < without_count {
        Ok(with_outer)
    } else {
        Ok(without_outer)
    }
}

fn find_by_nodes<'a>(
    context: &BatchContext<'a>,
    nodes: &[SemanticNode],
    root: ElementRef<'a>,
) -> SemlocResult<Vec<ElementRef<'a>>> {
    let locator = SemanticLocator::from_nodes(nodes.to_vec(), Vec::new());
    assured_find(context, &locator, root)
}

/// Resolve a generated locator, which always finds something
fn assured_find<'a>(
    context: &BatchContext<'a>,
    locator: &SemanticLocator,
    root: ElementRef<'a>,
) -> SemlocResult<Vec<ElementRef<'a>>> {
    let found = find_by_semantic_locator(context, locator, root, FindOptions::default())?.into_found();
    debug_assert!(!found.is_empty(), "locator {locator} didn't find any elements");
    Ok(found)
}
