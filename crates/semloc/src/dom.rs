//! In-memory HTML documents and the DOM primitives the engine relies on.
//!
//! Elements are handed around as [`scraper::ElementRef`]. Anything that must
//! outlive a borrow of the document (batch caches, generated locator maps)
//! keys elements by their [`NodeId`].

use crate::result::{SemlocError, SemlocResult};
use ego_tree::{NodeId, NodeRef};
use html5ever::tendril::StrTendril;
use html5ever::{Attribute, LocalName, Namespace, QualName};
use regex::Regex;
use scraper::node::Element;
use scraper::{ElementRef, Html, Node, Selector};
use std::cmp::Ordering;
use std::sync::LazyLock;

/// A parsed HTML document owned by the caller.
///
/// The engine only reads from it. The mutation helpers exist so callers can
/// model a live page changing between lookups.
#[derive(Debug, Clone)]
pub struct Document {
    html: Html,
}

impl Document {
    /// Parse a full HTML document
    #[must_use]
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// Parse an HTML fragment. The fragment is wrapped in an `<html>` element.
    #[must_use]
    pub fn parse_fragment(html: &str) -> Self {
        Self {
            html: Html::parse_fragment(html),
        }
    }

    /// The underlying scraper document
    #[must_use]
    pub const fn html(&self) -> &Html {
        &self.html
    }

    /// The document element (`<html>`)
    #[must_use]
    pub fn root_element(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    /// The `<body>` element, if the document has one
    #[must_use]
    pub fn body(&self) -> Option<ElementRef<'_>> {
        self.root_element()
            .child_elements()
            .find(|el| el.value().name() == "body")
    }

    /// The default search root: `<body>` or, for fragments, the root element
    #[must_use]
    pub fn default_root(&self) -> ElementRef<'_> {
        default_root_of(self.root_element())
    }

    /// Resolve a node id to an element
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.html.tree.get(id).and_then(ElementRef::wrap)
    }

    /// First attached element with the given `id` attribute
    #[must_use]
    pub fn get_element_by_id(&self, id: &str) -> Option<ElementRef<'_>> {
        element_by_id(self.root_element(), id)
    }

    /// First element matching a CSS selector, in document order
    pub fn query_selector(&self, css: &str) -> SemlocResult<Option<ElementRef<'_>>> {
        let selector = parse_selector(css)?;
        Ok(self.html.select(&selector).next())
    }

    /// All elements matching a CSS selector, in document order
    pub fn query_selector_all(&self, css: &str) -> SemlocResult<Vec<ElementRef<'_>>> {
        let selector = parse_selector(css)?;
        Ok(self.html.select(&selector).collect())
    }

    /// Remove an element (and its subtree) from the document.
    ///
    /// The node stays addressable through [`element`](Self::element) but is
    /// no longer reachable from the root.
    pub fn detach(&mut self, id: NodeId) -> bool {
        match self.html.tree.get_mut(id) {
            Some(mut node) => {
                node.detach();
                true
            }
            None => false,
        }
    }

    /// Set (or replace) an attribute on an element
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> bool {
        self.rewrite_attributes(id, name, Some(value))
    }

    /// Remove an attribute from an element
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> bool {
        self.rewrite_attributes(id, name, None)
    }

    fn rewrite_attributes(&mut self, id: NodeId, name: &str, value: Option<&str>) -> bool {
        let Some(mut node) = self.html.tree.get_mut(id) else {
            return false;
        };
        let Node::Element(element) = node.value() else {
            return false;
        };

        let mut attributes: Vec<Attribute> = element
            .attrs
            .iter()
            .filter(|(qual, _)| !(qual.ns.is_empty() && &*qual.local == name))
            .map(|(qual, value)| Attribute {
                name: qual.clone(),
                value: value.clone(),
            })
            .collect();
        if let Some(value) = value {
            attributes.push(Attribute {
                name: QualName::new(None, Namespace::from(""), LocalName::from(name)),
                value: StrTendril::from_slice(value),
            });
        }
        // Rebuild so the element's cached id and classes stay in sync
        *element = Element::new(element.name.clone(), attributes);
        true
    }
}

/// Compile a CSS selector
pub fn parse_selector(css: &str) -> SemlocResult<Selector> {
    Selector::parse(css).map_err(|e| SemlocError::html(format!("Invalid selector {css:?}: {e}")))
}

/// Lowercase local tag name of an element
#[must_use]
pub fn tag_name<'a>(el: &ElementRef<'a>) -> &'a str {
    el.value().name()
}

/// Whether the element has the given (lowercase) tag name
#[must_use]
pub fn has_tag(el: &ElementRef<'_>, tag: &str) -> bool {
    el.value().name() == tag
}

/// Parent, if it is an element
#[must_use]
pub fn parent_element<'a>(el: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    el.parent().and_then(ElementRef::wrap)
}

/// The element followed by its element ancestors, nearest first
pub fn ancestors_or_self<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    std::iter::successors(Some(el), parent_element)
}

/// Descendant elements in document order, excluding `el` itself
pub fn descendant_elements<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.descendent_elements().skip(1)
}

/// Nearest ancestor-or-self matching `selector`
#[must_use]
pub fn closest<'a>(el: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    ancestors_or_self(el).find(|candidate| selector.matches(candidate))
}

/// Nearest ancestor-or-self with the given tag name
#[must_use]
pub fn closest_tag<'a>(el: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    ancestors_or_self(el).find(|candidate| has_tag(candidate, tag))
}

/// Whether `container` is `el` or one of its ancestors
#[must_use]
pub fn contains(container: &ElementRef<'_>, el: &ElementRef<'_>) -> bool {
    ancestors_or_self(*el).any(|candidate| candidate == *container)
}

/// The default search root of `el`'s document: `<body>`, or the document
/// element when there is none
#[must_use]
pub fn default_root_of(el: ElementRef<'_>) -> ElementRef<'_> {
    let document_element = el
        .tree()
        .root()
        .children()
        .find_map(ElementRef::wrap)
        .unwrap_or(el);
    document_element
        .child_elements()
        .find(|child| has_tag(child, "body"))
        .unwrap_or(document_element)
}

/// First attached element in `el`'s document carrying the given id
#[must_use]
pub fn element_by_id<'a>(el: ElementRef<'a>, id: &str) -> Option<ElementRef<'a>> {
    el.tree()
        .root()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|candidate| candidate.value().id() == Some(id))
}

/// Total order of two elements in tree order.
///
/// Ancestors precede their descendants. Elements in disconnected subtrees
/// fall back to node id order so sorting stays total.
#[must_use]
pub fn compare_document_order(a: &ElementRef<'_>, b: &ElementRef<'_>) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    let chain_a = root_first_chain(**a);
    let chain_b = root_first_chain(**b);

    let shared = chain_a
        .iter()
        .zip(&chain_b)
        .take_while(|(x, y)| x.id() == y.id())
        .count();

    if shared == 0 {
        return a.id().cmp(&b.id());
    }
    match (chain_a.get(shared), chain_b.get(shared)) {
        (None, _) => Ordering::Less,
        (_, None) => Ordering::Greater,
        (Some(x), Some(y)) => {
            if x.next_siblings().any(|sibling| sibling.id() == y.id()) {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
    }
}

fn root_first_chain(node: NodeRef<'_, Node>) -> Vec<NodeRef<'_, Node>> {
    let mut chain: Vec<_> = std::iter::successors(Some(node), NodeRef::parent).collect();
    chain.reverse();
    chain
}

/// Sort into document order and drop duplicates
pub fn sort_and_dedup(elements: &mut Vec<ElementRef<'_>>) {
    elements.sort_by(compare_document_order);
    elements.dedup();
}

/// Whether `elements` is in strictly increasing document order
#[must_use]
pub fn is_in_document_order(elements: &[ElementRef<'_>]) -> bool {
    elements
        .windows(2)
        .all(|pair| compare_document_order(&pair[0], &pair[1]) != Ordering::Greater)
}

// ============================================================================
// Computed style
// ============================================================================

#[allow(clippy::expect_used)]
static STYLE_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|;)\s*([a-z-]+)\s*:\s*([^;]*)").expect("valid regex")
});

/// Elements the user agent stylesheet never renders
const UA_DISPLAY_NONE: &[&str] = &[
    "area", "base", "datalist", "head", "link", "meta", "noscript", "param", "rp", "script",
    "source", "style", "template", "title", "track",
];

/// Value of a property in the element's inline `style`, lowercased, last
/// declaration wins
#[must_use]
pub fn inline_style(el: &ElementRef<'_>, property: &str) -> Option<String> {
    let style = el.value().attr("style")?;
    STYLE_DECLARATION
        .captures_iter(style)
        .filter(|caps| caps[1].eq_ignore_ascii_case(property))
        .last()
        .map(|caps| {
            caps[2]
                .trim()
                .trim_end_matches("!important")
                .trim()
                .to_ascii_lowercase()
        })
}

/// Whether the element's own computed `display` is `none`
#[must_use]
pub fn is_display_none(el: &ElementRef<'_>) -> bool {
    if let Some(display) = inline_style(el, "display") {
        return display == "none";
    }
    el.value().attr("hidden").is_some() || UA_DISPLAY_NONE.contains(&tag_name(el))
}

/// Whether the computed `visibility` is `hidden`. Visibility is inherited.
#[must_use]
pub fn is_visibility_hidden(el: &ElementRef<'_>) -> bool {
    ancestors_or_self(*el)
        .find_map(|candidate| inline_style(&candidate, "visibility"))
        .is_some_and(|visibility| visibility == "hidden")
}

// ============================================================================
// DOM property probes
// ============================================================================

/// Boolean IDL properties the role conditions and attribute fallbacks read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolProperty {
    /// `isContentEditable`, inherited from the nearest `contenteditable`
    IsContentEditable,
    /// `multiple`
    Multiple,
    /// `checked` on inputs
    Checked,
    /// `disabled`, including disabled fieldset and optgroup ancestors
    Disabled,
    /// `selected` on options
    Selected,
    /// `readOnly` on inputs and textareas
    ReadOnly,
}

/// String IDL properties the role conditions read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringProperty {
    /// `type` of inputs, buttons, selects and textareas
    Type,
}

const INPUT_TYPES: &[&str] = &[
    "button", "checkbox", "color", "date", "datetime-local", "email", "file", "hidden", "image",
    "month", "number", "password", "radio", "range", "reset", "search", "submit", "tel", "text",
    "time", "url", "week",
];

const DISABLEABLE: &[&str] = &[
    "button", "fieldset", "input", "optgroup", "option", "select", "textarea",
];

/// Read a boolean property
#[must_use]
pub fn bool_property(el: &ElementRef<'_>, property: BoolProperty) -> bool {
    let value = el.value();
    match property {
        BoolProperty::IsContentEditable => inherited_content_editable(*el),
        BoolProperty::Multiple => value.attr("multiple").is_some(),
        BoolProperty::Checked => has_tag(el, "input") && value.attr("checked").is_some(),
        BoolProperty::Disabled => is_disabled(*el),
        BoolProperty::Selected => has_tag(el, "option") && is_option_selected(*el),
        BoolProperty::ReadOnly => {
            (has_tag(el, "input") || has_tag(el, "textarea")) && value.attr("readonly").is_some()
        }
    }
}

/// Read a string property. `None` where the element has no such property.
#[must_use]
pub fn string_property(el: &ElementRef<'_>, property: StringProperty) -> Option<String> {
    match property {
        StringProperty::Type => element_type(el),
    }
}

fn element_type(el: &ElementRef<'_>) -> Option<String> {
    let attr = el.value().attr("type").map(|t| t.trim().to_ascii_lowercase());
    let value = match tag_name(el) {
        "input" => match attr {
            Some(t) if INPUT_TYPES.contains(&t.as_str()) => t,
            _ => "text".to_string(),
        },
        "button" => match attr {
            Some(t) if matches!(t.as_str(), "submit" | "reset" | "button") => t,
            _ => "submit".to_string(),
        },
        "select" if el.value().attr("multiple").is_some() => "select-multiple".to_string(),
        "select" => "select-one".to_string(),
        tag @ ("textarea" | "output" | "fieldset") => tag.to_string(),
        _ => return None,
    };
    Some(value)
}

/// The `contentEditable` IDL value when the element sets a valid
/// `contenteditable` attribute; `None` means it inherits
#[must_use]
pub fn content_editable_state(el: &ElementRef<'_>) -> Option<&'static str> {
    match el.value().attr("contenteditable")?.trim().to_ascii_lowercase().as_str() {
        "" | "true" => Some("true"),
        "false" => Some("false"),
        "plaintext-only" => Some("plaintext-only"),
        _ => None,
    }
}

fn inherited_content_editable(el: ElementRef<'_>) -> bool {
    ancestors_or_self(el)
        .find_map(|candidate| content_editable_state(&candidate))
        .is_some_and(|state| state != "false")
}

fn is_disabled(el: ElementRef<'_>) -> bool {
    if !DISABLEABLE.contains(&tag_name(&el)) {
        return false;
    }
    if el.value().attr("disabled").is_some() {
        return true;
    }
    if has_tag(&el, "option") {
        return parent_element(&el)
            .is_some_and(|parent| has_tag(&parent, "optgroup") && parent.value().attr("disabled").is_some());
    }
    if has_tag(&el, "optgroup") {
        return false;
    }
    // Form controls inherit disabledness from a fieldset, except inside its first legend
    ancestors_or_self(el).skip(1).any(|ancestor| {
        has_tag(&ancestor, "fieldset")
            && ancestor.value().attr("disabled").is_some()
            && !ancestor
                .child_elements()
                .find(|child| has_tag(child, "legend"))
                .is_some_and(|legend| contains(&legend, &el))
    })
}

fn is_option_selected(option: ElementRef<'_>) -> bool {
    if option.value().attr("selected").is_some() {
        return true;
    }
    // A single-select with no explicit selection selects its first enabled option
    let Some(select) = ancestors_or_self(option).skip(1).find(|a| has_tag(a, "select")) else {
        return false;
    };
    if select.value().attr("multiple").is_some() || display_size(&select) > 1 {
        return false;
    }
    let options = || descendant_elements(select).filter(|el| has_tag(el, "option"));
    if options().any(|o| o.value().attr("selected").is_some()) {
        return false;
    }
    options().find(|o| !is_disabled(*o)) == Some(option)
}

/// The `size` attribute of a select, defaulting to 1
#[must_use]
pub fn display_size(select: &ElementRef<'_>) -> u32 {
    select
        .value()
        .attr("size")
        .and_then(|size| size.trim().parse().ok())
        .filter(|size| *size > 0)
        .unwrap_or(1)
}
