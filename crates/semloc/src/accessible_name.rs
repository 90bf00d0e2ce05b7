//! Accessible names.
//!
//! A compact rendition of the accname text alternative computation covering
//! what locators need: `aria-labelledby`, `aria-label`, native labels and
//! alternatives, name from content, and `title` as the last resort.

use crate::dom::{
    ancestors_or_self, bool_property, element_by_id, parent_element, sort_and_dedup,
    string_property, tag_name, BoolProperty, StringProperty,
};
use crate::result::{SemlocError, SemlocResult};
use crate::role::{get_role, is_hidden};
use crate::role_map::AriaRole;
use ego_tree::NodeId;
use scraper::{ElementRef, Node};
use std::collections::HashSet;

/// Roles which take their name from their content
const NAME_FROM_CONTENT: &[AriaRole] = &[
    AriaRole::Button,
    AriaRole::Cell,
    AriaRole::Checkbox,
    AriaRole::ColumnHeader,
    AriaRole::GridCell,
    AriaRole::Heading,
    AriaRole::Link,
    AriaRole::MenuItem,
    AriaRole::MenuItemCheckbox,
    AriaRole::MenuItemRadio,
    AriaRole::Option,
    AriaRole::Radio,
    AriaRole::Row,
    AriaRole::RowHeader,
    AriaRole::Switch,
    AriaRole::Tab,
    AriaRole::Tooltip,
    AriaRole::TreeItem,
];

/// Elements rendered as blocks, whose text is separated from its neighbours
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "li", "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

const LABELABLE: &[&str] = &["button", "input", "meter", "output", "progress", "select", "textarea"];

const WILDCARD_ONLY: &str = "* is invalid as an accessible name. To match any accessible name omit it from the locator e.g. {button}.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Traversal {
    Root,
    LabelledBy,
    Content,
}

/// The accessible name of an element, whitespace collapsed and trimmed
#[must_use]
pub fn accessible_name(el: ElementRef<'_>) -> String {
    let mut visited = HashSet::new();
    collapse_whitespace(&text_alternative(el, Traversal::Root, &mut visited))
}

/// Whether `actual` matches the name pattern `expected`.
///
/// A leading `*` matches any prefix and a trailing `*` any suffix. A bare
/// `*` is rejected: omit the name to match any. There is no escape, so an
/// asterisk at either end is always a wildcard.
pub fn name_matches(expected: &str, actual: &str) -> SemlocResult<bool> {
    if expected == "*" {
        return Err(SemlocError::value(WILDCARD_ONLY));
    }
    let matched = match (expected.strip_prefix('*'), expected.strip_suffix('*')) {
        (Some(_), Some(_)) => actual.contains(&expected[1..expected.len() - 1]),
        (Some(suffix), None) => actual.ends_with(suffix),
        (None, Some(prefix)) => actual.starts_with(prefix),
        (None, None) => actual == expected,
    };
    Ok(matched)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

fn text_alternative(el: ElementRef<'_>, traversal: Traversal, visited: &mut HashSet<NodeId>) -> String {
    if !visited.insert(el.id()) {
        return String::new();
    }
    let value = el.value();

    // Hidden content is skipped unless it was reached through a hidden root
    if traversal == Traversal::Content
        && is_hidden(&el)
        && parent_element(&el).is_some_and(|parent| !is_hidden(&parent))
    {
        return String::new();
    }

    if traversal != Traversal::LabelledBy {
        if let Some(ids) = value.attr("aria-labelledby") {
            let parts: Vec<String> = ids
                .split_ascii_whitespace()
                .filter_map(|id| element_by_id(el, id))
                .map(|referenced| text_alternative(referenced, Traversal::LabelledBy, visited))
                .filter(|part| !is_blank(part))
                .collect();
            if !parts.is_empty() {
                return parts.join(" ");
            }
        }
    }

    if traversal == Traversal::Content {
        if let Some(embedded) = embedded_control_value(el) {
            return embedded;
        }
    }

    if let Some(label) = value.attr("aria-label").filter(|label| !is_blank(label)) {
        return label.to_string();
    }

    if let Some(native) = native_text_alternative(el, visited).filter(|native| !is_blank(native)) {
        return native;
    }

    let from_content = traversal != Traversal::Root
        || get_role(&el).is_some_and(|role| NAME_FROM_CONTENT.contains(&role));
    if from_content {
        let content = name_from_content(el, visited);
        if !is_blank(&content) {
            return content;
        }
    }

    value.attr("title").unwrap_or_default().to_string()
}

fn name_from_content(el: ElementRef<'_>, visited: &mut HashSet<NodeId>) -> String {
    let mut text = String::new();
    for child in el.children() {
        match child.value() {
            Node::Text(fragment) => text.push_str(fragment),
            Node::Element(_) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                let block = BLOCK_TAGS.contains(&tag_name(&child));
                if block {
                    text.push(' ');
                }
                text.push_str(&text_alternative(child, Traversal::Content, visited));
                if block {
                    text.push(' ');
                }
            }
            _ => {}
        }
    }
    text
}

fn first_child_content(el: ElementRef<'_>, tag: &str, visited: &mut HashSet<NodeId>) -> Option<String> {
    let child = el.child_elements().find(|child| tag_name(child) == tag)?;
    Some(name_from_content(child, visited))
}

fn native_text_alternative(el: ElementRef<'_>, visited: &mut HashSet<NodeId>) -> Option<String> {
    let value = el.value();
    let non_blank = |text: Option<&str>| text.filter(|t| !is_blank(t)).map(str::to_string);

    match tag_name(&el) {
        "input" => {
            let ty = string_property(&el, StringProperty::Type).unwrap_or_default();
            match ty.as_str() {
                "hidden" => None,
                "button" => non_blank(value.attr("value")),
                "submit" => non_blank(value.attr("value")).or_else(|| Some("Submit".to_string())),
                "reset" => non_blank(value.attr("value")).or_else(|| Some("Reset".to_string())),
                "image" => non_blank(value.attr("alt"))
                    .or_else(|| non_blank(value.attr("value")))
                    .or_else(|| non_blank(value.attr("title")))
                    .or_else(|| Some("Submit Query".to_string())),
                _ => label_text(el, visited),
            }
        }
        tag if LABELABLE.contains(&tag) => label_text(el, visited),
        "img" | "area" => value.attr("alt").map(str::to_string),
        "fieldset" => first_child_content(el, "legend", visited),
        "table" => first_child_content(el, "caption", visited),
        "figure" => first_child_content(el, "figcaption", visited),
        _ => None,
    }
}

/// Text of the `<label>`s associated with a labelable element
fn label_text(el: ElementRef<'_>, visited: &mut HashSet<NodeId>) -> Option<String> {
    let mut labels: Vec<ElementRef<'_>> = Vec::new();
    if let Some(id) = el.value().id() {
        labels.extend(
            el.tree()
                .root()
                .descendants()
                .filter_map(ElementRef::wrap)
                .filter(|label| tag_name(label) == "label" && label.value().attr("for") == Some(id)),
        );
    }
    labels.extend(ancestors_or_self(el).skip(1).find(|a| tag_name(a) == "label"));
    if labels.is_empty() {
        return None;
    }
    sort_and_dedup(&mut labels);

    let parts: Vec<String> = labels
        .into_iter()
        .map(|label| name_from_content(label, visited))
        .filter(|part| !is_blank(part))
        .collect();
    Some(parts.join(" "))
}

/// Value of a form control embedded in another element's label or content
fn embedded_control_value(el: ElementRef<'_>) -> Option<String> {
    let value = el.value();
    match get_role(&el)? {
        AriaRole::Textbox | AriaRole::Searchbox => {
            if tag_name(&el) == "input" {
                Some(value.attr("value").unwrap_or_default().to_string())
            } else {
                None
            }
        }
        AriaRole::Combobox | AriaRole::Listbox if tag_name(&el) == "select" => {
            let selected: Vec<String> = el
                .descendent_elements()
                .filter(|option| {
                    tag_name(option) == "option" && bool_property(option, BoolProperty::Selected)
                })
                .map(|option| collapse_whitespace(&option.text().collect::<String>()))
                .collect();
            Some(selected.join(" "))
        }
        AriaRole::Slider | AriaRole::SpinButton => value
            .attr("aria-valuetext")
            .or_else(|| value.attr("aria-valuenow"))
            .or_else(|| value.attr("value"))
            .map(str::to_string),
        _ => None,
    }
}
