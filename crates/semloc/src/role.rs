//! Role resolution.
//!
//! An explicit `role` attribute always wins. Elements without one take the
//! first implicit role from the role table whose pattern (and conditions)
//! they satisfy.

use crate::dom::{
    ancestors_or_self, bool_property, closest, closest_tag, descendant_elements, element_by_id,
    is_display_none, is_visibility_hidden, parent_element, sort_and_dedup,
    string_property, tag_name,
};
use crate::role_map::{registry, AriaRole, Condition, IGNORED_ROLES};
use crate::table::{has_data_in_column, has_data_in_row};
use scraper::ElementRef;

/// The element's non-empty `role` attribute, verbatim
#[must_use]
pub fn explicit_role<'a>(el: &ElementRef<'a>) -> Option<&'a str> {
    el.value().attr("role").filter(|role| !role.is_empty())
}

/// The effective role of an element.
///
/// `presentation`, `none` and unrecognised explicit roles yield `None`.
#[must_use]
pub fn get_role(el: &ElementRef<'_>) -> Option<AriaRole> {
    if let Some(role) = explicit_role(el) {
        if IGNORED_ROLES.contains(&role) {
            return None;
        }
        return role.parse().ok();
    }
    registry()
        .implicit_roles_for_tag(tag_name(el))
        .iter()
        .copied()
        .find(|role| matches_implicit_role(el, *role))
}

/// Whether the element has `role`, explicitly or implicitly
#[must_use]
pub fn has_role(el: &ElementRef<'_>, role: AriaRole) -> bool {
    match explicit_role(el) {
        Some(explicit) => explicit == role.as_str(),
        None => {
            registry().implicit_roles_for_tag(tag_name(el)).contains(&role)
                && matches_implicit_role(el, role)
        }
    }
}

/// Descendants of `context` (excluding `context`) with `role`, in document
/// order
#[must_use]
pub fn find_by_role<'a>(
    role: AriaRole,
    context: ElementRef<'a>,
    include_hidden: bool,
    include_presentational: bool,
) -> Vec<ElementRef<'a>> {
    descendant_elements(context)
        .filter(|el| has_role(el, role))
        .filter(|el| include_hidden || !is_hidden(el))
        .filter(|el| include_presentational || closest_children_presentational_ancestor(el).is_none())
        .collect()
}

/// Whether the element is hidden from the accessibility tree
#[must_use]
pub fn is_hidden(el: &ElementRef<'_>) -> bool {
    is_visibility_hidden(el)
        || ancestors_or_self(*el).any(|a| a.value().attr("aria-hidden") == Some("true") || is_display_none(&a))
}

/// Nearest proper ancestor whose role makes its children presentational
#[must_use]
pub fn closest_children_presentational_ancestor<'a>(el: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    ancestors_or_self(*el).skip(1).find(has_children_presentational_role)
}

fn has_children_presentational_role(el: &ElementRef<'_>) -> bool {
    match explicit_role(el) {
        Some(role) => role
            .parse::<AriaRole>()
            .is_ok_and(AriaRole::is_children_presentational),
        None => registry().presentational_parents().matches(el),
    }
}

/// Nearest ancestor-or-self with `role`.
///
/// Only valid for roles whose implicit mapping needs no conditions.
#[must_use]
pub fn closest_with_role<'a>(el: ElementRef<'a>, role: AriaRole) -> Option<ElementRef<'a>> {
    let exact = registry().selector_for(role).and_then(|selector| {
        debug_assert!(
            selector.conditional.is_empty(),
            "closest_with_role called with role {role}, which requires conditions"
        );
        selector.exact.as_ref()
    });
    ancestors_or_self(el).find(|candidate| match explicit_role(candidate) {
        Some(explicit) => explicit == role.as_str(),
        None => exact.is_some_and(|pattern| pattern.selector().matches(candidate)),
    })
}

/// 1-based position of `el` among the elements with one of
/// `descendant_roles` inside its nearest `ancestor_role` ancestor.
///
/// Descendants belonging to a nested `ancestor_role` don't count. `None`
/// without such an ancestor, or when `el` doesn't have one of the roles.
#[must_use]
pub fn position_within_ancestor_role(
    el: &ElementRef<'_>,
    ancestor_role: AriaRole,
    descendant_roles: &[AriaRole],
) -> Option<usize> {
    let ancestor = closest_with_role(parent_element(el)?, ancestor_role)?;

    let mut siblings: Vec<_> = descendant_roles
        .iter()
        .flat_map(|role| find_by_role(*role, ancestor, false, false))
        .filter(|descendant| {
            parent_element(descendant).and_then(|parent| closest_with_role(parent, ancestor_role))
                == Some(ancestor)
        })
        .collect();
    sort_and_dedup(&mut siblings);
    siblings.iter().position(|sibling| sibling == el).map(|i| i + 1)
}

fn matches_implicit_role(el: &ElementRef<'_>, role: AriaRole) -> bool {
    let Some(selector) = registry().selector_for(role) else {
        return false;
    };
    if selector.exact.as_ref().is_some_and(|exact| exact.selector().matches(el)) {
        return true;
    }
    selector.conditional.iter().any(|conditional| {
        conditional.greedy.selector().matches(el)
            && conditional
                .conditions
                .iter()
                .all(|condition| evaluate_condition(el, condition))
    })
}

/// Whether `condition` holds for the element
#[must_use]
pub fn evaluate_condition(el: &ElementRef<'_>, condition: &Condition) -> bool {
    let value = el.value();
    match condition {
        Condition::AttributeValueGreaterThan { attribute, value: bound } => value
            .attr(attribute)
            .is_some_and(|v| js_number(v) > *bound),
        Condition::AttributeValueLessThan { attribute, value: bound } => value
            .attr(attribute)
            .is_some_and(|v| js_number(v) < *bound),
        // Presence is enough, even of an empty `aria-label`
        Condition::HasAccessibleName => {
            value.attr("aria-label").is_some()
                || value.attr("aria-labelledby").is_some_and(|ids| {
                    ids.split_ascii_whitespace()
                        .any(|id| element_by_id(*el, id).is_some())
                })
        }
        Condition::ForbiddenAncestors(pattern) => closest(*el, pattern.selector()).is_none(),
        Condition::PropertyTakesBoolValue { property, value: expected } => {
            bool_property(el, *property) == *expected
        }
        Condition::PropertyTakesOneOfStringValues { property, values } => {
            string_property(el, *property).is_some_and(|v| values.contains(&v.as_str()))
        }
        Condition::ClosestAncestorTagHasRole { tag, role } => parent_element(el)
            .and_then(|parent| closest_tag(parent, tag))
            .is_some_and(|ancestor| get_role(&ancestor) == Some(*role)),
        Condition::DataInRow(expected) => {
            closest_tag(*el, "table").is_some_and(|table| has_data_in_row(table, el) == *expected)
        }
        Condition::DataInColumn(expected) => closest_tag(*el, "table")
            .is_some_and(|table| has_data_in_column(table, el) == *expected),
    }
}

/// String to number conversion with JavaScript `Number()` semantics for the
/// decimal forms attributes use: blank is 0, garbage is NaN
#[must_use]
pub fn js_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    if trimmed.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return f64::NAN;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::dom::Document;

    fn by_id<'a>(doc: &'a Document, id: &str) -> ElementRef<'a> {
        doc.get_element_by_id(id).unwrap()
    }

    fn ids(elements: &[ElementRef<'_>]) -> Vec<String> {
        elements
            .iter()
            .map(|el| el.value().id().unwrap_or_default().to_string())
            .collect()
    }

    fn found(doc: &Document, role: AriaRole) -> Vec<String> {
        ids(&find_by_role(role, doc.default_root(), false, false))
    }

    // ========================================================================
    // get_role
    // ========================================================================

    mod get_role_tests {
        use super::*;

        #[test]
        fn test_explicit_role_wins() {
            let doc = Document::parse(r#"<button id=a role="link">x</button><div id=b role="button"></div>"#);
            assert_eq!(get_role(&by_id(&doc, "a")), Some(AriaRole::Link));
            assert_eq!(get_role(&by_id(&doc, "b")), Some(AriaRole::Button));
        }

        #[test]
        fn test_ignored_and_unknown_roles() {
            let doc = Document::parse(
                r#"<button id=a role="presentation">x</button><button id=b role="none">x</button>
                   <button id=c role="bogus">x</button><button id=d role="">x</button>"#,
            );
            assert_eq!(get_role(&by_id(&doc, "a")), None);
            assert_eq!(get_role(&by_id(&doc, "b")), None);
            assert_eq!(get_role(&by_id(&doc, "c")), None);
            assert_eq!(get_role(&by_id(&doc, "d")), Some(AriaRole::Button));
        }

        #[test]
        fn test_select_roles() {
            let doc = Document::parse(
                r#"<select id=a></select><select id=b multiple></select>
                   <select id=c size=1></select><select id=d size=3></select>
                   <select id=e size=""></select>"#,
            );
            assert_eq!(get_role(&by_id(&doc, "a")), Some(AriaRole::Combobox));
            assert_eq!(get_role(&by_id(&doc, "b")), Some(AriaRole::Listbox));
            assert_eq!(get_role(&by_id(&doc, "c")), Some(AriaRole::Combobox));
            assert_eq!(get_role(&by_id(&doc, "d")), Some(AriaRole::Listbox));
            assert_eq!(get_role(&by_id(&doc, "e")), Some(AriaRole::Combobox));
        }

        #[test]
        fn test_inputs() {
            let doc = Document::parse(
                r#"<input id=a><input id=b type=search><input id=c type=checkbox>
                   <input id=d list=l><input id=e type=hidden><input id=f type=number>"#,
            );
            assert_eq!(get_role(&by_id(&doc, "a")), Some(AriaRole::Textbox));
            assert_eq!(get_role(&by_id(&doc, "b")), Some(AriaRole::Searchbox));
            assert_eq!(get_role(&by_id(&doc, "c")), Some(AriaRole::Checkbox));
            assert_eq!(get_role(&by_id(&doc, "d")), Some(AriaRole::Combobox));
            assert_eq!(get_role(&by_id(&doc, "e")), None);
            assert_eq!(get_role(&by_id(&doc, "f")), Some(AriaRole::SpinButton));
        }

        #[test]
        fn test_landmarks_need_names_or_scope() {
            let doc = Document::parse(
                r#"<header id=a></header><article><header id=b></header></article>
                   <section id=c></section><section id=d aria-label="Intro"></section>
                   <span id=lbl>Label</span><form id=e aria-labelledby="lbl"></form>
                   <form id=f aria-labelledby="missing"></form>"#,
            );
            assert_eq!(get_role(&by_id(&doc, "a")), Some(AriaRole::Banner));
            assert_eq!(get_role(&by_id(&doc, "b")), None);
            assert_eq!(get_role(&by_id(&doc, "c")), None);
            assert_eq!(get_role(&by_id(&doc, "d")), Some(AriaRole::Region));
            assert_eq!(get_role(&by_id(&doc, "e")), Some(AriaRole::Form));
            assert_eq!(get_role(&by_id(&doc, "f")), None);
        }

        #[test]
        fn test_empty_aria_label_still_names_landmark() {
            let doc = Document::parse(r#"<section id=s aria-label=""></section><form id=f aria-label></form>"#);
            assert_eq!(get_role(&by_id(&doc, "s")), Some(AriaRole::Region));
            assert_eq!(get_role(&by_id(&doc, "f")), Some(AriaRole::Form));
        }

        #[test]
        fn test_table_cells() {
            let doc = Document::parse(
                r#"<table>
                    <tr><th id=ch>h</th><th id=ch2>h</th></tr>
                    <tr><th id=rh>h</th><td id=c>d</td></tr>
                </table>
                <table role=grid><tr><td id=g>d</td></tr></table>"#,
            );
            assert_eq!(get_role(&by_id(&doc, "ch")), Some(AriaRole::ColumnHeader));
            assert_eq!(get_role(&by_id(&doc, "ch2")), Some(AriaRole::ColumnHeader));
            assert_eq!(get_role(&by_id(&doc, "rh")), Some(AriaRole::RowHeader));
            assert_eq!(get_role(&by_id(&doc, "c")), Some(AriaRole::Cell));
            assert_eq!(get_role(&by_id(&doc, "g")), Some(AriaRole::GridCell));
        }

        #[test]
        fn test_no_role() {
            let doc = Document::parse(r#"<div id=a>x</div><span id=b>y</span><a id=c>z</a>"#);
            assert_eq!(get_role(&by_id(&doc, "a")), None);
            assert_eq!(get_role(&by_id(&doc, "b")), None);
            assert_eq!(get_role(&by_id(&doc, "c")), None);
        }
    }

    // ========================================================================
    // find_by_role
    // ========================================================================

    mod find_by_role_tests {
        use super::*;

        #[test]
        fn test_explicit_and_implicit_in_document_order() {
            let doc = Document::parse(
                r#"<div role=button id=a></div><button id=b>x</button>
                   <button role=link id=c>x</button><input type=submit id=d>"#,
            );
            assert_eq!(found(&doc, AriaRole::Button), vec!["a", "b", "d"]);
            assert_eq!(found(&doc, AriaRole::Link), vec!["c"]);
        }

        #[test]
        fn test_aria_only_role() {
            let doc = Document::parse(r#"<div role=switch id=a></div><input type=checkbox id=b>"#);
            assert_eq!(found(&doc, AriaRole::Switch), vec!["a"]);
        }

        #[test]
        fn test_excludes_context_node() {
            let doc = Document::parse(r#"<ul id=outer><li><ul id=inner></ul></li></ul>"#);
            let outer = by_id(&doc, "outer");
            assert_eq!(ids(&find_by_role(AriaRole::List, outer, false, false)), vec!["inner"]);
        }

        #[test]
        fn test_hidden_filtering() {
            let doc = Document::parse(
                r#"<ul aria-hidden="true" id=a><li>OK</li></ul>
                   <ul style="visibility:hidden" id=b><li>OK</li></ul>
                   <ul style="display:none" id=c><li>OK</li></ul>
                   <ul id=d><li>OK</li></ul>"#,
            );
            assert_eq!(found(&doc, AriaRole::List), vec!["d"]);
            let all = find_by_role(AriaRole::List, doc.default_root(), true, false);
            assert_eq!(ids(&all), vec!["a", "b", "c", "d"]);
        }

        #[test]
        fn test_presentational_children_filtering() {
            let doc = Document::parse(
                r#"<button id=b><img id=i alt="icon"></button>
                   <div role=tab><h2 id=h>Title</h2></div>
                   <img id=j alt="free">"#,
            );
            assert_eq!(found(&doc, AriaRole::Img), vec!["j"]);
            assert!(found(&doc, AriaRole::Heading).is_empty());
            let all = find_by_role(AriaRole::Img, doc.default_root(), false, true);
            assert_eq!(ids(&all), vec!["i", "j"]);
        }

        #[test]
        fn test_options() {
            let doc = Document::parse(
                r#"<select><optgroup label=g><option id=a>a</option></optgroup></select>
                   <datalist style="display:block"><option id=b>b</option><div><option id=c>c</option></div></datalist>"#,
            );
            assert_eq!(found(&doc, AriaRole::Option), vec!["a", "b"]);
        }
    }

    // ========================================================================
    // Conditions
    // ========================================================================

    mod condition_tests {
        use super::*;
        use crate::dom::BoolProperty;

        #[test]
        fn test_attribute_comparisons() {
            let doc = Document::parse(r#"<div id=a size="3"></div><div id=b size="abc"></div><div id=c size=" "></div><div id=d></div>"#);
            let gt = Condition::AttributeValueGreaterThan { attribute: "size", value: 1.0 };
            let lt = Condition::AttributeValueLessThan { attribute: "size", value: 2.0 };
            assert!(evaluate_condition(&by_id(&doc, "a"), &gt));
            assert!(!evaluate_condition(&by_id(&doc, "a"), &lt));
            assert!(!evaluate_condition(&by_id(&doc, "b"), &gt));
            assert!(!evaluate_condition(&by_id(&doc, "b"), &lt));
            assert!(evaluate_condition(&by_id(&doc, "c"), &lt));
            assert!(!evaluate_condition(&by_id(&doc, "d"), &gt));
            assert!(!evaluate_condition(&by_id(&doc, "d"), &lt));
        }

        #[test]
        fn test_bool_property() {
            let doc = Document::parse(r#"<select id=a multiple></select><select id=b></select>"#);
            let single = Condition::PropertyTakesBoolValue { property: BoolProperty::Multiple, value: false };
            assert!(!evaluate_condition(&by_id(&doc, "a"), &single));
            assert!(evaluate_condition(&by_id(&doc, "b"), &single));
        }

        #[test]
        fn test_closest_ancestor_tag_has_role() {
            let doc = Document::parse(
                r#"<table><tr><td id=outer><table role=grid><tr><td id=inner>x</td></tr></table></td></tr></table>"#,
            );
            let in_grid = Condition::ClosestAncestorTagHasRole { tag: "table", role: AriaRole::Grid };
            assert!(evaluate_condition(&by_id(&doc, "inner"), &in_grid));
            assert!(!evaluate_condition(&by_id(&doc, "outer"), &in_grid));
        }

        #[test]
        fn test_js_number() {
            assert_eq!(js_number(" 4 "), 4.0);
            assert_eq!(js_number(""), 0.0);
            assert_eq!(js_number("1e1"), 10.0);
            assert!(js_number("2px").is_nan());
            assert!(js_number("inf").is_nan());
        }
    }

    // ========================================================================
    // Ancestors and positions
    // ========================================================================

    mod position_tests {
        use super::*;

        #[test]
        fn test_is_hidden() {
            let doc = Document::parse(
                r#"<div aria-hidden="true"><p id=a>x</p></div><div aria-hidden="false"><p id=b>x</p></div>
                   <div style="display:none"><p id=c style="display:block">x</p></div>"#,
            );
            assert!(is_hidden(&by_id(&doc, "a")));
            assert!(!is_hidden(&by_id(&doc, "b")));
            assert!(is_hidden(&by_id(&doc, "c")));
        }

        #[test]
        fn test_closest_children_presentational_ancestor() {
            let doc = Document::parse(
                r#"<button id=b><span><i id=i></i></span></button>
                   <div role=presentation><span id=s></span></div>
                   <div role=checkbox id=cb><span id=t></span></div>"#,
            );
            assert_eq!(closest_children_presentational_ancestor(&by_id(&doc, "i")), Some(by_id(&doc, "b")));
            assert_eq!(closest_children_presentational_ancestor(&by_id(&doc, "b")), None);
            assert_eq!(closest_children_presentational_ancestor(&by_id(&doc, "s")), None);
            assert_eq!(closest_children_presentational_ancestor(&by_id(&doc, "t")), Some(by_id(&doc, "cb")));
        }

        #[test]
        fn test_closest_with_role() {
            let doc = Document::parse(
                r#"<ul id=list><li id=item><div role=list id=inner><span id=leaf></span></div></li></ul>"#,
            );
            assert_eq!(closest_with_role(by_id(&doc, "leaf"), AriaRole::List), Some(by_id(&doc, "inner")));
            assert_eq!(closest_with_role(by_id(&doc, "item"), AriaRole::List), Some(by_id(&doc, "list")));
            assert_eq!(closest_with_role(by_id(&doc, "list"), AriaRole::Table), None);
        }

        #[test]
        fn test_position_ignores_nested_ancestors() {
            let doc = Document::parse(
                r#"<ul>
                    <li id=a>a<ul><li id=nested>n</li></ul></li>
                    <li id=b>b</li>
                </ul>"#,
            );
            let pos = |id| position_within_ancestor_role(&by_id(&doc, id), AriaRole::List, &[AriaRole::ListItem]);
            assert_eq!(pos("a"), Some(1));
            assert_eq!(pos("b"), Some(2));
            assert_eq!(pos("nested"), Some(1));
        }

        #[test]
        fn test_position_without_ancestor() {
            let doc = Document::parse(r#"<div role=listitem id=a></div>"#);
            assert_eq!(
                position_within_ancestor_role(&by_id(&doc, "a"), AriaRole::List, &[AriaRole::ListItem]),
                None
            );
        }
    }
}
