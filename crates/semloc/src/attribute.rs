//! ARIA states and properties usable as locator constraints.

use crate::dom::{
    bool_property, content_editable_state, has_tag, string_property, tag_name, BoolProperty,
    StringProperty,
};
use crate::role::{get_role, position_within_ancestor_role};
use crate::role_map::AriaRole;
use crate::semantic_locator::quote;
use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A supported attribute, named without its `aria-` prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportedAttribute {
    /// `aria-checked`
    Checked,
    /// `aria-current`
    Current,
    /// `aria-disabled`
    Disabled,
    /// `aria-pressed`
    Pressed,
    /// `aria-selected`
    Selected,
    /// `aria-colindex`
    ColIndex,
    /// `aria-level`
    Level,
    /// `aria-posinset`
    PosInSet,
    /// `aria-readonly`
    ReadOnly,
    /// `aria-rowindex`
    RowIndex,
}

impl SupportedAttribute {
    /// States first, then properties
    pub const ALL: [Self; 10] = [
        Self::Checked,
        Self::Current,
        Self::Disabled,
        Self::Pressed,
        Self::Selected,
        Self::ColIndex,
        Self::Level,
        Self::PosInSet,
        Self::ReadOnly,
        Self::RowIndex,
    ];

    /// Name as written in locators
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Checked => "checked",
            Self::Current => "current",
            Self::Disabled => "disabled",
            Self::Pressed => "pressed",
            Self::Selected => "selected",
            Self::ColIndex => "colindex",
            Self::Level => "level",
            Self::PosInSet => "posinset",
            Self::ReadOnly => "readonly",
            Self::RowIndex => "rowindex",
        }
    }

    /// The full HTML attribute name, e.g. `aria-checked`
    #[must_use]
    pub fn aria_name(self) -> String {
        format!("aria-{}", self.as_str())
    }

    /// Comma separated list of every supported name
    #[must_use]
    pub fn supported_list() -> String {
        Self::ALL.map(Self::as_str).join(", ")
    }
}

impl fmt::Display for SupportedAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SupportedAttribute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|attribute| attribute.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// An attribute constraint of a locator node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribute {
    /// Which attribute
    pub name: SupportedAttribute,
    /// Required value
    pub value: String,
}

impl Attribute {
    /// Create a constraint
    #[must_use]
    pub fn new(name: SupportedAttribute, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if is_bare_value(&self.value) {
            write!(f, "{}:{}", self.name, self.value)
        } else {
            write!(f, "{}:{}", self.name, quote(&self.value, None))
        }
    }
}

/// Whether a value can be written without quotes
pub(crate) fn is_bare_value(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// The value of an ARIA attribute, falling back to the native HTML
/// equivalent when the `aria-*` attribute is absent.
///
/// `None` where the attribute doesn't apply to the element. Explicit values
/// are returned verbatim, without validation.
#[must_use]
pub fn compute_aria_attribute_value(el: &ElementRef<'_>, attribute: SupportedAttribute) -> Option<String> {
    if let Some(explicit) = el.value().attr(&attribute.aria_name()) {
        return Some(explicit.to_string());
    }

    let flag = |value: bool| Some(value.to_string());
    let position = |position: Option<usize>| position.map(|p| p.to_string());

    match attribute {
        SupportedAttribute::Checked => {
            let checkable = has_tag(el, "input")
                && string_property(el, StringProperty::Type)
                    .is_some_and(|ty| ty == "checkbox" || ty == "radio");
            if checkable {
                flag(bool_property(el, BoolProperty::Checked))
            } else {
                None
            }
        }
        // No native equivalent
        SupportedAttribute::Current | SupportedAttribute::Pressed => flag(false),
        SupportedAttribute::Disabled => flag(bool_property(el, BoolProperty::Disabled)),
        SupportedAttribute::Selected => {
            if has_tag(el, "option") {
                flag(bool_property(el, BoolProperty::Selected))
            } else {
                None
            }
        }
        SupportedAttribute::ColIndex => position(position_within_ancestor_role(
            el,
            AriaRole::Row,
            &[AriaRole::ColumnHeader, AriaRole::Cell],
        )),
        SupportedAttribute::RowIndex => {
            position(position_within_ancestor_role(el, AriaRole::Table, &[AriaRole::Row]))
        }
        SupportedAttribute::Level => heading_level(tag_name(el)).map(str::to_string),
        SupportedAttribute::PosInSet => match get_role(el) {
            Some(AriaRole::ListItem) => position(position_within_ancestor_role(
                el,
                AriaRole::List,
                &[AriaRole::ListItem],
            )),
            Some(AriaRole::TreeItem) => position(position_within_ancestor_role(
                el,
                AriaRole::Tree,
                &[AriaRole::TreeItem],
            )),
            _ => None,
        },
        SupportedAttribute::ReadOnly => flag(
            (has_tag(el, "input") && bool_property(el, BoolProperty::ReadOnly))
                || content_editable_state(el) == Some("false"),
        ),
    }
}

fn heading_level(tag: &str) -> Option<&str> {
    let level = tag.strip_prefix('h')?;
    matches!(level, "1" | "2" | "3" | "4" | "5" | "6").then_some(level)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::dom::Document;

    fn value(doc: &Document, id: &str, attribute: SupportedAttribute) -> Option<String> {
        compute_aria_attribute_value(&doc.get_element_by_id(id).unwrap(), attribute)
    }

    #[test]
    fn test_names_round_trip() {
        for attribute in SupportedAttribute::ALL {
            assert_eq!(attribute.as_str().parse::<SupportedAttribute>().unwrap(), attribute);
        }
        assert_eq!("foo".parse::<SupportedAttribute>().unwrap_err(), "foo");
        assert_eq!(
            SupportedAttribute::supported_list(),
            "checked, current, disabled, pressed, selected, colindex, level, posinset, readonly, rowindex"
        );
        assert_eq!(Attribute::new(SupportedAttribute::Level, "2").to_string(), "level:2");
        assert_eq!(
            Attribute::new(SupportedAttribute::Current, "next page").to_string(),
            "current:'next page'"
        );
    }

    #[test]
    fn test_explicit_value_is_verbatim() {
        let doc = Document::parse(r#"<div id=a aria-checked="maybe"></div><input type=checkbox checked aria-checked="mixed" id=b>"#);
        assert_eq!(value(&doc, "a", SupportedAttribute::Checked).as_deref(), Some("maybe"));
        assert_eq!(value(&doc, "b", SupportedAttribute::Checked).as_deref(), Some("mixed"));
    }

    mod state_tests {
        use super::*;

        #[test]
        fn test_checked() {
            let doc = Document::parse(
                r#"<input type=checkbox id=a><input type=checkbox checked id=b><input type=radio checked id=c>
                   <input type=text checked id=d><div id=e></div>"#,
            );
            assert_eq!(value(&doc, "a", SupportedAttribute::Checked).as_deref(), Some("false"));
            assert_eq!(value(&doc, "b", SupportedAttribute::Checked).as_deref(), Some("true"));
            assert_eq!(value(&doc, "c", SupportedAttribute::Checked).as_deref(), Some("true"));
            assert_eq!(value(&doc, "d", SupportedAttribute::Checked), None);
            assert_eq!(value(&doc, "e", SupportedAttribute::Checked), None);
        }

        #[test]
        fn test_current_and_pressed_default_false() {
            let doc = Document::parse(r#"<a href=x id=a>x</a><button aria-pressed=true id=b>b</button>"#);
            assert_eq!(value(&doc, "a", SupportedAttribute::Current).as_deref(), Some("false"));
            assert_eq!(value(&doc, "a", SupportedAttribute::Pressed).as_deref(), Some("false"));
            assert_eq!(value(&doc, "b", SupportedAttribute::Pressed).as_deref(), Some("true"));
        }

        #[test]
        fn test_disabled() {
            let doc = Document::parse(r#"<button disabled id=a>a</button><div disabled id=b></div><input id=c>"#);
            assert_eq!(value(&doc, "a", SupportedAttribute::Disabled).as_deref(), Some("true"));
            assert_eq!(value(&doc, "b", SupportedAttribute::Disabled).as_deref(), Some("false"));
            assert_eq!(value(&doc, "c", SupportedAttribute::Disabled).as_deref(), Some("false"));
        }

        #[test]
        fn test_selected() {
            let doc = Document::parse(
                r#"<select multiple><option id=a selected>a</option><option id=b>b</option></select><div id=c></div>"#,
            );
            assert_eq!(value(&doc, "a", SupportedAttribute::Selected).as_deref(), Some("true"));
            assert_eq!(value(&doc, "b", SupportedAttribute::Selected).as_deref(), Some("false"));
            assert_eq!(value(&doc, "c", SupportedAttribute::Selected), None);
        }

        #[test]
        fn test_readonly() {
            let doc = Document::parse(
                r#"<input readonly id=a><input id=b><div contenteditable=false id=c></div><div contenteditable id=d></div><textarea readonly id=e></textarea>"#,
            );
            assert_eq!(value(&doc, "a", SupportedAttribute::ReadOnly).as_deref(), Some("true"));
            assert_eq!(value(&doc, "b", SupportedAttribute::ReadOnly).as_deref(), Some("false"));
            assert_eq!(value(&doc, "c", SupportedAttribute::ReadOnly).as_deref(), Some("true"));
            assert_eq!(value(&doc, "d", SupportedAttribute::ReadOnly).as_deref(), Some("false"));
            assert_eq!(value(&doc, "e", SupportedAttribute::ReadOnly).as_deref(), Some("false"));
        }
    }

    mod property_tests {
        use super::*;

        #[test]
        fn test_level() {
            let doc = Document::parse(r#"<h1 id=a>a</h1><h6 id=b>b</h6><div role=heading id=c>c</div><header id=d></header>"#);
            assert_eq!(value(&doc, "a", SupportedAttribute::Level).as_deref(), Some("1"));
            assert_eq!(value(&doc, "b", SupportedAttribute::Level).as_deref(), Some("6"));
            assert_eq!(value(&doc, "c", SupportedAttribute::Level), None);
            assert_eq!(value(&doc, "d", SupportedAttribute::Level), None);
        }

        #[test]
        fn test_posinset() {
            let doc = Document::parse(
                r#"<ul><li id=a>a</li><li id=b>b</li></ul>
                   <div role=tree><div role=treeitem id=c>c</div><div role=treeitem id=d>d</div></div>
                   <div id=e></div>"#,
            );
            assert_eq!(value(&doc, "a", SupportedAttribute::PosInSet).as_deref(), Some("1"));
            assert_eq!(value(&doc, "b", SupportedAttribute::PosInSet).as_deref(), Some("2"));
            assert_eq!(value(&doc, "d", SupportedAttribute::PosInSet).as_deref(), Some("2"));
            assert_eq!(value(&doc, "e", SupportedAttribute::PosInSet), None);
        }

        #[test]
        fn test_row_and_column_index() {
            let doc = Document::parse(
                r#"<table>
                    <tr id=r1><th id=h1>h</th><th id=h2>h</th></tr>
                    <tr id=r2><td id=c1>d</td><td id=c2>d</td></tr>
                </table>"#,
            );
            assert_eq!(value(&doc, "r1", SupportedAttribute::RowIndex).as_deref(), Some("1"));
            assert_eq!(value(&doc, "r2", SupportedAttribute::RowIndex).as_deref(), Some("2"));
            assert_eq!(value(&doc, "h2", SupportedAttribute::ColIndex).as_deref(), Some("2"));
            assert_eq!(value(&doc, "c1", SupportedAttribute::ColIndex).as_deref(), Some("1"));
            assert_eq!(value(&doc, "c1", SupportedAttribute::RowIndex), None);
        }

        #[test]
        fn test_nested_table_rows_are_separate() {
            let doc = Document::parse(
                r#"<table>
                    <tr id=outer1><td><table><tr id=inner1><td>x</td></tr></table></td></tr>
                    <tr id=outer2><td>y</td></tr>
                </table>"#,
            );
            assert_eq!(value(&doc, "outer2", SupportedAttribute::RowIndex).as_deref(), Some("2"));
            assert_eq!(value(&doc, "inner1", SupportedAttribute::RowIndex).as_deref(), Some("1"));
        }
    }
}
