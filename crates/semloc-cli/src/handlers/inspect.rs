//! Role and parse command handlers

use super::ElementSummary;
use crate::commands::{ParseArgs, RoleArgs};
use crate::error::CliResult;
use crate::output::{Report, Styler};
use scraper::ElementRef;
use semloc::{
    compute_aria_attribute_value, parse, simple_locator_for, Attribute, Document, SemanticNode,
    SupportedAttribute,
};
use serde::Serialize;

/// Role information for one element
#[derive(Debug, Clone, Serialize)]
pub struct RoleEntry {
    /// The element
    pub element: ElementSummary,
    /// Its role and name as a single-node locator
    pub locator: Option<String>,
    /// Supported attributes as `attribute:value`, omitting those which are
    /// absent or `false`
    pub attributes: Vec<String>,
}

/// Role information for selected elements
#[derive(Debug, Clone, Serialize)]
pub struct RoleReport {
    /// Entries in document order
    pub elements: Vec<RoleEntry>,
}

impl Report for RoleReport {
    fn text_lines(&self, styler: &Styler) -> Vec<String> {
        self.elements
            .iter()
            .map(|entry| {
                let mut line = format!(
                    "{} {}",
                    styler.element(&entry.element.label()),
                    entry
                        .locator
                        .as_deref()
                        .map_or_else(|| styler.dim("(no role)"), |locator| styler.locator(locator))
                );
                if !entry.attributes.is_empty() {
                    line.push(' ');
                    line.push_str(&styler.dim(&entry.attributes.join(" ")));
                }
                if entry.element.hidden {
                    line.push(' ');
                    line.push_str(&styler.dim("(hidden)"));
                }
                line
            })
            .collect()
    }
}

/// A node of a parsed locator
#[derive(Debug, Clone, Serialize)]
pub struct NodeReport {
    /// Role name
    pub role: String,
    /// Name pattern
    pub name: Option<String>,
    /// `attribute:value` constraints
    pub attributes: Vec<String>,
}

impl From<&SemanticNode> for NodeReport {
    fn from(node: &SemanticNode) -> Self {
        Self {
            role: node.role.to_string(),
            name: node.name.clone(),
            attributes: node.attributes.iter().map(ToString::to_string).collect(),
        }
    }
}

/// A parsed locator
#[derive(Debug, Clone, Serialize)]
pub struct ParseReport {
    /// Canonical text
    pub canonical: String,
    /// Nodes before `outer`
    pub pre_outer: Vec<NodeReport>,
    /// Nodes after `outer`
    pub post_outer: Vec<NodeReport>,
}

impl Report for ParseReport {
    fn text_lines(&self, styler: &Styler) -> Vec<String> {
        vec![styler.locator(&self.canonical)]
    }
}

/// Execute the role command
pub fn execute_role(doc: &Document, args: &RoleArgs) -> CliResult<RoleReport> {
    let elements = doc
        .query_selector_all(&args.selector)?
        .into_iter()
        .map(|element| RoleEntry {
            element: ElementSummary::of(element),
            locator: simple_locator_for(element, None),
            attributes: attribute_values(element),
        })
        .collect();
    Ok(RoleReport { elements })
}

fn attribute_values(element: ElementRef<'_>) -> Vec<String> {
    SupportedAttribute::ALL
        .into_iter()
        .filter_map(|attribute| {
            compute_aria_attribute_value(&element, attribute)
                .filter(|value| value != "false")
                .map(|value| Attribute::new(attribute, value).to_string())
        })
        .collect()
}

/// Execute the parse command
pub fn execute_parse(args: &ParseArgs) -> CliResult<ParseReport> {
    let locator = parse(&args.locator)?;
    Ok(ParseReport {
        canonical: locator.to_string_with_quote(args.quote.map(Into::into)),
        pre_outer: locator.pre_outer().iter().map(NodeReport::from).collect(),
        post_outer: locator.post_outer().iter().map(NodeReport::from).collect(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::commands::QuoteArg;
    use crate::error::CliError;
    use semloc::AriaRole;

    mod role_tests {
        use super::*;

        #[test]
        fn test_roles_and_names() {
            let doc = Document::parse(
                r#"<nav aria-label="Main"><a href="/">Home</a></nav>
                   <span>plain</span>
                   <button aria-hidden="true">Gone</button>"#,
            );
            let report = execute_role(&doc, &RoleArgs { file: "-".into(), selector: "nav, a, span, button".to_string() }).unwrap();
            let roles: Vec<_> = report.elements.iter().map(|e| e.element.role).collect();
            assert_eq!(
                roles,
                [Some(AriaRole::Navigation), Some(AriaRole::Link), None, Some(AriaRole::Button)]
            );
            assert_eq!(
                report.text_lines(&Styler::new(false)),
                [
                    "<nav> {navigation 'Main'}",
                    "<a> {link 'Home'}",
                    "<span> (no role)",
                    "<button> (no role) (hidden)",
                ]
            );
        }

        #[test]
        fn test_attribute_values() {
            let doc = Document::parse(
                r#"<ul><li>a</li><li aria-current="step">b</li></ul>
                   <input type=checkbox checked disabled>"#,
            );
            let report = execute_role(&doc, &RoleArgs { file: "-".into(), selector: "li, input".to_string() }).unwrap();
            let attributes: Vec<_> = report.elements.iter().map(|e| e.attributes.join(" ")).collect();
            assert_eq!(attributes, ["posinset:1", "current:step posinset:2", "checked:true disabled:true"]);
        }
    }

    mod parse_tests {
        use super::*;

        #[test]
        fn test_canonical_form() {
            let report = execute_parse(&ParseArgs {
                locator: "  {list}   outer {listitem \"It's\"  checked:true}".to_string(),
                quote: None,
            })
            .unwrap();
            assert_eq!(report.canonical, "{list} outer {listitem \"It's\" checked:true}");
            assert_eq!(report.pre_outer.len(), 1);
            assert_eq!(report.post_outer[0].role, "listitem");
            assert_eq!(report.post_outer[0].name.as_deref(), Some("It's"));
            assert_eq!(report.post_outer[0].attributes, ["checked:true"]);
        }

        #[test]
        fn test_forced_quote() {
            let report = execute_parse(&ParseArgs {
                locator: "{button 'OK'}".to_string(),
                quote: Some(QuoteArg::Double),
            })
            .unwrap();
            assert_eq!(report.canonical, "{button \"OK\"}");
        }

        #[test]
        fn test_invalid_locator() {
            let err = execute_parse(&ParseArgs { locator: "{nope}".to_string(), quote: None }).unwrap_err();
            assert!(matches!(err, CliError::Semloc(_)));
        }
    }
}
