//! Find command handler

use super::{select_root, ElementSummary};
use crate::commands::FindArgs;
use crate::error::CliResult;
use crate::output::{Report, Styler};
use semloc::{
    find_by_semantic_locator, get_failure_message, parse, BatchContext, Document, FindOptions,
    LookupResult, SemlocError,
};
use serde::Serialize;
use tracing::info;

/// Elements matching a locator
#[derive(Debug, Clone, Serialize)]
pub struct FindReport {
    /// Canonical form of the locator
    pub locator: String,
    /// Matches in document order
    pub matches: Vec<ElementSummary>,
    /// Why nothing matched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Report for FindReport {
    /// One line per match. The explanation for an empty result is left
    /// to the caller, which prints it as a warning.
    fn text_lines(&self, styler: &Styler) -> Vec<String> {
        self.matches
            .iter()
            .map(|element| {
                let role = element.role.map_or_else(|| "-".to_string(), |role| role.to_string());
                format!(
                    "{} {}",
                    styler.element(&element.label()),
                    styler.dim(&format!("{role} {:?}", element.name))
                )
            })
            .collect()
    }
}

/// Execute the find command.
///
/// With `--one` an empty result is an error carrying the explanation;
/// otherwise the explanation is part of the report.
pub fn execute_find(doc: &Document, args: &FindArgs) -> CliResult<FindReport> {
    let locator = parse(&args.locator)?;
    let root = select_root(doc, args.root.as_deref())?;
    let options = FindOptions::default()
        .with_hidden(args.include_hidden)
        .with_presentational(args.include_presentational);

    let context = BatchContext::new();
    let _batch = context.begin()?;
    let (matches, explanation) = match find_by_semantic_locator(&context, &locator, root, options)? {
        LookupResult::Found(found) => {
            let found = if args.one { found.into_iter().take(1).collect() } else { found };
            (found, None)
        }
        LookupResult::Empty(metadata) => {
            let message = get_failure_message(&context, &locator, root, &metadata)?;
            if args.one {
                return Err(SemlocError::no_such_element(message).into());
            }
            (Vec::new(), Some(message))
        }
    };
    info!(%locator, matches = matches.len(), "find complete");

    Ok(FindReport {
        locator: locator.to_string(),
        matches: matches.into_iter().map(ElementSummary::of).collect(),
        explanation,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use semloc::AriaRole;

    const PAGE: &str = r#"
        <main id=main>
          <ul><li><button id=a>OK</button></li></ul>
          <button id=b>OK</button>
          <div hidden><button id=c>OK</button></div>
        </main>
        <footer><button id=d>OK</button></footer>"#;

    fn args(locator: &str) -> FindArgs {
        FindArgs {
            file: "-".into(),
            locator: locator.to_string(),
            root: None,
            one: false,
            include_hidden: false,
            include_presentational: false,
        }
    }

    fn ids(report: &FindReport) -> Vec<&str> {
        report.matches.iter().filter_map(|m| m.id.as_deref()).collect()
    }

    #[test]
    fn test_find_all() {
        let doc = Document::parse(PAGE);
        let report = execute_find(&doc, &args("{button  'OK'}")).unwrap();
        assert_eq!(report.locator, "{button 'OK'}");
        assert_eq!(ids(&report), ["a", "b", "d"]);
        assert_eq!(report.matches[0].role, Some(AriaRole::Button));
        assert!(report.explanation.is_none());
    }

    #[test]
    fn test_find_within_root_including_hidden() {
        let doc = Document::parse(PAGE);
        let report = execute_find(
            &doc,
            &FindArgs {
                root: Some("#main".to_string()),
                include_hidden: true,
                ..args("{button}")
            },
        )
        .unwrap();
        assert_eq!(ids(&report), ["a", "b", "c"]);
    }

    #[test]
    fn test_find_one() {
        let doc = Document::parse(PAGE);
        let report = execute_find(&doc, &FindArgs { one: true, ..args("{list} {button}") }).unwrap();
        assert_eq!(ids(&report), ["a"]);
    }

    #[test]
    fn test_empty_result_is_explained() {
        let doc = Document::parse(PAGE);
        let report = execute_find(&doc, &args("{button 'Cancel'}")).unwrap();
        assert!(report.matches.is_empty());
        let explanation = report.explanation.as_deref().unwrap();
        assert!(explanation.starts_with("Didn't find any elements matching semantic locator {button 'Cancel'}."));
        assert!(report.text_lines(&Styler::new(false)).is_empty());
    }

    #[test]
    fn test_find_one_without_match_fails() {
        let doc = Document::parse(PAGE);
        let err = execute_find(&doc, &FindArgs { one: true, ..args("{checkbox}") }).unwrap_err();
        let CliError::Semloc(err) = err else {
            panic!("expected a locator error, got {err}");
        };
        assert_eq!(err.kind(), semloc::ErrorKind::NoSuchElement);
    }

    #[test]
    fn test_invalid_locator() {
        let doc = Document::parse(PAGE);
        assert!(matches!(
            execute_find(&doc, &args("{button")).unwrap_err(),
            CliError::Semloc(SemlocError::InvalidLocator { .. })
        ));
    }

    #[test]
    fn test_text_lines() {
        let doc = Document::parse(PAGE);
        let report = execute_find(&doc, &FindArgs { one: true, ..args("{button}") }).unwrap();
        assert_eq!(report.text_lines(&Styler::new(false)), ["<button#a> button \"OK\""]);
    }
}
