//! Generate and batch command handlers

use super::{select_one, ElementSummary};
use crate::commands::{BatchArgs, GenerateArgs, QuoteArg};
use crate::error::CliResult;
use crate::output::{Report, Styler};
use semloc::{
    batch_generate, generate_locator, BatchOptions, Document, GenerateOptions, GeneratorMode,
};
use serde::Serialize;
use std::time::Duration;
use tracing::info;

/// A locator generated for one element
#[derive(Debug, Clone, Serialize)]
pub struct GenerateReport {
    /// Generator used
    pub mode: GeneratorMode,
    /// The selected element
    pub element: ElementSummary,
    /// The locator, absent when the element can't be described
    pub locator: Option<String>,
}

impl Report for GenerateReport {
    fn text_lines(&self, styler: &Styler) -> Vec<String> {
        vec![self.locator.as_deref().map_or_else(
            || styler.dim(&format!("No {} locator for {}", self.mode, self.element.label())),
            |locator| styler.locator(locator),
        )]
    }
}

/// One element of a batch
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    /// The element
    pub element: ElementSummary,
    /// Its locator, if any
    pub locator: Option<String>,
}

/// Locators generated for many elements
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Generator used
    pub mode: GeneratorMode,
    /// Elements selected
    pub total: usize,
    /// Elements processed before the deadline, in document order
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    /// Whether the deadline cut the batch short
    #[must_use]
    pub fn timed_out(&self) -> bool {
        self.entries.len() < self.total
    }
}

impl Report for BatchReport {
    fn text_lines(&self, styler: &Styler) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| {
                let locator = entry
                    .locator
                    .as_deref()
                    .map_or_else(|| styler.dim("-"), |locator| styler.locator(locator));
                format!("{} {locator}", styler.element(&entry.element.label()))
            })
            .collect()
    }
}

fn generate_options(doc: &Document, root: Option<&str>, quote: Option<QuoteArg>) -> CliResult<GenerateOptions> {
    let mut options = GenerateOptions::new();
    if let Some(css) = root {
        options = options.with_root(select_one(doc, css)?.id());
    }
    if let Some(quote) = quote {
        options = options.with_quote_char(quote.into());
    }
    Ok(options)
}

/// Execute the generate command
pub fn execute_generate(doc: &Document, args: &GenerateArgs) -> CliResult<GenerateReport> {
    let element = select_one(doc, &args.selector)?;
    let options = generate_options(doc, args.root.as_deref(), args.quote)?;
    let mode = GeneratorMode::from(args.mode);
    let locator = generate_locator(element, mode, &options)?;
    Ok(GenerateReport {
        mode,
        element: ElementSummary::of(element),
        locator,
    })
}

/// Execute the batch command
pub fn execute_batch(doc: &Document, args: &BatchArgs) -> CliResult<BatchReport> {
    let elements = doc.query_selector_all(&args.selector)?;
    let mut options = BatchOptions::new().with_generate(generate_options(doc, args.root.as_deref(), args.quote)?);
    if let Some(ms) = args.timeout_ms {
        options = options.with_timeout(Duration::from_millis(ms));
    }
    let mode = GeneratorMode::from(args.mode);
    let mut locators = batch_generate(&elements, mode, &options)?;

    let entries: Vec<BatchEntry> = elements
        .iter()
        .filter_map(|element| {
            let locator = locators.remove(&element.id())?;
            Some(BatchEntry {
                element: ElementSummary::of(*element),
                locator,
            })
        })
        .collect();
    info!(%mode, total = elements.len(), processed = entries.len(), "batch complete");

    Ok(BatchReport {
        mode,
        total: elements.len(),
        entries,
    })
}
