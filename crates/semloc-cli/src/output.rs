//! Output formatting
//!
//! Results go to stdout as text or JSON; notes and warnings go to stderr.

use crate::error::CliResult;
use console::{style, Term};
use serde::{Deserialize, Serialize};

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Text styling that degrades to plain text
#[derive(Debug, Clone, Copy, Default)]
pub struct Styler {
    /// Whether to use colors
    pub use_color: bool,
}

impl Styler {
    /// Create a styler
    #[must_use]
    pub const fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    /// A semantic locator
    #[must_use]
    pub fn locator(&self, text: &str) -> String {
        if self.use_color {
            style(text).green().bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// An element description
    #[must_use]
    pub fn element(&self, text: &str) -> String {
        if self.use_color {
            style(text).cyan().to_string()
        } else {
            text.to_string()
        }
    }

    /// Secondary detail
    #[must_use]
    pub fn dim(&self, text: &str) -> String {
        if self.use_color {
            style(text).dim().to_string()
        } else {
            text.to_string()
        }
    }
}

/// A command result that renders as text or JSON
pub trait Report: Serialize {
    /// Text lines for humans
    fn text_lines(&self, styler: &Styler) -> Vec<String>;
}

/// Writes results and notes
#[derive(Debug)]
pub struct Reporter {
    out: Term,
    err: Term,
    format: OutputFormat,
    styler: Styler,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(OutputFormat::Text, false, false)
    }
}

impl Reporter {
    /// Create a new reporter
    #[must_use]
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            format,
            styler: Styler::new(use_color),
            quiet,
        }
    }

    /// Render `report` in the configured format
    pub fn render(&self, report: &impl Report) -> CliResult<String> {
        Ok(match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report)?,
            OutputFormat::Text => report.text_lines(&self.styler).join("\n"),
        })
    }

    /// Write `report` to stdout
    pub fn emit(&self, report: &impl Report) -> CliResult<()> {
        let rendered = self.render(report)?;
        if !rendered.is_empty() {
            self.out.write_line(&rendered)?;
        }
        Ok(())
    }

    /// Print a note to stderr, unless quiet or producing JSON
    pub fn note(&self, message: &str) {
        if self.quiet || self.format == OutputFormat::Json {
            return;
        }
        let prefix = if self.styler.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };
        let _ = self.err.write_line(&format!("{prefix} {message}"));
    }

    /// Print a warning to stderr, unless quiet
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = if self.styler.use_color {
            style("⚠").yellow().bold().to_string()
        } else {
            "WARN".to_string()
        };
        let _ = self.err.write_line(&format!("{prefix} {message}"));
    }
}
