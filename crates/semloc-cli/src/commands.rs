//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use semloc::{GeneratorMode, QuoteChar};
use std::path::PathBuf;

/// Semloc: find and generate semantic locators in HTML documents
#[derive(Parser, Debug)]
#[command(name = "semloc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress everything but results and errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Result format
    #[arg(long, default_value = "text", global = true)]
    pub format: FormatArg,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find the elements matching a semantic locator
    Find(FindArgs),

    /// Generate a semantic locator for the element matching a CSS selector
    Generate(GenerateArgs),

    /// Generate semantic locators for every element matching a CSS selector
    Batch(BatchArgs),

    /// Show the role and accessible name of elements matching a CSS selector
    Role(RoleArgs),

    /// Check a semantic locator and print its canonical form
    Parse(ParseArgs),
}

/// Arguments for the find command
#[derive(Parser, Debug)]
pub struct FindArgs {
    /// HTML file to search (`-` for stdin)
    pub file: PathBuf,

    /// Semantic locator, e.g. "{list} {button 'OK'}"
    pub locator: String,

    /// CSS selector of the element to search within
    #[arg(long)]
    pub root: Option<String>,

    /// Return only the first match, failing with an explanation if none
    #[arg(long)]
    pub one: bool,

    /// Also match hidden elements
    #[arg(long)]
    pub include_hidden: bool,

    /// Also match presentational elements
    #[arg(long)]
    pub include_presentational: bool,
}

/// Arguments for the generate command
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// HTML file to read (`-` for stdin)
    pub file: PathBuf,

    /// CSS selector of the target element
    pub selector: String,

    /// Generator to use
    #[arg(short, long, default_value = "closest-precise")]
    pub mode: ModeArg,

    /// CSS selector of the element to generate relative to
    #[arg(long)]
    pub root: Option<String>,

    /// Quote character for names
    #[arg(long)]
    pub quote: Option<QuoteArg>,
}

/// Arguments for the batch command
#[derive(Parser, Debug)]
pub struct BatchArgs {
    /// HTML file to read (`-` for stdin)
    pub file: PathBuf,

    /// CSS selector of the target elements
    #[arg(default_value = "body *")]
    pub selector: String,

    /// Generator to use
    #[arg(short, long, default_value = "closest-precise")]
    pub mode: BatchModeArg,

    /// CSS selector of the element to generate relative to
    #[arg(long)]
    pub root: Option<String>,

    /// Quote character for names
    #[arg(long)]
    pub quote: Option<QuoteArg>,

    /// Stop after this many milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

/// Arguments for the role command
#[derive(Parser, Debug)]
pub struct RoleArgs {
    /// HTML file to read (`-` for stdin)
    pub file: PathBuf,

    /// CSS selector of the elements to inspect
    pub selector: String,
}

/// Arguments for the parse command
#[derive(Parser, Debug)]
pub struct ParseArgs {
    /// Semantic locator to check
    pub locator: String,

    /// Quote character for names in the canonical form
    #[arg(long)]
    pub quote: Option<QuoteArg>,
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Result format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum FormatArg {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
}

impl From<FormatArg> for crate::output::OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}

/// Generator mode argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModeArg {
    /// Most precise locator, nothing if the element has no role
    Precise,
    /// Most precise locator for the closest element with a role
    #[default]
    ClosestPrecise,
    /// Role and name of the element only
    Simple,
    /// Role and name of the closest element with a role
    ClosestSimple,
}

impl From<ModeArg> for GeneratorMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Precise => Self::Precise,
            ModeArg::ClosestPrecise => Self::ClosestPrecise,
            ModeArg::Simple => Self::Simple,
            ModeArg::ClosestSimple => Self::ClosestSimple,
        }
    }
}

/// Generator modes available in batches
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BatchModeArg {
    /// Most precise locator, nothing if the element has no role
    Precise,
    /// Most precise locator for the closest element with a role
    #[default]
    ClosestPrecise,
    /// Role and name of the closest element with a role
    ClosestSimple,
}

impl From<BatchModeArg> for GeneratorMode {
    fn from(arg: BatchModeArg) -> Self {
        match arg {
            BatchModeArg::Precise => Self::Precise,
            BatchModeArg::ClosestPrecise => Self::ClosestPrecise,
            BatchModeArg::ClosestSimple => Self::ClosestSimple,
        }
    }
}

/// Quote character argument
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuoteArg {
    /// `'`
    Single,
    /// `"`
    Double,
}

impl From<QuoteArg> for QuoteChar {
    fn from(arg: QuoteArg) -> Self {
        match arg {
            QuoteArg::Single => Self::Single,
            QuoteArg::Double => Self::Double,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("semloc").chain(args.iter().copied())).unwrap()
    }

    mod cli_tests {
        use super::*;

        #[test]
        fn test_global_flags() {
            let cli = parse(&["-vv", "--format", "json", "parse", "{button}"]);
            assert_eq!(cli.verbose, 2);
            assert!(matches!(cli.format, FormatArg::Json));
            assert!(matches!(cli.command, Commands::Parse(_)));
        }

        #[test]
        fn test_requires_subcommand() {
            assert!(Cli::try_parse_from(["semloc"]).is_err());
        }

        #[test]
        fn test_command_factory_is_consistent() {
            use clap::CommandFactory;
            Cli::command().debug_assert();
        }
    }

    mod find_tests {
        use super::*;

        #[test]
        fn test_find_args() {
            let cli = parse(&["find", "page.html", "{button 'OK'}", "--root", "#main", "--one"]);
            let Commands::Find(args) = cli.command else {
                panic!("expected find");
            };
            assert_eq!(args.file, PathBuf::from("page.html"));
            assert_eq!(args.locator, "{button 'OK'}");
            assert_eq!(args.root.as_deref(), Some("#main"));
            assert!(args.one);
            assert!(!args.include_hidden);
        }
    }

    mod generate_tests {
        use super::*;

        #[test]
        fn test_generate_defaults() {
            let cli = parse(&["generate", "-", "#ok"]);
            let Commands::Generate(args) = cli.command else {
                panic!("expected generate");
            };
            assert_eq!(args.mode, ModeArg::ClosestPrecise);
            assert_eq!(args.quote, None);
        }

        #[test]
        fn test_generate_mode_and_quote() {
            let cli = parse(&["generate", "-", "#ok", "--mode", "closest-simple", "--quote", "double"]);
            let Commands::Generate(args) = cli.command else {
                panic!("expected generate");
            };
            assert_eq!(GeneratorMode::from(args.mode), GeneratorMode::ClosestSimple);
            assert_eq!(args.quote.map(QuoteChar::from), Some(QuoteChar::Double));
        }

        #[test]
        fn test_batch_rejects_simple() {
            assert!(Cli::try_parse_from(["semloc", "batch", "-", "--mode", "simple"]).is_err());
        }

        #[test]
        fn test_batch_defaults() {
            let cli = parse(&["batch", "page.html", "--timeout-ms", "50"]);
            let Commands::Batch(args) = cli.command else {
                panic!("expected batch");
            };
            assert_eq!(args.selector, "body *");
            assert_eq!(args.timeout_ms, Some(50));
        }
    }
}
