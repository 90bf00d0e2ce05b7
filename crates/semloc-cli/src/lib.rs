//! Semloc CLI Library
//!
//! Command-line interface for resolving and generating semantic locators
//! against HTML files.

#![warn(missing_docs)]
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod logging;
mod output;

pub use commands::{
    BatchArgs, BatchModeArg, Cli, ColorArg, Commands, FindArgs, FormatArg, GenerateArgs, ModeArg,
    ParseArgs, QuoteArg, RoleArgs,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{OutputFormat, Report, Reporter, Styler};

/// Build configuration from parsed arguments
#[must_use]
pub fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = if cli.quiet {
        Verbosity::Quiet
    } else {
        match cli.verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    };

    CliConfig::new()
        .with_verbosity(verbosity)
        .with_color(cli.color.into())
        .with_format(cli.format.into())
        .with_json_logs(cli.json_logs)
}

/// Run a parsed command line, printing results through `reporter`
pub fn run(cli: &Cli, reporter: &Reporter) -> CliResult<()> {
    match &cli.command {
        Commands::Find(args) => {
            let doc = handlers::load_document(&args.file)?;
            let report = handlers::execute_find(&doc, args)?;
            if let Some(explanation) = &report.explanation {
                reporter.warning(explanation);
            }
            reporter.emit(&report)
        }
        Commands::Generate(args) => {
            let doc = handlers::load_document(&args.file)?;
            reporter.emit(&handlers::execute_generate(&doc, args)?)
        }
        Commands::Batch(args) => {
            let doc = handlers::load_document(&args.file)?;
            let report = handlers::execute_batch(&doc, args)?;
            if report.timed_out() {
                reporter.warning(&format!(
                    "Timed out after {} of {} elements",
                    report.entries.len(),
                    report.total
                ));
            }
            reporter.emit(&report)
        }
        Commands::Role(args) => {
            let doc = handlers::load_document(&args.file)?;
            reporter.emit(&handlers::execute_role(&doc, args)?)
        }
        Commands::Parse(args) => reporter.emit(&handlers::execute_parse(args)?),
    }
}
