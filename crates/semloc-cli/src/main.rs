//! Semloc CLI: semantic locators for HTML files
//!
//! ## Usage
//!
//! ```bash
//! semloc find page.html "{list} {button 'OK'}"   # Elements matching a locator
//! semloc generate page.html "#submit"              # Locator for an element
//! semloc batch page.html "main *" --timeout-ms 500 # Locators for many elements
//! semloc role page.html "nav a"                     # Roles and names
//! semloc parse "{button  'OK'}"                      # Canonical form
//! ```

use clap::Parser;
use semloc_cli::{build_config, logging, run, Cli, Reporter};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);
    logging::init_logging(&config);
    let reporter = Reporter::new(config.format, config.use_color(), config.verbosity.is_quiet());

    match run(&cli, &reporter) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
