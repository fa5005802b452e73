//! codeshelf - Code Snippet Library
//!
//! Saves code snippets as real files, one folder per language, and keeps a
//! searchable index of their titles, tags and previews alongside them.

use codeshelf::{cli, logging};
use std::error::Error;

/// Application entry point
/// Installs error reporting and logging, then hands the arguments to the CLI.
fn main() -> Result<(), Box<dyn Error>> {
    color_eyre::install()?;
    logging::init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    cli::execute_cli(&args)?;

    Ok(())
}
