//! apidoc-from-source - command-line tool extracting API descriptions from controller sources.
//!
//! # Usage
//!
//! ```bash
//! apidoc-from-source [OPTIONS] <PROJECT_PATH>
//! ```
//!
//! # Examples
//!
//! Extract every api of a project as YAML:
//! ```bash
//! apidoc-from-source ./my-service -o apis.yaml
//! ```
//!
//! Use a descriptor dump and a configuration file, publishing one JSON file per api:
//! ```bash
//! apidoc-from-source --catalog types.json -c apidoc.yaml -f json --publish-dir docs/
//! ```

use anyhow::Result;
use apidoc_from_source::cli;
use clap::Parser;
use log::info;

fn main() -> Result<()> {
    // Parse first so the verbose flag can pick the log level
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("apidoc-from-source starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("Api extraction completed successfully");
    Ok(())
}
