//! Route composer - command-line tool for composing route manifests.
//!
//! Loads a route manifest (or a directory of them), composes the declared routes into a
//! shared resource tree, and prints either the tree or an OpenAPI 3.0 document.
//!
//! # Usage
//!
//! ```bash
//! route-composer [OPTIONS] <MANIFEST_PATH>
//! ```
//!
//! # Examples
//!
//! Generate an OpenAPI document as YAML:
//! ```bash
//! route-composer ./routes.yaml -o openapi.yaml
//! ```
//!
//! Dump the composed tree of a manifest directory as JSON:
//! ```bash
//! route-composer ./routes -r tree -f json
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use route_composer::cli;

fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("Route composer starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    Ok(())
}
