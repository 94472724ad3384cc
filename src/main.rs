//! sitebuilder - static site builder with a ledger of published URLs.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use sitebuilder::{
    BuildOptions, SiteConfig,
    cli::{BuildArgs, Cli, Commands},
    config::resolve_root,
    log, logger,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    match cli.command {
        Commands::Build { build_args } => {
            logger::set_verbose(build_args.verbose);

            match load_config(cli.root.as_deref(), &build_args) {
                Ok(config) => {
                    let options = BuildOptions::new(config).quiet(build_args.quiet);
                    ExitCode::from(sitebuilder::run(&options))
                }
                Err(e) => {
                    log!("error"; "{:#}", e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

/// Resolve the project root and load its config, applying CLI overrides.
fn load_config(root: Option<&Path>, args: &BuildArgs) -> Result<SiteConfig> {
    let root = resolve_root(root)?;
    let mut config = SiteConfig::load(&root)?;
    if let Some(jobs) = args.jobs {
        config.build.jobs = jobs;
    }
    Ok(config)
}
