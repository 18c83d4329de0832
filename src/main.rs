// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! doqq - natural language search over a code library
//!
//! Entry point for the doqq CLI application.

use clap::Parser;

use doqq::cli::{Cli, Commands};
use doqq::config::Settings;
use doqq::error::Result;

#[path = "main/cli_commands.rs"]
mod cli_commands;

use cli_commands::{run_annotate, run_config, run_crawl, run_functions, run_models};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing; a set `RUST_LOG` replaces the default and `-v` levels
    let env_filter = match std::env::var("RUST_LOG") {
        Ok(spec) if !spec.trim().is_empty() => tracing_subscriber::EnvFilter::new(spec),
        _ => tracing_subscriber::EnvFilter::new(log_directives(cli.verbose).join(",")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // Load settings; env vars override the file, flags override both
    let settings_path = cli.config.clone().unwrap_or_else(Settings::default_path);
    let mut settings = Settings::load_from(&settings_path)?;
    settings.apply_env_overrides();
    settings.apply_cli_overrides(cli.endpoint.as_deref(), cli.model.as_deref());
    settings.validate()?;

    match cli.command {
        Commands::Crawl(args) => run_crawl(args, &settings).await?,
        Commands::Annotate(args) => run_annotate(args, &settings).await?,
        Commands::Functions(args) => run_functions(args)?,
        Commands::Models => run_models(&settings).await?,
        Commands::Config(args) => run_config(args, &settings, &settings_path)?,
    }

    Ok(())
}

/// Filter directives for the `-v` count: warnings by default, `-v` adds
/// session and crawl progress, `-vv` everything doqq logs
fn log_directives(verbose: u8) -> &'static [&'static str] {
    match verbose {
        0 => &["warn"],
        1 => &["warn", "doqq.session=debug", "doqq.crawl=debug", "doqq=info"],
        _ => &["warn", "doqq=trace"],
    }
}
