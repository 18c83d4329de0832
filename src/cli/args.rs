// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CLI argument definitions using Clap
//!
//! Defines all command-line arguments and subcommands for doqq.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// doqq - search a code library in natural language through a local model
#[derive(Parser, Debug)]
#[command(name = "doqq")]
#[command(version, about = "Search a code library in natural language through a local model")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Settings file path (defaults to ~/.doqq/settings.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Chat endpoint URL, overriding settings and DOQQ_OLLAMA_URL
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Model name, overriding settings and DOQQ_MODEL
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream a source tree into the model, then answer questions about it
    Crawl(CrawlArgs),

    /// Add generated documentation comments to every function in a file
    Annotate(AnnotateArgs),

    /// List the functions of a SourceKit AST dump with their source text
    Functions(FunctionsArgs),

    /// List models available on the Ollama server
    Models,

    /// Show the effective settings
    Config(ConfigArgs),
}

/// Arguments for the crawl command
#[derive(clap::Args, Debug)]
pub struct CrawlArgs {
    /// Library root (defaults to session.source_root from settings)
    pub root: Option<PathBuf>,

    /// Only send files whose name matches this glob (repeatable)
    #[arg(short, long = "include")]
    pub include: Vec<String>,

    /// Question to ask once the library has been sent (repeatable); without
    /// any, questions are read from stdin
    #[arg(short, long = "query")]
    pub query: Vec<String>,
}

/// Arguments for the annotate command
#[derive(clap::Args, Debug)]
pub struct AnnotateArgs {
    /// Source file to annotate
    pub input: PathBuf,

    /// Output file (defaults to annotated.<ext> next to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the functions command
#[derive(clap::Args, Debug)]
pub struct FunctionsArgs {
    /// AST JSON produced by `sourcekitten structure`
    pub ast: PathBuf,

    /// Source file the AST was produced from
    pub source: PathBuf,
}

/// Arguments for the config command
#[derive(clap::Args, Debug)]
pub struct ConfigArgs {
    /// Write default settings to the settings path if no file exists
    #[arg(long)]
    pub init: bool,
}
