// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! doqq - natural language search over a code library through a local model.
//!
//! This crate exposes the runtime used by the `doqq` CLI (`src/main.rs`).
//!
//! Architecture highlights:
//! - `session`: ordered prime/chunk/finalize/query conversation and the crawl driver
//! - `source`: payload sources (directory walk, regex functions, SourceKit AST)
//! - `llm`: chat transport abstraction, Ollama transport and a scripted mock
//! - `annotate`: per-function documentation comments
//! - `config`: settings file, environment and flag overrides

pub mod annotate;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod session;
pub mod source;

pub use error::{DoqqError, Result};
