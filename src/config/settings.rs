// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Settings management for doqq
//!
//! Handles loading and saving settings from ~/.doqq/settings.json

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::llm::providers::ollama::DEFAULT_OLLAMA_ENDPOINT;
use crate::session::SessionConfig;
use crate::source::directory::{DEFAULT_IGNORE_DIRS, DEFAULT_MAX_FILE_BYTES};

mod io;
mod validation;

pub use validation::{ENV_MODEL, ENV_OLLAMA_URL};

/// Placeholder in the priming text replaced by the configured end signal
pub const END_SIGNAL_PLACEHOLDER: &str = "{end_signal}";

/// Main settings structure, stored in ~/.doqq/settings.json
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Settings {
    /// Ollama server configuration
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Chunked session configuration
    #[serde(default)]
    pub session: SessionSettings,

    /// Directory crawl configuration
    #[serde(default)]
    pub crawl: CrawlConfig,

    /// Documentation annotation configuration
    #[serde(default)]
    pub annotate: AnnotateConfig,
}

/// Ollama server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OllamaConfig {
    /// Chat endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model to chat with
    #[serde(default = "default_model")]
    pub model: String,

    /// Per-request timeout in seconds. Whole-history requests to a local
    /// model can take minutes once many chunks have been sent.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Chunked session configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSettings {
    /// Instruction text sent as the first turn. `{end_signal}` is replaced
    /// with `end_signal`.
    #[serde(default = "default_prime_instructions")]
    pub prime_instructions: String,

    /// Marker sent once every chunk has been streamed
    #[serde(default = "default_end_signal")]
    pub end_signal: String,

    /// Directory crawled when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<PathBuf>,
}

/// Directory crawl configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrawlConfig {
    /// Directory names never descended into
    #[serde(default = "default_ignore_dirs")]
    pub ignore_dirs: Vec<String>,

    /// Glob patterns a file name must match; empty means every file
    #[serde(default)]
    pub include: Vec<String>,

    /// Files larger than this are reported and skipped
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
}

/// Documentation annotation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnnotateConfig {
    /// Language named in the documentation request
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_endpoint() -> String {
    DEFAULT_OLLAMA_ENDPOINT.to_string()
}

fn default_model() -> String {
    "llama3".to_string()
}

fn default_request_timeout_secs() -> u64 {
    300
}

fn default_prime_instructions() -> String {
    "From now on act as my code search agent for a library I am about to share with you. \
     I will send the code in numbered chunks over the following messages; each chunk is a \
     JSON object with the file name, its path relative to the library root and its content. \
     Acknowledge each chunk briefly. Once I send the end signal, which is: {end_signal}, \
     answer natural language questions such as 'code that changes the navigation bar to \
     green' by pointing at the chunks, files and code that do the same or similar things."
        .to_string()
}

fn default_end_signal() -> String {
    "!END!".to_string()
}

fn default_ignore_dirs() -> Vec<String> {
    DEFAULT_IGNORE_DIRS.iter().map(|d| d.to_string()).collect()
}

fn default_max_file_bytes() -> u64 {
    DEFAULT_MAX_FILE_BYTES
}

fn default_language() -> String {
    "Swift".to_string()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            prime_instructions: default_prime_instructions(),
            end_signal: default_end_signal(),
            source_root: None,
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            ignore_dirs: default_ignore_dirs(),
            include: Vec::new(),
            max_file_bytes: default_max_file_bytes(),
        }
    }
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
        }
    }
}

impl SessionSettings {
    /// Priming text with the end signal filled in
    pub fn prime_text(&self) -> String {
        self.prime_instructions
            .replace(END_SIGNAL_PLACEHOLDER, &self.end_signal)
    }
}

impl Settings {
    /// Options a chat session is built from
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            endpoint: self.ollama.endpoint.clone(),
            model: self.ollama.model.clone(),
            prime_instructions: self.session.prime_text(),
            end_signal: self.session.end_signal.clone(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.ollama.request_timeout_secs)
    }
}
