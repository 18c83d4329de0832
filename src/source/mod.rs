// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Payload sources
//!
//! A payload source enumerates the ordered units a crawl streams into a
//! chat session. Sources are lazy and restartable: every call to
//! `records()` starts again from the first unit. A unit that cannot be read
//! is yielded as an error and enumeration carries on with the next one.

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod ast;
pub mod directory;
pub mod functions;

pub use ast::{AstFunction, AstFunctionSource, FunctionKind};
pub use directory::DirectorySource;
pub use functions::{FunctionSource, FunctionSpan};

/// One streamed unit: a file, or a function cut out of a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadRecord {
    /// Display name (file name or function name)
    #[serde(rename = "file_name")]
    pub name: String,

    /// Location relative to the source root
    pub relative_path: String,

    /// Text content
    pub content: String,
}

impl PayloadRecord {
    pub fn new(
        name: impl Into<String>,
        relative_path: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            relative_path: relative_path.into(),
            content: content.into(),
        }
    }
}

/// Iterator type produced by payload sources
pub type PayloadIter<'a> = Box<dyn Iterator<Item = Result<PayloadRecord>> + Send + 'a>;

/// Enumerates payload records in a stable order
pub trait PayloadSource: Send + Sync {
    /// Short human-readable description for logs
    fn describe(&self) -> String;

    /// Enumerate records from the beginning
    fn records(&self) -> PayloadIter<'_>;
}

/// A fixed list of records, mostly useful for tests and piping
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    records: Vec<PayloadRecord>,
}

impl StaticSource {
    pub fn new(records: Vec<PayloadRecord>) -> Self {
        Self { records }
    }
}

impl PayloadSource for StaticSource {
    fn describe(&self) -> String {
        format!("{} in-memory records", self.records.len())
    }

    fn records(&self) -> PayloadIter<'_> {
        Box::new(self.records.iter().cloned().map(Ok))
    }
}
