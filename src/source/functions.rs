// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Regex-based function detection
//!
//! Finds Swift-style `func name(...) -> T {` headers and cuts each function
//! out of the file by balancing braces from the header's opening brace.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{DoqqError, Result};
use crate::source::{PayloadIter, PayloadRecord, PayloadSource};

static FUNCTION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"func\s+(\w+)\s*(?:<[^>]*>)?\s*\([^)]*\)[^{};]*\{")
        .expect("function header pattern is valid")
});

/// Byte range of one detected function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSpan {
    /// Function identifier
    pub name: String,
    /// Offset of `func`
    pub start: usize,
    /// Offset one past the closing brace
    pub end: usize,
}

impl FunctionSpan {
    pub fn text<'a>(&self, code: &'a str) -> &'a str {
        &code[self.start..self.end]
    }
}

/// Find every top-level function in `code`, in source order.
///
/// Headers found inside an already detected function body are skipped, so
/// nested functions travel with their parent. An unbalanced body runs to the
/// end of the file.
pub fn find_functions(code: &str) -> Vec<FunctionSpan> {
    let mut spans = Vec::new();
    let mut resume_at = 0;

    for caps in FUNCTION_HEADER.captures_iter(code) {
        let Some(header) = caps.get(0) else { continue };
        if header.start() < resume_at {
            continue;
        }
        let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();

        // The header match ends right after its `{`
        let end = matching_brace_end(code, header.end() - 1);
        spans.push(FunctionSpan {
            name: name.to_string(),
            start: header.start(),
            end,
        });
        resume_at = end;
    }

    spans
}

/// Offset one past the brace closing the one at `open`
fn matching_brace_end(code: &str, open: usize) -> usize {
    let mut depth = 0usize;
    for (i, c) in code[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return open + i + 1;
                }
            }
            _ => {}
        }
    }
    code.len()
}

/// Streams the functions of one source file, one record per function
#[derive(Debug, Clone)]
pub struct FunctionSource {
    path: PathBuf,
}

impl FunctionSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PayloadSource for FunctionSource {
    fn describe(&self) -> String {
        format!("functions in {}", self.path.display())
    }

    fn records(&self) -> PayloadIter<'_> {
        let code = match std::fs::read_to_string(&self.path) {
            Ok(code) => code,
            Err(e) => {
                let err: Result<PayloadRecord> = Err(DoqqError::payload_read(&self.path, e));
                return Box::new(std::iter::once(err));
            }
        };

        let relative_path = self.path.display().to_string();
        let records: Vec<Result<PayloadRecord>> = find_functions(&code)
            .into_iter()
            .map(|span| {
                Ok(PayloadRecord {
                    content: span.text(&code).to_string(),
                    name: span.name,
                    relative_path: relative_path.clone(),
                })
            })
            .collect();
        Box::new(records.into_iter())
    }
}
