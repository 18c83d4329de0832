// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Function extraction from a SourceKit AST dump
//!
//! The dump is the JSON printed by `sourcekitten structure`: nested objects
//! with `key.kind`, `key.name`, `key.offset`, `key.length` and child nodes
//! under `key.substructure`. Offsets and lengths are byte positions into
//! the source file the dump was produced from.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{DoqqError, Result};
use crate::source::{PayloadIter, PayloadRecord, PayloadSource};

const SUBSTRUCTURE: &str = "key.substructure";

/// Kind of function declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Free,
    InstanceMethod,
    StaticMethod,
}

impl FunctionKind {
    /// Map a SourceKit `key.kind` value to a function kind
    pub fn from_sourcekit(kind: &str) -> Option<Self> {
        match kind {
            "source.lang.swift.decl.function.free" => Some(FunctionKind::Free),
            "source.lang.swift.decl.function.method.instance" => {
                Some(FunctionKind::InstanceMethod)
            }
            "source.lang.swift.decl.function.method.static" => Some(FunctionKind::StaticMethod),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FunctionKind::Free => "Free Function",
            FunctionKind::InstanceMethod => "Instance Method",
            FunctionKind::StaticMethod => "Static Method",
        }
    }
}

impl std::fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A function declaration found in the AST
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstFunction {
    pub name: String,
    pub kind: FunctionKind,
    pub offset: Option<usize>,
    pub length: Option<usize>,
}

impl AstFunction {
    /// Source text covered by this declaration, if the range is usable
    pub fn snippet<'a>(&self, source: &'a str) -> Option<&'a str> {
        let start = self.offset?;
        let end = start.checked_add(self.length?)?;
        source.get(start..end)
    }
}

/// Collect function declarations below `node`, depth-first in document order
pub fn extract_functions(node: &Value) -> Vec<AstFunction> {
    let mut functions = Vec::new();
    collect(node, &mut functions);
    functions
}

fn collect(node: &Value, out: &mut Vec<AstFunction>) {
    let Some(children) = node.get(SUBSTRUCTURE).and_then(Value::as_array) else {
        return;
    };

    for item in children {
        let kind = item
            .get("key.kind")
            .and_then(Value::as_str)
            .and_then(FunctionKind::from_sourcekit);
        if let Some(kind) = kind {
            out.push(AstFunction {
                name: item
                    .get("key.name")
                    .and_then(Value::as_str)
                    .unwrap_or("<anonymous>")
                    .to_string(),
                kind,
                offset: item
                    .get("key.offset")
                    .and_then(Value::as_u64)
                    .map(|v| v as usize),
                length: item
                    .get("key.length")
                    .and_then(Value::as_u64)
                    .map(|v| v as usize),
            });
        }
        collect(item, out);
    }
}

/// Render `Function: / Kind: / Source: / ---` blocks for each function
pub fn render_listing(functions: &[AstFunction], source: &str) -> String {
    let mut out = String::new();
    for func in functions {
        match func.snippet(source) {
            Some(snippet) => {
                out.push_str(&format!("Function: {}\n", func.name));
                out.push_str(&format!("Kind: {}\n", func.kind));
                out.push_str(&format!("Source: {}\n", snippet));
            }
            None => out.push_str(&format!(
                "Function: {} (Kind: {}) has invalid offset or length.\n",
                func.name, func.kind
            )),
        }
        out.push_str("---\n");
    }
    out
}

/// Parse an AST dump from disk
pub fn load_ast(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Streams the functions listed in an AST dump, cut out of the matching source
#[derive(Debug, Clone)]
pub struct AstFunctionSource {
    ast_path: PathBuf,
    source_path: PathBuf,
}

impl AstFunctionSource {
    pub fn new(ast_path: impl Into<PathBuf>, source_path: impl Into<PathBuf>) -> Self {
        Self {
            ast_path: ast_path.into(),
            source_path: source_path.into(),
        }
    }

    fn load(&self) -> Result<(Vec<AstFunction>, String)> {
        let ast = load_ast(&self.ast_path).map_err(|e| DoqqError::payload_read(&self.ast_path, e))?;
        let source = std::fs::read_to_string(&self.source_path)
            .map_err(|e| DoqqError::payload_read(&self.source_path, e))?;
        Ok((extract_functions(&ast), source))
    }
}

impl PayloadSource for AstFunctionSource {
    fn describe(&self) -> String {
        format!(
            "AST functions from {} in {}",
            self.ast_path.display(),
            self.source_path.display()
        )
    }

    fn records(&self) -> PayloadIter<'_> {
        let (functions, source) = match self.load() {
            Ok(loaded) => loaded,
            Err(e) => {
                let err: Result<PayloadRecord> = Err(e);
                return Box::new(std::iter::once(err));
            }
        };

        let relative_path = self.source_path.display().to_string();
        let records: Vec<Result<PayloadRecord>> = functions
            .into_iter()
            .map(|func| match func.snippet(&source) {
                Some(snippet) => Ok(PayloadRecord {
                    name: func.name,
                    relative_path: relative_path.clone(),
                    content: snippet.to_string(),
                }),
                None => Err(DoqqError::payload_read(
                    &self.source_path,
                    format!(
                        "function {} ({}) has invalid offset or length",
                        func.name, func.kind
                    ),
                )),
            })
            .collect();
        Box::new(records.into_iter())
    }
}
