// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Directory walk payload source
//!
//! Yields one record per regular file under a root, in file-name order.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::config::CrawlConfig;
use crate::error::{DoqqError, Result};
use crate::source::{PayloadIter, PayloadRecord, PayloadSource};

/// Files above this size are reported instead of streamed
pub const DEFAULT_MAX_FILE_BYTES: u64 = 1024 * 1024;

/// Directory names skipped by default
pub const DEFAULT_IGNORE_DIRS: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    "target",
    "node_modules",
    "build",
    "dist",
    "DerivedData",
    "Pods",
    "Carthage",
    ".build",
    ".swiftpm",
    "__pycache__",
    ".venv",
];

/// Streams every regular file below a root directory
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    ignore_dirs: HashSet<String>,
    include: Vec<glob::Pattern>,
    max_file_bytes: u64,
}

impl DirectorySource {
    /// Walk `root` with the default ignore list and no include filter
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ignore_dirs: DEFAULT_IGNORE_DIRS.iter().map(|d| d.to_string()).collect(),
            include: Vec::new(),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }

    /// Build a source from crawl settings
    pub fn from_config(root: impl Into<PathBuf>, config: &CrawlConfig) -> Result<Self> {
        Ok(Self::new(root)
            .with_ignore_dirs(config.ignore_dirs.iter().cloned())
            .with_include(&config.include)?
            .with_max_file_bytes(config.max_file_bytes))
    }

    /// Replace the set of ignored directory names
    pub fn with_ignore_dirs(mut self, dirs: impl IntoIterator<Item = String>) -> Self {
        self.ignore_dirs = dirs.into_iter().collect();
        self
    }

    /// Only stream files whose name or relative path matches one of `patterns`
    pub fn with_include(mut self, patterns: &[String]) -> Result<Self> {
        for pattern in patterns {
            self.include.push(glob::Pattern::new(pattern)?);
        }
        Ok(self)
    }

    pub fn with_max_file_bytes(mut self, max: u64) -> Self {
        self.max_file_bytes = max;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_ignored_dir(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && self
                .ignore_dirs
                .contains(entry.file_name().to_string_lossy().as_ref())
    }

    fn is_included(&self, path: &Path) -> bool {
        if self.include.is_empty() {
            return true;
        }
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let file_name = path.file_name().map(Path::new).unwrap_or(relative);
        self.include
            .iter()
            .any(|p| p.matches_path(file_name) || p.matches_path(relative))
    }

    /// Path below the root, rendered with a leading `/`
    fn relative_path(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let joined = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        format!("/{}", joined)
    }

    fn read_entry(&self, entry: &DirEntry) -> Result<PayloadRecord> {
        let path = entry.path();

        let size = entry
            .metadata()
            .map_err(|e| DoqqError::payload_read(path, e))?
            .len();
        if size > self.max_file_bytes {
            return Err(DoqqError::payload_read(
                path,
                format!(
                    "file is {} bytes, above the {} byte limit",
                    size, self.max_file_bytes
                ),
            ));
        }

        let content = std::fs::read_to_string(path).map_err(|e| DoqqError::payload_read(path, e))?;

        Ok(PayloadRecord {
            name: entry.file_name().to_string_lossy().into_owned(),
            relative_path: self.relative_path(path),
            content,
        })
    }
}

impl PayloadSource for DirectorySource {
    fn describe(&self) -> String {
        format!("directory {}", self.root.display())
    }

    fn records(&self) -> PayloadIter<'_> {
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| !self.is_ignored_dir(e));

        Box::new(walker.filter_map(move |entry| match entry {
            Err(e) => Some(Err(e.into())),
            Ok(entry) if !entry.file_type().is_file() => None,
            Ok(entry) if !self.is_included(entry.path()) => None,
            Ok(entry) => Some(self.read_entry(&entry)),
        }))
    }
}
