// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Best-effort streaming of a payload source into a session

use crate::error::{DoqqError, Result};
use crate::session::ChatSession;
use crate::source::{PayloadRecord, PayloadSource};

/// One payload that did not make it into the conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkFailure {
    pub name: String,
    pub path: String,
    pub error: String,
}

impl ChunkFailure {
    fn send(record: &PayloadRecord, error: &DoqqError) -> Self {
        Self {
            name: record.name.clone(),
            path: record.relative_path.clone(),
            error: error.to_string(),
        }
    }

    fn read(error: &DoqqError) -> Self {
        match error {
            DoqqError::PayloadRead { path, message } => Self {
                name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string()),
                path: path.display().to_string(),
                error: message.clone(),
            },
            other => Self {
                name: String::new(),
                path: String::new(),
                error: other.to_string(),
            },
        }
    }
}

/// Outcome of streaming a source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Chunks acknowledged by the endpoint
    pub sent: usize,
    /// Records that could not be read or sent, in source order
    pub failures: Vec<ChunkFailure>,
}

impl CrawlReport {
    pub fn attempted(&self) -> usize {
        self.sent + self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Stream every record of `source` into a primed, open session.
///
/// Read and send failures are logged and collected in the report; the next
/// record is still attempted. Only session-ordering errors abort the crawl.
pub async fn stream_source(
    session: &mut ChatSession,
    source: &dyn PayloadSource,
) -> Result<CrawlReport> {
    if !session.primed() {
        return Err(DoqqError::SessionNotReady(
            "a crawl needs a primed session".to_string(),
        ));
    }
    if session.completed() {
        return Err(DoqqError::SessionNotReady(
            "the session was already finalized".to_string(),
        ));
    }

    tracing::info!(target: "doqq.crawl", "streaming {}", source.describe());
    let mut report = CrawlReport::default();

    for item in source.records() {
        let record = match item {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(target: "doqq.crawl", "skipping unreadable payload: {}", e);
                report.failures.push(ChunkFailure::read(&e));
                continue;
            }
        };

        match session.send_chunk(&record).await {
            Ok(_) => {
                report.sent += 1;
                tracing::debug!(target: "doqq.crawl", path = %record.relative_path, "chunk acknowledged");
            }
            Err(e) if e.is_structural() => return Err(e),
            Err(e) => {
                tracing::warn!(
                    target: "doqq.crawl",
                    "failed to send {} ({}): {}",
                    record.name,
                    record.relative_path,
                    e
                );
                report.failures.push(ChunkFailure::send(&record, &e));
            }
        }
    }

    tracing::info!(
        target: "doqq.crawl",
        sent = report.sent,
        failed = report.failures.len(),
        "crawl finished"
    );
    Ok(report)
}
