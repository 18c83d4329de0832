// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Error types for doqq
//!
//! Session misuse, transport failures and payload read failures are kept
//! apart so callers can skip a bad chunk without hiding a broken session.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for doqq operations
#[derive(Error, Debug)]
pub enum DoqqError {
    /// `prime` was called on a session that already has history
    #[error("Session already has turns; priming must be the first turn")]
    NotFirstTurn,

    /// A chunk or end signal was sent in the wrong session phase
    #[error("Session not ready: {0}")]
    SessionNotReady(String),

    /// A query was sent before the end signal
    #[error("Session not finalized: queries are only accepted after the end signal")]
    SessionNotFinalized,

    /// Transport or remote endpoint errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// A payload source failed to read one record
    #[error("Failed to read payload {}: {message}", .path.display())]
    PayloadRead { path: PathBuf, message: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Errors raised while talking to the chat endpoint
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    /// Connection, DNS or other transport-level failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Timeout waiting for response
    #[error("Request timed out")]
    Timeout,

    /// Endpoint answered with a non-success status
    #[error("Remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    /// Endpoint answered 200 but the body was not a chat reply
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Requested model not pulled on the server
    #[error("Model not found: {0}")]
    ModelNotFound(String),
}

impl DoqqError {
    /// Build a payload read error for `path`
    pub fn payload_read(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        DoqqError::PayloadRead {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Whether this error is a session-ordering mistake rather than a runtime failure
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            DoqqError::NotFirstTurn
                | DoqqError::SessionNotReady(_)
                | DoqqError::SessionNotFinalized
        )
    }
}

impl ApiError {
    /// Whether the request never got a response from the endpoint
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_) | ApiError::Timeout)
    }
}

/// Result type alias for doqq operations
pub type Result<T> = std::result::Result<T, DoqqError>;

impl From<walkdir::Error> for DoqqError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(|p| p.to_path_buf()).unwrap_or_default();
        DoqqError::PayloadRead {
            path,
            message: err.to_string(),
        }
    }
}

impl From<glob::PatternError> for DoqqError {
    fn from(err: glob::PatternError) -> Self {
        DoqqError::Config(format!("invalid include pattern: {}", err))
    }
}
