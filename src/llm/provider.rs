// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Chat transport trait and request type
//!
//! A transport performs exactly one request per call. It holds no
//! conversation state; the caller sends the whole history every time.

use async_trait::async_trait;

use crate::error::Result;
use crate::llm::message::Turn;

/// Sends a fully formed conversation to a chat endpoint
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Transport name (e.g. "ollama")
    fn name(&self) -> &str;

    /// Address requests are sent to
    fn endpoint(&self) -> &str;

    /// Send one request and return the assistant's reply text
    async fn send(&self, request: &ChatRequest) -> Result<String>;
}

/// One non-streaming chat request
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Model to use
    pub model: String,

    /// Ordered conversation, oldest first
    pub messages: Vec<Turn>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Turn>) -> Self {
        Self {
            model: model.into(),
            messages,
        }
    }

    /// Single-turn request with no prior history
    pub fn single(model: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(model, vec![Turn::user(content)])
    }

    /// Content of the newest turn
    pub fn last_content(&self) -> Option<&str> {
        self.messages.last().map(|t| t.content.as_str())
    }
}
