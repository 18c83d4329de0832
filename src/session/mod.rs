// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Chunked-context chat session
//!
//! A `ChatSession` primes a model with an instruction turn, streams payload
//! chunks as numbered turns, closes the stream with an end signal and then
//! answers queries against everything it was sent.
//!
//! The chat endpoint keeps no state between requests, so every request
//! carries the full history. A turn is appended to the history only after
//! its reply has been received; a failed request leaves no trace. All
//! sending operations take `&mut self`, so one session never has two
//! requests in flight.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{DoqqError, Result};
use crate::llm::message::Turn;
use crate::llm::provider::{ChatRequest, ChatTransport};
use crate::llm::providers::OllamaTransport;
use crate::source::PayloadRecord;

pub mod chunk;
pub mod crawl;


pub use chunk::{encode_chunk_turn, is_chunk_turn, parse_chunk_turn};
pub use crawl::{stream_source, ChunkFailure, CrawlReport};

/// Named options a session is built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Chat endpoint URL
    pub endpoint: String,
    /// Model identifier
    pub model: String,
    /// Priming instruction text
    pub prime_instructions: String,
    /// End-of-stream marker text
    pub end_signal: String,
}

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing sent yet
    Unprimed,
    /// Instruction turn acknowledged, no chunks yet
    Primed,
    /// At least one chunk sent
    Streaming,
    /// End signal sent; queries accepted
    Completed,
}

/// Acknowledgement of a control turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    /// The assistant's reply to the control turn
    pub reply: String,
}

/// Ordered conversation with a stateless chat endpoint
pub struct ChatSession {
    endpoint: String,
    model_name: String,
    transport: Arc<dyn ChatTransport>,
    history: Vec<Turn>,
    phase: SessionPhase,
    /// `send_chunk` calls that passed the phase check, successful or not
    chunk_attempts: usize,
    chunks_sent: usize,
}

impl ChatSession {
    /// Create an empty session over `transport`
    pub fn new(model_name: impl Into<String>, transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            endpoint: transport.endpoint().to_string(),
            model_name: model_name.into(),
            transport,
            history: Vec::new(),
            phase: SessionPhase::Unprimed,
            chunk_attempts: 0,
            chunks_sent: 0,
        }
    }

    /// Create a session talking to Ollama at `config.endpoint`
    pub fn connect(config: &SessionConfig, timeout: Duration) -> Result<Self> {
        let transport = OllamaTransport::with_timeout(&config.endpoint, timeout)?;
        Ok(Self::new(&config.model, Arc::new(transport)))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Turns exchanged so far, oldest first
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn primed(&self) -> bool {
        self.phase != SessionPhase::Unprimed
    }

    pub fn completed(&self) -> bool {
        self.phase == SessionPhase::Completed
    }

    /// Number of chunks the endpoint acknowledged
    pub fn chunks_sent(&self) -> usize {
        self.chunks_sent
    }

    /// Send the instruction turn. Must be the first turn of the session.
    pub async fn prime(&mut self, instruction_text: &str) -> Result<Ack> {
        if !self.history.is_empty() {
            return Err(DoqqError::NotFirstTurn);
        }

        let reply = self.exchange(Turn::user(instruction_text)).await?;
        self.phase = SessionPhase::Primed;
        tracing::info!(target: "doqq.session", model = %self.model_name, "session primed");
        Ok(Ack { reply })
    }

    /// Send one payload as the next numbered chunk turn
    pub async fn send_chunk(&mut self, payload: &PayloadRecord) -> Result<String> {
        match self.phase {
            SessionPhase::Unprimed => {
                return Err(DoqqError::SessionNotReady(
                    "chunks can only be sent after priming".to_string(),
                ))
            }
            SessionPhase::Completed => {
                return Err(DoqqError::SessionNotReady(
                    "chunks cannot be sent after the end signal".to_string(),
                ))
            }
            SessionPhase::Primed | SessionPhase::Streaming => {}
        }

        self.chunk_attempts += 1;
        let index = self.chunk_attempts;
        let text = chunk::encode_chunk_turn(index, payload)?;

        tracing::debug!(
            target: "doqq.session",
            index,
            path = %payload.relative_path,
            bytes = payload.content.len(),
            "sending chunk"
        );

        let reply = self.exchange(Turn::user(text)).await?;
        self.chunks_sent += 1;
        self.phase = SessionPhase::Streaming;
        Ok(reply)
    }

    /// Send the end-of-stream signal, after which queries are accepted
    pub async fn finalize(&mut self, end_signal_text: &str) -> Result<Ack> {
        match self.phase {
            SessionPhase::Unprimed => {
                return Err(DoqqError::SessionNotReady(
                    "the end signal can only be sent after priming".to_string(),
                ))
            }
            SessionPhase::Completed => {
                return Err(DoqqError::SessionNotReady(
                    "the end signal was already sent".to_string(),
                ))
            }
            SessionPhase::Primed | SessionPhase::Streaming => {}
        }

        let reply = self.exchange(Turn::user(end_signal_text)).await?;
        self.phase = SessionPhase::Completed;
        tracing::info!(
            target: "doqq.session",
            chunks = self.chunks_sent,
            turns = self.history.len(),
            "session finalized"
        );
        Ok(Ack { reply })
    }

    /// Ask a question against the whole conversation
    pub async fn query(&mut self, question_text: &str) -> Result<String> {
        if !self.completed() {
            return Err(DoqqError::SessionNotFinalized);
        }
        self.exchange(Turn::user(question_text)).await
    }

    /// Send history plus `turn`; on success append both the turn and the reply
    async fn exchange(&mut self, turn: Turn) -> Result<String> {
        let mut messages = Vec::with_capacity(self.history.len() + 1);
        messages.extend(self.history.iter().cloned());
        messages.push(turn);
        let request = ChatRequest::new(&self.model_name, messages);

        let reply = self.transport.send(&request).await?;

        let ChatRequest { mut messages, .. } = request;
        if let Some(turn) = messages.pop() {
            self.history.push(turn);
        }
        self.history.push(Turn::assistant(reply.clone()));
        Ok(reply)
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("endpoint", &self.endpoint)
            .field("model_name", &self.model_name)
            .field("transport", &self.transport.name())
            .field("phase", &self.phase)
            .field("turns", &self.history.len())
            .finish()
    }
}
