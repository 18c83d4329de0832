// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Ollama chat transport
//!
//! Implements ChatTransport for Ollama's non-streaming /api/chat endpoint.
//! Every call is a single POST carrying the full conversation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, DoqqError, Result};
use crate::llm::message::Turn;
use crate::llm::provider::{ChatRequest, ChatTransport};

pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434/api/chat";

/// Ollama chat transport
pub struct OllamaTransport {
    client: Client,
    endpoint: String,
}

impl OllamaTransport {
    /// Create a transport for the given /api/chat URL
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Create a transport whose requests give up after `timeout`
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DoqqError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Check if Ollama is running and reachable
    pub async fn health_check(&self) -> Result<bool> {
        let url = self.sibling_url("/api/tags")?;
        match self.client.get(url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => Err(self.classify(e).into()),
        }
    }

    /// List models pulled on the Ollama server
    pub async fn list_local_models(&self) -> Result<Vec<String>> {
        let url = self.sibling_url("/api/tags")?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.classify(e))?;
        if !status.is_success() {
            return Err(parse_error(status.as_u16(), &body));
        }

        let tags: OllamaTagsResponse = serde_json::from_str(&body)
            .map_err(|e| ApiError::MalformedResponse(format!("model list: {}", e)))?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Resolve another API path on the same host as the chat endpoint
    fn sibling_url(&self, path: &str) -> Result<Url> {
        let base = Url::parse(&self.endpoint)
            .map_err(|e| DoqqError::Config(format!("invalid endpoint {}: {}", self.endpoint, e)))?;
        base.join(path)
            .map_err(|e| DoqqError::Config(format!("invalid endpoint {}: {}", self.endpoint, e)))
    }

    fn classify(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() {
            ApiError::Transport(format!(
                "cannot reach {}. Start the Ollama app or run 'ollama serve'",
                self.endpoint
            ))
        } else {
            ApiError::Transport(err.to_string())
        }
    }

    /// Build the request body
    fn build_request(request: &ChatRequest) -> OllamaRequest {
        OllamaRequest {
            model: request.model.clone(),
            messages: request.messages.iter().map(OllamaMessage::from).collect(),
            stream: false,
        }
    }
}

impl Default for OllamaTransport {
    fn default() -> Self {
        Self::new(DEFAULT_OLLAMA_ENDPOINT)
    }
}

#[async_trait]
impl ChatTransport for OllamaTransport {
    fn name(&self) -> &str {
        "ollama"
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, request: &ChatRequest) -> Result<String> {
        let body = Self::build_request(request);
        tracing::trace!(
            model = %body.model,
            messages = body.messages.len(),
            "POST {}",
            self.endpoint
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.classify(e))?;

        if status != StatusCode::OK {
            return Err(parse_error(status.as_u16(), &text));
        }

        parse_reply(&text)
    }
}

/// Extract `message.content` from a successful response body
fn parse_reply(body: &str) -> Result<String> {
    let parsed: OllamaResponse = serde_json::from_str(body).map_err(|e| {
        ApiError::MalformedResponse(format!("expected message.content in body: {}", e))
    })?;
    Ok(parsed.message.content)
}

/// Parse an error response
fn parse_error(status: u16, body: &str) -> DoqqError {
    match serde_json::from_str::<OllamaError>(body) {
        Ok(error_response) => {
            let message = error_response.error;
            if message.contains("model") && message.contains("not found") {
                ApiError::ModelNotFound(message).into()
            } else {
                ApiError::Remote { status, message }.into()
            }
        }
        Err(_) => ApiError::Remote {
            status,
            message: body.to_string(),
        }
        .into(),
    }
}

// ===== Ollama API wire types =====

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

impl From<&Turn> for OllamaMessage {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role.as_str().to_string(),
            content: turn.content.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: OllamaReplyMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaReplyMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct OllamaError {
    error: String,
}

#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Debug, Deserialize)]
struct OllamaModel {
    name: String,
}
