// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Mock chat transport for testing
//!
//! Provides a scripted implementation of the ChatTransport trait
//! that can be used in tests without a running Ollama server.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{ApiError, Result};
use crate::llm::provider::{ChatRequest, ChatTransport};

/// A scripted transport for testing
///
/// Outcomes are consumed in order, one per `send`. Once the script runs
/// out, every further call answers with the fallback reply.
#[derive(Clone)]
pub struct MockTransport {
    /// Scripted outcomes
    outcomes: Arc<Mutex<VecDeque<std::result::Result<String, ApiError>>>>,
    /// Reply used when the script is exhausted
    fallback: String,
    /// Call counter
    call_count: Arc<AtomicUsize>,
    /// Recorded requests
    recorded_requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("Mock transport lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

impl MockTransport {
    /// Create a mock transport that answers every request with "Mock response"
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            fallback: "Mock response".to_string(),
            call_count: Arc::new(AtomicUsize::new(0)),
            recorded_requests: Arc::new(Mutex::new(vec![])),
        }
    }

    /// Set the reply used once scripted outcomes run out
    pub fn with_fallback(mut self, text: impl Into<String>) -> Self {
        self.fallback = text.into();
        self
    }

    /// Queue a successful reply
    pub fn with_reply(self, text: impl Into<String>) -> Self {
        lock(&self.outcomes).push_back(Ok(text.into()));
        self
    }

    /// Queue multiple replies (returned in order)
    pub fn with_replies<I, S>(self, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        {
            let mut outcomes = lock(&self.outcomes);
            for text in texts {
                outcomes.push_back(Ok(text.into()));
            }
        }
        self
    }

    /// Queue a failure
    pub fn with_failure(self, error: ApiError) -> Self {
        lock(&self.outcomes).push_back(Err(error));
        self
    }

    /// Get the number of times send() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Get all recorded requests
    pub fn recorded_requests(&self) -> Vec<ChatRequest> {
        lock(&self.recorded_requests).clone()
    }

    /// Get the last request made
    pub fn last_request(&self) -> Option<ChatRequest> {
        lock(&self.recorded_requests).last().cloned()
    }

    fn next_outcome(&self) -> std::result::Result<String, ApiError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        lock(&self.outcomes)
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    fn endpoint(&self) -> &str {
        "mock://chat"
    }

    async fn send(&self, request: &ChatRequest) -> Result<String> {
        lock(&self.recorded_requests).push(request.clone());
        Ok(self.next_outcome()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DoqqError;

    #[tokio::test]
    async fn test_fallback_reply() {
        let transport = MockTransport::new();
        let reply = transport
            .send(&ChatRequest::single("mock-model", "hi"))
            .await
            .unwrap();
        assert_eq!(reply, "Mock response");
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_scripted_outcomes_in_order() {
        let transport = MockTransport::new()
            .with_replies(["one", "two"])
            .with_failure(ApiError::Timeout)
            .with_fallback("rest");

        let request = ChatRequest::single("mock-model", "hi");
        assert_eq!(transport.send(&request).await.unwrap(), "one");
        assert_eq!(transport.send(&request).await.unwrap(), "two");
        assert!(matches!(
            transport.send(&request).await,
            Err(DoqqError::Api(ApiError::Timeout))
        ));
        assert_eq!(transport.send(&request).await.unwrap(), "rest");
        assert_eq!(transport.call_count(), 4);
    }

    #[tokio::test]
    async fn test_records_requests() {
        let transport = MockTransport::new();
        transport
            .send(&ChatRequest::single("mock-model", "first"))
            .await
            .unwrap();
        transport
            .send(&ChatRequest::single("mock-model", "second"))
            .await
            .unwrap();

        assert_eq!(transport.recorded_requests().len(), 2);
        assert_eq!(
            transport.last_request().unwrap().last_content(),
            Some("second")
        );
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let transport = MockTransport::new().with_reply("shared");
        let clone = transport.clone();
        let reply = clone
            .send(&ChatRequest::single("mock-model", "hi"))
            .await
            .unwrap();
        assert_eq!(reply, "shared");
        assert_eq!(transport.call_count(), 1);
    }
}
