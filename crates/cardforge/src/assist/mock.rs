//! Mock generator for testing.

use std::sync::Mutex;

use super::cancel::CancellationToken;
use super::generator::{FieldGenerator, GenerationRequest};
use crate::error::Result;

/// Generator that returns canned text and records the prompts it was sent.
pub struct MockGenerator {
    reply: String,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockGenerator {
    /// Create a mock that echoes a fixed placeholder reply.
    pub fn new() -> Self {
        Self::with_reply("Generated text")
    }

    /// Create a mock that always returns `reply`.
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldGenerator for MockGenerator {
    fn generate(&self, request: &GenerationRequest, token: &CancellationToken) -> Result<String> {
        token.check()?;
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        Ok(self.reply.clone())
    }

    fn name(&self) -> &str {
        "Mock"
    }
}
