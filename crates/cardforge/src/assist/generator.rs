//! Field generator trait and request type.

use serde::{Deserialize, Serialize};

use super::cancel::CancellationToken;
use crate::error::Result;

/// One generation request. Prompt text is built by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Optional system message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// The user prompt.
    pub prompt: String,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
        }
    }

    /// Add a system message.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// Trait for text generation providers.
///
/// Implementations must be thread-safe (Send + Sync) so a generator can be
/// shared between editor actions.
pub trait FieldGenerator: Send + Sync {
    /// Produce text for `request`.
    ///
    /// Returns [`CardError::Cancelled`](crate::CardError::Cancelled) if
    /// `token` is cancelled before the text is handed back; the result of a
    /// cancelled request is never returned.
    fn generate(&self, request: &GenerationRequest, token: &CancellationToken) -> Result<String>;

    /// Provider name for display.
    fn name(&self) -> &str;
}
