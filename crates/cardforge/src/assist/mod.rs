//! AI-assisted field generation.
//!
//! The card editor can ask a chat-completion model to draft a field. This
//! module holds the pieces that sit around the model call:
//!
//! - [`FieldGenerator`] - the provider seam, with an OpenAI-compatible
//!   implementation covering OpenAI, Ollama and LM Studio
//! - [`CancellationToken`] - one per in-flight request, owned by the caller
//! - [`AssistSettings`] - provider settings persisted as JSON
//! - response shaping for lore-book entries and tag lists
//!
//! # Example
//!
//! ```no_run
//! use cardforge::assist::{AssistSettings, CancellationToken, GenerationRequest};
//!
//! let settings = AssistSettings::load("cardforge.settings.json").unwrap();
//! let generator = settings.build_generator().unwrap();
//! let token = CancellationToken::new();
//!
//! let request = GenerationRequest::new("Write a one-line tagline for a tired knight.");
//! let text = generator.generate(&request, &token).unwrap();
//! println!("{}", text);
//! ```

mod cancel;
mod generator;
mod mock;
mod openai;
mod response;
mod settings;

pub use cancel::CancellationToken;
pub use generator::{FieldGenerator, GenerationRequest};
pub use mock::MockGenerator;
pub use openai::OpenAiCompatibleGenerator;
pub use response::{ensure_ready_for_book_generation, parse_book_entry, parse_tags};
pub use settings::{AssistSettings, ProviderKind};
