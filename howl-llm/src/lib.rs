//! # howl-llm — Generation Layer for HOWL
//!
//! Provides one capability trait, [`Generation`], for everything the persona
//! engine asks a model to do, and a router that serves it from configured
//! backends:
//!   - **OpenAI-compatible API** (`/v1/chat/completions`, default)
//!   - **Ollama** (local, `/api/chat`)
//!   - **Vision** (image URL plus prompt, OpenAI-compatible backends only)
//!   - **HTTP image endpoint** (`{"prompt"}` in, image bytes out)
//!   - **HTTP audio endpoint** (`{"text"}` in, `{"file_name"}` out)
//!
//! Calls are single-shot with a per-request timeout. Callers decide what a
//! failure means: summaries drop out, replies surface the error.
//!
//! Prompt templates live in [`prompt`]; [`mock::ScriptedGeneration`] stands
//! in for a real backend in tests.

#![deny(clippy::unwrap_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod error;
pub mod generation;
pub mod mock;
pub mod prompt;
pub mod types;

pub use client::{GenerationRouter, MediaProvider, TextProvider};
pub use error::LlmError;
pub use generation::Generation;
pub use prompt::{PromptEngine, PromptId};
pub use types::{AudioArtifact, ImageArtifact, TextBackendKind};
