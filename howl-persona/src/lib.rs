//! # howl-persona — Persona Engine for HOWL
//!
//! Connects the platform-agnostic state in `howl-core` to a generation
//! backend from `howl-llm` and a host-provided [`MessageSource`].
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 Host (chat bot)              │
//! │   MessageSource            RequesterContext  │
//! └───────┬──────────────────────────┬───────────┘
//!         ▼                          ▼
//! ┌──────────────────────────────────────────────┐
//! │               PersonaEngine                  │
//! │  ┌──────────────────┐  ┌──────────────────┐  │
//! │  │ ContextAggregator│  │  ActionResolver  │  │
//! │  │   └ Summarizer   │  │   └ NeedStore    │  │
//! │  └────────┬─────────┘  └────────┬─────────┘  │
//! │           │   MediaPipeline     │            │
//! │           ▼         │           ▼            │
//! │  ┌──────────────────▼───────────────────┐    │
//! │  │        Generation (howl-llm)         │    │
//! │  └──────────────────────────────────────┘    │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `context` — payload assembly: windows, partition, summaries, transcript
//! - `sections` — the fixed-order system section builders
//! - `participants` — grouping a window by author
//! - `summarizer` — one best-effort summary per participant
//! - `actions` — eat / drink / alcohol over the need counters
//! - `media` — image prompts, audio, mood rating
//! - `source` — the message-source trait and an in-memory store
//! - `telemetry` — tracing subscriber setup

#![deny(clippy::unwrap_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod actions;
pub mod context;
pub mod engine;
pub mod error;
pub mod media;
pub mod participants;
pub mod sections;
pub mod source;
pub mod summarizer;
pub mod telemetry;

pub use actions::{ActionKind, ActionReply, ActionResolver, ActionTable, Outcome};
pub use context::ContextAggregator;
pub use engine::PersonaEngine;
pub use error::{PersonaError, Result};
pub use media::MediaPipeline;
pub use source::{MessageSource, StaticMessageSource};
pub use summarizer::Summarizer;
