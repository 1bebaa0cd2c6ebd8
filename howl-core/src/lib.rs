//! # HOWL Core Library
//!
//! Platform-agnostic state for a conversational persona:
//!
//! - **Needs** — bounded body counters (hunger, thirst, bathroom, mood,
//!   intoxication, sickness) in a shared [`NeedStore`]
//! - **Catalogs** — the food and drink items the persona can be given, with
//!   toxic and alcoholic categories
//! - **Chat types** — messages, participants, and the role-tagged
//!   [`Conversation`] payload sent to a text backend
//! - **Configuration** — `howl.toml`
//!
//! Nothing in this crate performs I/O beyond reading a config file; message
//! fetching and generation live behind traits in `howl-persona` and
//! `howl-llm`.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod needs;
pub mod text;
pub mod types;

pub use catalog::Catalogs;
pub use config::HowlConfig;
pub use error::HowlError;
pub use needs::{Need, NeedSnapshot, NeedStore};
pub use types::*;
