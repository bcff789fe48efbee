//! # Versed Core Library
//!
//! Spaced-repetition memorisation of text passages: scripture, speech lines,
//! anything worth knowing by heart.
//!
//! A [`Passage`] is what the user enters: the goal text plus `before`/`after`
//! context and a reference. Its goal is split into [`Paragraph`]s, each
//! quizzed on its own schedule:
//!
//! - **Scheduler**: `good` grows the interval, `retry` makes it due again now
//! - **Cues**: the text shown around a paragraph while it is quizzed
//! - **Due queue**: which paragraph has been waiting longest
//! - **Store**: a typed repository over SQLite (or memory)
//! - **Seed**: example passages inserted on first launch

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod cue;
pub mod due;
pub mod error;
pub mod model;
pub mod scheduler;
pub mod seed;
pub mod store;
pub mod types;

pub use config::VersedConfig;
pub use error::VersedError;
pub use model::{Paragraph, Passage, PassageDraft};
pub use scheduler::Scheduler;
pub use store::Repository;
pub use types::*;
