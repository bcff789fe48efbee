//! # versed-app: Application Layer for Versed
//!
//! The UI-agnostic half of the app: everything a shell (mobile, desktop,
//! terminal) needs to drive the `versed-core` library, without any
//! rendering.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │                 Shell                    │
//! │  ┌───────────────────────────────────┐  │
//! │  │           versed-app              │  │
//! │  │  ┌──────────┐ ┌──────┐ ┌────────┐ │  │
//! │  │  │ AddForm  │ │ Quiz │ │  Dash  │ │  │
//! │  │  └────┬─────┘ └──┬───┘ └───┬────┘ │  │
//! │  │       └──────────┼─────────┘      │  │
//! │  │                  ▼                │  │
//! │  │    ┌─────────────────────────┐    │  │
//! │  │    │      versed-core        │    │  │
//! │  │    └─────────────────────────┘    │  │
//! │  └───────────────────────────────────┘  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `add_form`: the add-text form (fields, enablement, submit, reset)
//! - `quiz`: the quiz session state machine
//! - `dashboard`: badge, due count, text lists, next quiz
//! - `app`: `VersedApp`, bundling repository, config and UI state
//! - `telemetry`: tracing subscriber setup

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod add_form;
pub mod app;
pub mod dashboard;
pub mod quiz;
pub mod telemetry;

pub use add_form::{AddForm, FormField};
pub use app::VersedApp;
pub use quiz::{InputMode, PromptSense, QuizSession, QuizState};
