#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Persona conversation core: session state and the LLM turn cycle.
//!
//! Each conversation identity keeps an append-only transcript seeded with a
//! persona-defining system turn. [`TurnOrchestrator`] owns the per-turn
//! request cycle against the completion provider: append the user turn,
//! forward the full transcript, fold the assistant reply back in. A failed
//! provider call never reaches the stored transcript, so retrying the same
//! input is safe.

mod orchestrator;
mod persona;
mod store;

pub use orchestrator::{OrchestratorError, TurnOrchestrator, TurnReply};
pub use persona::PersonaPromptBuilder;
pub use store::{SessionId, SessionStore, Transcript};
