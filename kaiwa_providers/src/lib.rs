#![deny(
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

//! Completion-provider clients.
//!
//! Each provider implements [`kaiwa_core::CompletionProvider`] over an
//! HTTP chat-completions endpoint. Failures are normalized into
//! [`kaiwa_core::ProviderError`] with the transport cause preserved;
//! retry and backoff policy stays with the caller.

mod deepseek;

pub use deepseek::DeepSeekProvider;
