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

//! Configuration loading for the kaiwa CLI and orchestrator wiring.
//!
//! Settings come from `~/kaiwa/config.json`, with the provider credential
//! and endpoint overridable through `DEEPSEEK_API_KEY` and
//! `DEEPSEEK_BASE_URL`. A missing credential is a startup-fatal
//! [`ConfigError`], surfaced before the orchestrator is constructed.

mod schema;

pub use schema::{ChatDefaults, Config, ConfigError, ProviderConfig, ProvidersConfig};
