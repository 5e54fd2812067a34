//! Per-turn orchestration against the completion provider.

use kaiwa_core::{CompletionOptions, CompletionProvider, ProviderError, SessionConfig, Turn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::store::{SessionId, SessionStore};

const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Failure of a single orchestration call.
///
/// Store and prompt-builder failures are programming errors and are not
/// modeled here; everything that can go wrong at runtime comes from the
/// provider boundary.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("completion provider failed: {0}")]
    Provider(#[from] ProviderError),
}

/// Reply of one successful orchestration call.
///
/// `translation` is an auxiliary slot kept in the interface for a
/// translation layer; the core itself never fills it.
#[derive(Debug, Clone)]
pub struct TurnReply {
    pub reply: String,
    pub translation: Option<String>,
}

/// Entry point for one conversation turn.
///
/// Resolves the session for the caller's config, appends the user turn,
/// forwards the full transcript to the provider, and folds the assistant
/// reply back into the stored transcript. On any provider failure nothing
/// is saved back, so the stored transcript never carries a dangling user
/// turn and retrying the same input is safe.
///
/// Calls are serialized per identity: at most one orchestration is in
/// flight for a given [`SessionId`] at a time, while distinct identities
/// never contend.
pub struct TurnOrchestrator {
    provider: Arc<dyn CompletionProvider>,
    store: Arc<SessionStore>,
    options: CompletionOptions,
    timeout: Duration,
    turn_locks: Mutex<HashMap<SessionId, Arc<tokio::sync::Mutex<()>>>>,
}

impl TurnOrchestrator {
    #[must_use]
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        store: Arc<SessionStore>,
        options: CompletionOptions,
    ) -> Self {
        Self {
            provider,
            store,
            options,
            timeout: DEFAULT_PROVIDER_TIMEOUT,
            turn_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Bound the provider round-trip; elapsing the deadline is a
    /// [`ProviderError::Timeout`] with no transcript mutation persisted.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run one turn cycle for `config` and return the assistant reply.
    ///
    /// Empty `user_text` is forwarded as-is; input validation is a caller
    /// concern.
    pub async fn respond(
        &self,
        user_text: &str,
        config: &SessionConfig,
    ) -> Result<TurnReply, OrchestratorError> {
        let id = SessionStore::identity_of(config);
        let slot = self.turn_lock(&id);
        let guard = slot.lock().await;

        let result = self.run_turn(&id, user_text, config).await;

        drop(guard);
        self.release_turn_lock(&id, &slot);
        result
    }

    async fn run_turn(
        &self,
        id: &SessionId,
        user_text: &str,
        config: &SessionConfig,
    ) -> Result<TurnReply, OrchestratorError> {
        let mut transcript = self.store.get_or_create(config);
        transcript.push(Turn::user(user_text));

        let turn_number = transcript.len() / 2;
        info!("Processing turn {turn_number} for session {id}");

        let reply = match tokio::time::timeout(
            self.timeout,
            self.provider.complete(&transcript.turns, &self.options),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                warn!("Provider call for session {id} timed out after {:?}", self.timeout);
                Err(ProviderError::Timeout(self.timeout))
            }
        }?;

        if reply.content.trim().is_empty() {
            return Err(ProviderError::EmptyReply.into());
        }

        if let Some(usage) = &reply.usage {
            debug!(
                "Tokens: {} prompt + {} completion = {} total",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        transcript.push(Turn::assistant(reply.content.clone()));
        self.store.save(id, transcript);

        debug!("Turn {turn_number} for session {id} completed");
        Ok(TurnReply {
            reply: reply.content,
            translation: None,
        })
    }

    /// Session store backing this orchestrator.
    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    fn turn_lock(&self, id: &SessionId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .turn_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks
            .entry(id.clone())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Drop the lock entry for `id` once no other call holds it, so the
    /// lock map only carries in-flight identities instead of every identity
    /// ever seen. Clones are only handed out under the map mutex, so
    /// checking the count under that same mutex cannot race a new waiter.
    fn release_turn_lock(&self, id: &SessionId, slot: &Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self
            .turn_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Two holders left: the map's entry and our local clone.
        if Arc::strong_count(slot) == 2 {
            locks.remove(id);
        }
    }
}
