//! In-memory session state keyed by derived conversation identity.

use chrono::{DateTime, Utc};
use kaiwa_core::{SessionConfig, Turn};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, info};

use crate::persona::PersonaPromptBuilder;

const DEFAULT_MAX_SESSIONS: usize = 256;

/// Deterministic conversation identity derived from persona and speed.
///
/// Two configs with equal persona/speed pairs address the same transcript;
/// differing pairs are fully isolated. Language and gender do not
/// participate in identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Pure derivation; consults no mutable state.
    #[must_use]
    pub fn derive(config: &SessionConfig) -> Self {
        Self(format!("{}_{}", config.persona, config.speed))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Append-only ordered turn history for one conversation identity.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub turns: Vec<Turn>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transcript {
    fn seeded(system_turn: Turn) -> Self {
        let now = Utc::now();
        Self {
            turns: vec![system_turn],
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a turn. Existing turns are never removed or reordered.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
        self.updated_at = Utc::now();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

struct StoredSession {
    transcript: Transcript,
    last_used: Instant,
}

/// Keyed mapping from conversation identity to its transcript.
///
/// The store exclusively owns all transcripts; callers work on clones and
/// hand the updated copy back through [`SessionStore::save`]. The identity
/// count is bounded: inserting a new identity at the cap evicts the least
/// recently used one.
pub struct SessionStore {
    sessions: Mutex<HashMap<SessionId, StoredSession>>,
    max_sessions: usize,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_sessions(DEFAULT_MAX_SESSIONS)
    }

    #[must_use]
    pub fn with_max_sessions(max_sessions: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Deterministic identity derivation for `config`.
    #[must_use]
    pub fn identity_of(config: &SessionConfig) -> SessionId {
        SessionId::derive(config)
    }

    /// Look up the transcript for `config`, seeding a fresh one with the
    /// persona system turn on first use. Returns a working copy.
    pub fn get_or_create(&self, config: &SessionConfig) -> Transcript {
        let id = Self::identity_of(config);
        let mut sessions = self.lock();

        if let Some(stored) = sessions.get_mut(&id) {
            stored.last_used = Instant::now();
            return stored.transcript.clone();
        }

        if sessions.len() >= self.max_sessions {
            Self::evict_oldest(&mut sessions);
        }

        info!("Seeding new session: {id}");
        let transcript = Transcript::seeded(Turn::system(PersonaPromptBuilder::build(config)));
        sessions.insert(
            id,
            StoredSession {
                transcript: transcript.clone(),
                last_used: Instant::now(),
            },
        );
        transcript
    }

    /// Replace the stored transcript for `id` with the given working copy.
    pub fn save(&self, id: &SessionId, transcript: Transcript) {
        let mut sessions = self.lock();
        debug!("Saving session {id} ({} turns)", transcript.len());
        sessions.insert(
            id.clone(),
            StoredSession {
                transcript,
                last_used: Instant::now(),
            },
        );
    }

    /// Snapshot of the stored transcript for `id`, if present.
    #[must_use]
    pub fn transcript(&self, id: &SessionId) -> Option<Transcript> {
        self.lock().get(id).map(|s| s.transcript.clone())
    }

    /// Number of live conversation identities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn evict_oldest(sessions: &mut HashMap<SessionId, StoredSession>) {
        let oldest = sessions
            .iter()
            .min_by_key(|(_, s)| s.last_used)
            .map(|(id, _)| id.clone());
        if let Some(id) = oldest {
            info!("Session cap reached, evicting least recently used: {id}");
            sessions.remove(&id);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<SessionId, StoredSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
