//! Per-session conversation state and the store that keys it by session id.
//!
//! Each session sits behind its own async mutex: turns of one session run one
//! at a time, different sessions never share state.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, info};

use crate::conversation::extractor::{ExtractedField, JobInfo};
use crate::conversation::router::ChatReply;
use crate::posting::validation::JobPosting;

/// Older turns are dropped once a session holds this many.
const MAX_HISTORY_TURNS: usize = 20;

/// What the assistant did last; decides how the next message is routed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LastAction {
    #[default]
    None,
    ShowingPosting,
    HandlingResponse,
}

/// One user message and the assistant's reply to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub user: String,
    pub assistant: String,
}

/// Values promoted from extractions that cleared the acceptance threshold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccumulatedFields {
    pub role: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub experience: Option<String>,
    pub skills: Vec<String>,
}

impl AccumulatedFields {
    /// Promotes every accepted value from `info`. Rejected values leave the
    /// existing entry untouched.
    pub fn absorb(&mut self, info: &JobInfo) {
        promote(&mut self.role, &info.role);
        promote(&mut self.company, &info.company);
        promote(&mut self.location, &info.location);
        promote(&mut self.experience, &info.experience);
        if let Some(skills) = info.requirements.accepted() {
            for skill in skills {
                if !self.skills.contains(skill) {
                    self.skills.push(skill.clone());
                }
            }
        }
    }

    /// `info` with every accumulated value filled in at full confidence, so
    /// that earlier turns count when deciding what is still missing.
    pub fn overlay(&self, info: &JobInfo) -> JobInfo {
        let mut merged = info.clone();
        fill(&mut merged.role, &self.role);
        fill(&mut merged.company, &self.company);
        fill(&mut merged.location, &self.location);
        fill(&mut merged.experience, &self.experience);
        if !self.skills.is_empty() && merged.requirements.accepted().is_none() {
            merged.requirements = ExtractedField::new(self.skills.clone(), 1.0);
        }
        merged
    }
}

fn promote(slot: &mut Option<String>, field: &ExtractedField<String>) {
    if let Some(value) = field.accepted() {
        *slot = Some(value.clone());
    }
}

fn fill(field: &mut ExtractedField<String>, known: &Option<String>) {
    if let Some(value) = known {
        if field.accepted().is_none() {
            *field = ExtractedField::new(value.clone(), 1.0);
        }
    }
}

/// Everything the assistant remembers about one chat session.
#[derive(Debug, Clone)]
pub struct ConversationState {
    pub accumulated: AccumulatedFields,
    /// A clarifying question was asked in the current gathering cycle.
    pub awaiting_clarification: bool,
    pub final_posting: Option<JobPosting>,
    pub last_action: LastAction,
    pub history: Vec<Turn>,
    /// Last posting result, handed out once by the poll endpoint.
    pub pending_result: Option<ChatReply>,
    pub updated_at: DateTime<Utc>,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self {
            accumulated: AccumulatedFields::default(),
            awaiting_clarification: false,
            final_posting: None,
            last_action: LastAction::None,
            history: Vec::new(),
            pending_result: None,
            updated_at: Utc::now(),
        }
    }
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fresh information-gathering cycle. The posting and history stay.
    pub fn reset_gathering(&mut self) {
        self.accumulated = AccumulatedFields::default();
        self.awaiting_clarification = false;
    }

    pub fn record_turn(&mut self, user: &str, assistant: &str) {
        self.history.push(Turn {
            user: user.to_string(),
            assistant: assistant.to_string(),
        });
        if self.history.len() > MAX_HISTORY_TURNS {
            let excess = self.history.len() - MAX_HISTORY_TURNS;
            self.history.drain(..excess);
        }
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

pub type SessionHandle = Arc<Mutex<ConversationState>>;

/// In-memory sessions keyed by session id.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionHandle>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, session_id: &str) -> Option<SessionHandle> {
        self.sessions.read().await.get(session_id).cloned()
    }

    pub async fn get_or_create(&self, session_id: &str) -> SessionHandle {
        if let Some(handle) = self.get(session_id).await {
            return handle;
        }
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                info!("Starting conversation session {session_id}");
                Arc::new(Mutex::new(ConversationState::new()))
            })
            .clone()
    }

    /// Locks the session for one turn, creating it if needed.
    ///
    /// The handle is re-checked after the lock is taken: a session evicted
    /// while we waited is replaced by a fresh one that is in the map. Holding
    /// the lock keeps `prune_idle` away until the guard is dropped.
    pub async fn checkout(&self, session_id: &str) -> OwnedMutexGuard<ConversationState> {
        loop {
            let handle = self.get_or_create(session_id).await;
            let mut guard = handle.clone().lock_owned().await;
            let current = self
                .get(session_id)
                .await
                .is_some_and(|live| Arc::ptr_eq(&live, &handle));
            if current {
                guard.touch();
                return guard;
            }
            debug!("Session {session_id} was evicted before it could be locked; retrying");
        }
    }

    /// Drops a session. Returns false if it did not exist.
    pub async fn remove(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Evicts sessions idle for longer than `max_idle`. Sessions in the middle
    /// of a turn are locked and therefore kept.
    pub async fn prune_idle(&self, max_idle: chrono::Duration) -> usize {
        let cutoff = Utc::now() - max_idle;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, handle| match handle.try_lock() {
            Ok(state) => state.updated_at >= cutoff,
            Err(_) => true,
        });
        before - sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(value: &str, confidence: f64) -> ExtractedField<String> {
        ExtractedField::new(value.to_string(), confidence)
    }

    #[test]
    fn test_low_confidence_never_overwrites_accumulated() {
        let mut acc = AccumulatedFields::default();
        acc.absorb(&JobInfo {
            role: field("Backend Engineer", 0.8),
            ..JobInfo::default()
        });
        acc.absorb(&JobInfo {
            role: field("Intern", 0.3),
            ..JobInfo::default()
        });
        assert_eq!(acc.role.as_deref(), Some("Backend Engineer"));
    }

    #[test]
    fn test_high_confidence_replaces_accumulated() {
        let mut acc = AccumulatedFields::default();
        acc.absorb(&JobInfo {
            company: field("Acme", 0.7),
            ..JobInfo::default()
        });
        acc.absorb(&JobInfo {
            company: field("Globex", 0.9),
            ..JobInfo::default()
        });
        assert_eq!(acc.company.as_deref(), Some("Globex"));
    }

    #[test]
    fn test_skills_are_merged_without_duplicates() {
        let mut acc = AccumulatedFields::default();
        let skills = |items: &[&str]| JobInfo {
            requirements: ExtractedField::new(items.iter().map(|s| s.to_string()).collect(), 0.9),
            ..JobInfo::default()
        };
        acc.absorb(&skills(&["Rust", "SQL"][..]));
        acc.absorb(&skills(&["SQL", "Kafka"][..]));
        assert_eq!(acc.skills, vec!["Rust", "SQL", "Kafka"]);
    }

    #[test]
    fn test_overlay_fills_only_unaccepted_fields() {
        let acc = AccumulatedFields {
            role: Some("Backend Engineer".to_string()),
            company: Some("Acme".to_string()),
            ..AccumulatedFields::default()
        };
        let latest = JobInfo {
            company: field("Globex", 0.9),
            ..JobInfo::default()
        };
        let merged = acc.overlay(&latest);
        assert_eq!(merged.role.accepted().map(String::as_str), Some("Backend Engineer"));
        assert_eq!(merged.company.accepted().map(String::as_str), Some("Globex"));
        assert!(merged.location.accepted().is_none());
    }

    #[test]
    fn test_reset_gathering_keeps_posting_and_history() {
        let mut state = ConversationState::new();
        state.accumulated.role = Some("Engineer".to_string());
        state.awaiting_clarification = true;
        state.final_posting = Some(JobPosting::new("# T"));
        state.record_turn("hi", "hello");

        state.reset_gathering();

        assert_eq!(state.accumulated, AccumulatedFields::default());
        assert!(!state.awaiting_clarification);
        assert!(state.final_posting.is_some());
        assert_eq!(state.history.len(), 1);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut state = ConversationState::new();
        for i in 0..(MAX_HISTORY_TURNS + 5) {
            state.record_turn(&format!("u{i}"), "a");
        }
        assert_eq!(state.history.len(), MAX_HISTORY_TURNS);
        assert_eq!(state.history[0].user, "u5");
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        let a = store.get_or_create("a").await;
        let b = store.get_or_create("b").await;
        a.lock().await.accumulated.role = Some("Engineer".to_string());
        assert!(b.lock().await.accumulated.role.is_none());
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_get_or_create_returns_same_session() {
        let store = SessionStore::new();
        let first = store.get_or_create("s").await;
        let second = store.get_or_create("s").await;
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_prune_idle_keeps_recent_and_busy_sessions() {
        let store = SessionStore::new();
        let stale = store.get_or_create("stale").await;
        stale.lock().await.updated_at = Utc::now() - chrono::Duration::hours(3);
        let busy = store.get_or_create("busy").await;
        busy.lock().await.updated_at = Utc::now() - chrono::Duration::hours(3);
        store.get_or_create("fresh").await;

        let _guard = busy.lock().await;
        let evicted = store.prune_idle(chrono::Duration::hours(1)).await;

        assert_eq!(evicted, 1);
        assert!(store.get("stale").await.is_none());
        assert!(store.get("busy").await.is_some());
        assert!(store.get("fresh").await.is_some());
    }

    #[tokio::test]
    async fn test_checkout_refreshes_idle_session() {
        let store = SessionStore::new();
        let handle = store.get_or_create("s").await;
        handle.lock().await.updated_at = Utc::now() - chrono::Duration::hours(3);

        drop(store.checkout("s").await);

        assert_eq!(store.prune_idle(chrono::Duration::hours(1)).await, 0);
        assert!(store.get("s").await.is_some());
    }

    #[tokio::test]
    async fn test_checkout_after_eviction_uses_live_session() {
        let store = SessionStore::new();
        let stale = store.get_or_create("s").await;
        stale.lock().await.accumulated.role = Some("Engineer".to_string());
        stale.lock().await.updated_at = Utc::now() - chrono::Duration::hours(3);
        store.prune_idle(chrono::Duration::hours(1)).await;

        let mut guard = store.checkout("s").await;
        guard.accumulated.company = Some("Acme".to_string());
        drop(guard);

        let live = store.get("s").await.unwrap();
        assert!(!Arc::ptr_eq(&live, &stale));
        let state = live.lock().await;
        assert_eq!(state.accumulated.company.as_deref(), Some("Acme"));
        assert!(state.accumulated.role.is_none());
    }

    #[tokio::test]
    async fn test_checked_out_session_survives_prune() {
        let store = SessionStore::new();
        let mut guard = store.checkout("s").await;
        guard.updated_at = Utc::now() - chrono::Duration::hours(3);

        assert_eq!(store.prune_idle(chrono::Duration::hours(1)).await, 0);
        drop(guard);
        assert!(store.get("s").await.is_some());
    }

    #[tokio::test]
    async fn test_remove_reports_existence() {
        let store = SessionStore::new();
        store.get_or_create("s").await;
        assert!(store.remove("s").await);
        assert!(!store.remove("s").await);
    }
}
