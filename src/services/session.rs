//! Per-session state storage.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use redis::{AsyncCommands, Client};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    db::CacheKey,
    error::{AppError, AppResult},
    models::{EmotionSet, SessionState},
};

pub const DEFAULT_SESSION_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Optimistic retries before a contended Redis update gives up
const MAX_UPDATE_ATTEMPTS: usize = 32;

/// Change applied to a session inside [`SessionStore::update`]. It may run
/// more than once when a backend retries.
pub type SessionUpdate = Box<dyn Fn(&mut SessionState) + Send + Sync>;

/// Trait for session state backends
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// State for `session_id`; an unknown session is an empty state
    async fn load(&self, session_id: Uuid) -> AppResult<SessionState>;

    async fn save(&self, session_id: Uuid, state: &SessionState) -> AppResult<()>;

    /// Applies `apply` to the stored state atomically and returns the result.
    /// Concurrent updates of one session never overwrite each other.
    async fn update(&self, session_id: Uuid, apply: SessionUpdate) -> AppResult<SessionState>;

    fn name(&self) -> &'static str;
}

fn decode_state(stored: Option<String>) -> AppResult<SessionState> {
    match stored {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| AppError::Internal(format!("Session deserialization error: {}", e))),
        None => Ok(SessionState::default()),
    }
}

fn encode_state(state: &SessionState) -> AppResult<String> {
    serde_json::to_string(state)
        .map_err(|e| AppError::Internal(format!("Session serialization error: {}", e)))
}

/// Sessions as JSON strings in Redis, expiring `ttl` seconds after the last
/// write
pub struct RedisSessionStore {
    client: Client,
    ttl: u64,
}

impl RedisSessionStore {
    pub fn new(client: Client, ttl: u64) -> Self {
        Self { client, ttl }
    }
}

#[async_trait::async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, session_id: Uuid) -> AppResult<SessionState> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let stored: Option<String> = conn.get(CacheKey::Session(session_id).to_string()).await?;
        decode_state(stored)
    }

    async fn save(&self, session_id: Uuid, state: &SessionState) -> AppResult<()> {
        let json = encode_state(state)?;

        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn
            .set_ex(CacheKey::Session(session_id).to_string(), json, self.ttl)
            .await?;

        tracing::debug!(session_id = %session_id, "Session saved");
        Ok(())
    }

    /// WATCH / MULTI / EXEC, retried while another writer touches the key
    async fn update(&self, session_id: Uuid, apply: SessionUpdate) -> AppResult<SessionState> {
        let key = CacheKey::Session(session_id).to_string();
        // dedicated connection: WATCH state is per connection
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        for attempt in 1..=MAX_UPDATE_ATTEMPTS {
            let _: () = redis::cmd("WATCH").arg(&key).query_async(&mut conn).await?;

            let stored: Option<String> = conn.get(&key).await?;
            let mut state = decode_state(stored)?;
            apply(&mut state);
            let json = encode_state(&state)?;

            let committed: Option<()> = redis::pipe()
                .atomic()
                .set_ex(&key, json, self.ttl)
                .ignore()
                .query_async(&mut conn)
                .await?;

            if committed.is_some() {
                return Ok(state);
            }

            tracing::debug!(session_id = %session_id, attempt, "Session changed during update, retrying");
        }

        Err(AppError::Internal(format!(
            "Session {} is too contended to update",
            session_id
        )))
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

/// Process-local sessions, lost on restart
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionState>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, session_id: Uuid) -> AppResult<SessionState> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(&session_id).cloned().unwrap_or_default())
    }

    async fn save(&self, session_id: Uuid, state: &SessionState) -> AppResult<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session_id, state.clone());
        Ok(())
    }

    async fn update(&self, session_id: Uuid, apply: SessionUpdate) -> AppResult<SessionState> {
        let mut sessions = self.sessions.write().await;
        let state = sessions.entry(session_id).or_default();
        apply(&mut *state);
        Ok(state.clone())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Records `emotions` as the session's latest selection and returns the
/// updated state
pub async fn record_selection(
    store: &dyn SessionStore,
    session_id: Uuid,
    emotions: &EmotionSet,
    history_limit: usize,
) -> AppResult<SessionState> {
    let emotions = emotions.clone();
    let recorded_at = Utc::now();
    store
        .update(
            session_id,
            Box::new(move |state: &mut SessionState| {
                state.record_selection(&emotions, recorded_at, history_limit)
            }),
        )
        .await
}

/// Flips watchlist membership of `movie_id`; returns the new membership
pub async fn toggle_watchlist(
    store: &dyn SessionStore,
    session_id: Uuid,
    movie_id: u64,
) -> AppResult<bool> {
    let state = store
        .update(
            session_id,
            Box::new(move |state: &mut SessionState| {
                state.toggle_watchlist(movie_id);
            }),
        )
        .await?;
    Ok(state.in_watchlist(movie_id))
}
