use std::collections::HashMap;
use tokio::sync::{watch, RwLock};
use tracing::debug;

use crate::models::{AuthSnapshot, Session, User};

/// Active sign-in sessions keyed by Discord user id.
///
/// Built once at startup and handed to whatever needs to gate an action on
/// "is this user signed in". Every change is pushed to subscribers of that
/// user as an [`AuthSnapshot`].
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<u64, Session>>,
    watchers: RwLock<HashMap<u64, watch::Sender<AuthSnapshot>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push to the user's subscribers; a channel nobody listens to any more is dropped
    async fn notify(&self, discord_id: u64, snapshot: AuthSnapshot) {
        let mut watchers = self.watchers.write().await;
        let Some(sender) = watchers.get(&discord_id) else {
            return;
        };
        if sender.receiver_count() == 0 {
            watchers.remove(&discord_id);
            return;
        }
        sender.send_replace(snapshot);
    }

    /// Install (or replace) the session for a user
    pub async fn start(&self, discord_id: u64, session: Session) {
        let user = session.user.clone();
        self.sessions.write().await.insert(discord_id, session);
        debug!("Session started for discord user {} (uid {})", discord_id, user.uid);
        self.notify(discord_id, AuthSnapshot { user: Some(user), error: None }).await;
    }

    /// Remove the user's session, returning it if there was one
    pub async fn end(&self, discord_id: u64) -> Option<Session> {
        let removed = self.sessions.write().await.remove(&discord_id);
        if removed.is_some() {
            debug!("Session ended for discord user {}", discord_id);
        }
        self.notify(discord_id, AuthSnapshot::default()).await;

        // Sweep channels whose subscribers have all gone away
        self.watchers.write().await.retain(|_, sender| sender.receiver_count() > 0);
        removed
    }

    /// Publish an auth failure without changing who is signed in
    pub async fn record_error(&self, discord_id: u64, error: &str) {
        let user = self.current_user(discord_id).await;
        self.notify(discord_id, AuthSnapshot { user, error: Some(error.to_string()) }).await;
    }

    pub async fn is_active(&self, discord_id: u64) -> bool {
        self.sessions.read().await.contains_key(&discord_id)
    }

    pub async fn current_user(&self, discord_id: u64) -> Option<User> {
        self.sessions.read().await.get(&discord_id).map(|s| s.user.clone())
    }

    pub async fn session(&self, discord_id: u64) -> Option<Session> {
        self.sessions.read().await.get(&discord_id).cloned()
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Receive the user's current auth state now and on every later change
    pub async fn subscribe(&self, discord_id: u64) -> watch::Receiver<AuthSnapshot> {
        if let Some(sender) = self.watchers.read().await.get(&discord_id) {
            return sender.subscribe();
        }

        let snapshot = AuthSnapshot {
            user: self.current_user(discord_id).await,
            error: None,
        };
        let mut watchers = self.watchers.write().await;
        watchers
            .entry(discord_id)
            .or_insert_with(|| watch::channel(snapshot).0)
            .subscribe()
    }

    #[cfg(test)]
    async fn watched_users(&self) -> usize {
        self.watchers.read().await.len()
    }
}

/// Gate an action behind an active session
pub async fn require_session(registry: &SessionRegistry, discord_id: u64) -> Result<Session, String> {
    registry.session(discord_id).await.ok_or_else(|| {
        "🔒 You need to be signed in to use price predictions. DM me `$login <email> <password>` or `$register <email> <password> <name>` to get started.".to_string()
    })
}
