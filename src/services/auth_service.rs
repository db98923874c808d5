use std::sync::Arc;
use sqlx::mysql::MySqlPool;
use tracing::{debug, info, warn};

use crate::api::firebase::{AuthError, FederatedProvider, IdentityProvider};
use crate::db;
use crate::models::{Session, User, UserProfile};
use crate::services::profile_service::{self, ProfileStore};
use crate::services::session_service::{require_session, SessionRegistry};
use crate::utils::encryption::TokenCipher;
use crate::utils::view::ViewTracker;

/// Where refresh tokens are kept between restarts
pub struct SessionPersistence {
    pub pool: MySqlPool,
    pub cipher: TokenCipher,
}

/// Sign-in flows: identity provider calls, profile creation and session bookkeeping
pub struct AuthService {
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
    sessions: Arc<SessionRegistry>,
    views: ViewTracker,
    persistence: Option<SessionPersistence>,
}

fn validate_credentials(email: &str, password: &str) -> Result<(), AuthError> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(AuthError::InvalidEmail);
    }
    if password.is_empty() {
        return Err(AuthError::InvalidCredentials);
    }
    Ok(())
}

impl AuthService {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileStore>,
        sessions: Arc<SessionRegistry>,
        views: ViewTracker,
        persistence: Option<SessionPersistence>,
    ) -> Self {
        Self { identity, profiles, sessions, views, persistence }
    }

    /// Record the failure for subscribers, then hand it back to the caller
    async fn fail<T>(&self, discord_id: u64, error: AuthError) -> Result<T, AuthError> {
        warn!("Auth failure for discord user {}: {}", discord_id, error);
        self.sessions.record_error(discord_id, &error.to_string()).await;
        Err(error)
    }

    async fn persist(&self, discord_id: u64, session: &Session) {
        let Some(persistence) = &self.persistence else {
            return;
        };

        let sealed = match persistence.cipher.seal(&session.refresh_token, discord_id) {
            Ok(sealed) => sealed,
            Err(e) => {
                warn!("Failed to seal refresh token for {}: {}", discord_id, e);
                return;
            }
        };

        if let Err(e) = db::session::upsert_session(&persistence.pool, discord_id as i64, &session.user.uid, &sealed).await {
            warn!("Failed to persist session for {}: {}", discord_id, e);
        }
    }

    async fn activate(&self, discord_id: u64, session: Session) -> User {
        self.persist(discord_id, &session).await;
        let user = session.user.clone();
        self.sessions.start(discord_id, session).await;
        user
    }

    /// Create an email/password account, name it, store its profile and sign in
    pub async fn register(
        &self,
        discord_id: u64,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<User, AuthError> {
        let display_name = display_name.trim();
        if let Err(e) = validate_credentials(email, password) {
            return self.fail(discord_id, e).await;
        }
        if display_name.is_empty() {
            return self.fail(discord_id, AuthError::MissingDisplayName).await;
        }

        let session = match self.identity.sign_up(email.trim(), password).await {
            Ok(session) => session,
            Err(e) => return self.fail(discord_id, e).await,
        };
        let session = match self.identity.update_display_name(&session, display_name).await {
            Ok(session) => session,
            Err(e) => return self.fail(discord_id, e).await,
        };

        let mut profile = UserProfile::for_user(&session.user);
        profile.email = Some(email.trim().to_string());
        profile.display_name = Some(display_name.to_string());
        if let Err(e) = self.profiles.create_profile(&profile).await {
            return self.fail(discord_id, AuthError::Profile(e.to_string())).await;
        }

        info!("Registered new account {} for discord user {}", session.user.uid, discord_id);
        Ok(self.activate(discord_id, session).await)
    }

    /// Email/password sign-in; recreates the profile if an earlier write was lost
    pub async fn login(&self, discord_id: u64, email: &str, password: &str) -> Result<User, AuthError> {
        if let Err(e) = validate_credentials(email, password) {
            return self.fail(discord_id, e).await;
        }

        let session = match self.identity.sign_in_with_password(email.trim(), password).await {
            Ok(session) => session,
            Err(e) => return self.fail(discord_id, e).await,
        };

        match profile_service::ensure_profile(self.profiles.as_ref(), &session.user).await {
            Ok(true) => warn!("Profile for {} was missing, created it on sign-in", session.user.uid),
            Ok(false) => {}
            Err(e) => return self.fail(discord_id, AuthError::Profile(e.to_string())).await,
        }

        info!("Discord user {} signed in as {}", discord_id, session.user.uid);
        Ok(self.activate(discord_id, session).await)
    }

    /// Sign in through Google or Facebook, creating the profile on first sign-in
    pub async fn federated_sign_in(
        &self,
        discord_id: u64,
        provider: FederatedProvider,
        credential: &str,
    ) -> Result<User, AuthError> {
        if credential.trim().is_empty() {
            return self.fail(discord_id, AuthError::InvalidCredentials).await;
        }

        let (session, is_new_user) = match self.identity.sign_in_with_idp(provider, credential.trim()).await {
            Ok(result) => result,
            Err(e) => return self.fail(discord_id, e).await,
        };

        match profile_service::ensure_profile(self.profiles.as_ref(), &session.user).await {
            Ok(true) => info!(
                "Created profile for {} via {} (provider reports new user: {})",
                session.user.uid,
                provider.provider_id(),
                is_new_user
            ),
            Ok(false) => {}
            Err(e) => return self.fail(discord_id, AuthError::Profile(e.to_string())).await,
        }

        Ok(self.activate(discord_id, session).await)
    }

    /// The user's session for a gated command, refreshing its token once expired
    pub async fn active_session(&self, discord_id: u64) -> Result<Session, String> {
        let session = require_session(&self.sessions, discord_id).await?;
        if !session.is_expired() {
            return Ok(session);
        }

        match self.identity.refresh(&session.refresh_token).await {
            Ok(refreshed) => {
                debug!("Refreshed expired session for discord user {}", discord_id);
                self.persist(discord_id, &refreshed).await;
                self.sessions.start(discord_id, refreshed.clone()).await;
                Ok(refreshed)
            }
            Err(e) => {
                warn!("Session refresh failed for {}: {}", discord_id, e);
                self.views.close(discord_id);
                self.sessions.end(discord_id).await;
                self.sessions.record_error(discord_id, &AuthError::SessionExpired.to_string()).await;
                Err(format!("🔒 {}", AuthError::SessionExpired))
            }
        }
    }

    /// End the user's session and close any prediction view they had open
    pub async fn logout(&self, discord_id: u64) -> Result<Option<User>, AuthError> {
        self.views.close(discord_id);
        let ended = self.sessions.end(discord_id).await;

        if let Some(persistence) = &self.persistence {
            if let Err(e) = db::session::delete_session(&persistence.pool, discord_id as i64).await {
                return self.fail(discord_id, AuthError::Request(format!("Failed to clear saved session: {}", e))).await;
            }
        }

        Ok(ended.map(|s| s.user))
    }

    /// Reload persisted sessions after a restart; returns how many came back
    pub async fn restore_sessions(&self) -> usize {
        let Some(persistence) = &self.persistence else {
            return 0;
        };

        let rows = match db::session::get_all_sessions(&persistence.pool).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Failed to load saved sessions: {}", e);
                return 0;
            }
        };

        let mut restored = 0;
        for (discord_id, uid, sealed) in rows {
            let discord_id = discord_id as u64;
            let refreshed = match persistence.cipher.open(&sealed, discord_id) {
                Ok(refresh_token) => self.identity.refresh(&refresh_token).await,
                Err(e) => Err(AuthError::Provider(e.to_string())),
            };

            match refreshed {
                Ok(session) if session.user.uid == uid => {
                    self.persist(discord_id, &session).await;
                    self.sessions.start(discord_id, session).await;
                    restored += 1;
                }
                Ok(_) => warn!("Saved session for {} no longer matches uid {}, dropping", discord_id, uid),
                Err(e) => {
                    warn!("Dropping saved session for {}: {}", discord_id, e);
                    if let Err(e) = db::session::delete_session(&persistence.pool, discord_id as i64).await {
                        warn!("Failed to delete stale session for {}: {}", discord_id, e);
                    }
                }
            }
        }

        restored
    }
}
