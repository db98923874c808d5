//! Signed-in user and profile models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of a signed-in user as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub provider_id: String,
}

impl User {
    pub const PASSWORD_PROVIDER: &'static str = "password";

    pub fn name_or_default(&self) -> &str {
        self.display_name.as_deref().unwrap_or("User")
    }
}

/// Stored per-user profile record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: String,
    pub favorites: Vec<String>,
}

impl UserProfile {
    /// Fresh profile for a first sign-in, with no favorites
    pub fn for_user(user: &User) -> Self {
        Self {
            uid: user.uid.clone(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            photo_url: user.photo_url.clone(),
            created_at: Utc::now().to_rfc3339(),
            favorites: Vec::new(),
        }
    }
}

/// An active sign-in held for one Discord user
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Auth state delivered to session subscribers on every change
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthSnapshot {
    pub user: Option<User>,
    pub error: Option<String>,
}
