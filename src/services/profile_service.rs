use serenity::async_trait;
use sqlx::mysql::MySqlPool;
use thiserror::Error;

use crate::db;
use crate::models::{User, UserProfile};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("No profile found. Sign out and sign in again to create one")]
    Missing,
}

impl From<sqlx::Error> for ProfileError {
    fn from(e: sqlx::Error) -> Self {
        ProfileError::Database(e.to_string())
    }
}

/// Document-style store holding one profile per user
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, ProfileError>;

    /// Insert the profile; returns false when one already exists for the uid
    async fn create_profile(&self, profile: &UserProfile) -> Result<bool, ProfileError>;

    async fn set_favorites(&self, uid: &str, favorites: &[String]) -> Result<(), ProfileError>;
}

pub struct MySqlProfileStore {
    pool: MySqlPool,
}

impl MySqlProfileStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for MySqlProfileStore {
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, ProfileError> {
        Ok(db::profile::get_profile(&self.pool, uid).await?)
    }

    async fn create_profile(&self, profile: &UserProfile) -> Result<bool, ProfileError> {
        Ok(db::profile::create_profile(&self.pool, profile).await?)
    }

    async fn set_favorites(&self, uid: &str, favorites: &[String]) -> Result<(), ProfileError> {
        Ok(db::profile::set_favorites(&self.pool, uid, favorites).await?)
    }
}

/// Create a profile for `user` unless one exists; returns true if created
pub async fn ensure_profile(store: &dyn ProfileStore, user: &User) -> Result<bool, ProfileError> {
    if store.get_profile(&user.uid).await?.is_some() {
        return Ok(false);
    }
    store.create_profile(&UserProfile::for_user(user)).await
}

pub async fn list_favorites(store: &dyn ProfileStore, uid: &str) -> Result<Vec<String>, ProfileError> {
    let profile = store.get_profile(uid).await?.ok_or(ProfileError::Missing)?;
    Ok(profile.favorites)
}

/// Append a coin id if not already present; returns the updated list
pub async fn add_favorite(store: &dyn ProfileStore, uid: &str, coin_id: &str) -> Result<Vec<String>, ProfileError> {
    let mut favorites = list_favorites(store, uid).await?;
    if !favorites.iter().any(|f| f == coin_id) {
        favorites.push(coin_id.to_string());
        store.set_favorites(uid, &favorites).await?;
    }
    Ok(favorites)
}

/// Remove a coin id if present; returns the updated list
pub async fn remove_favorite(store: &dyn ProfileStore, uid: &str, coin_id: &str) -> Result<Vec<String>, ProfileError> {
    let mut favorites = list_favorites(store, uid).await?;
    let before = favorites.len();
    favorites.retain(|f| f != coin_id);
    if favorites.len() != before {
        store.set_favorites(uid, &favorites).await?;
    }
    Ok(favorites)
}


#[cfg(test)]
mod tests {
    use super::testing::MemoryProfileStore;
    use super::*;

    fn user(uid: &str) -> User {
        User {
            uid: uid.to_string(),
            email: Some("dana@example.com".to_string()),
            display_name: Some("Dana".to_string()),
            photo_url: None,
            provider_id: "google.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_ensure_profile_creates_once() {
        let store = MemoryProfileStore::default();

        assert!(ensure_profile(&store, &user("u1")).await.unwrap());
        assert!(!ensure_profile(&store, &user("u1")).await.unwrap());

        let profile = store.get_profile("u1").await.unwrap().unwrap();
        assert_eq!(profile.display_name.as_deref(), Some("Dana"));
        assert!(profile.favorites.is_empty());
        assert!(chrono::DateTime::parse_from_rfc3339(&profile.created_at).is_ok());
    }

    #[tokio::test]
    async fn test_favorites_are_deduplicated_and_ordered() {
        let store = MemoryProfileStore::default();
        ensure_profile(&store, &user("u1")).await.unwrap();

        add_favorite(&store, "u1", "bitcoin").await.unwrap();
        add_favorite(&store, "u1", "ethereum").await.unwrap();
        let favorites = add_favorite(&store, "u1", "bitcoin").await.unwrap();
        assert_eq!(favorites, vec!["bitcoin", "ethereum"]);

        let favorites = remove_favorite(&store, "u1", "bitcoin").await.unwrap();
        assert_eq!(favorites, vec!["ethereum"]);
        assert_eq!(list_favorites(&store, "u1").await.unwrap(), vec!["ethereum"]);
    }

    #[tokio::test]
    async fn test_favorites_without_profile() {
        let store = MemoryProfileStore::default();
        assert_eq!(list_favorites(&store, "ghost").await.unwrap_err(), ProfileError::Missing);
    }
}
