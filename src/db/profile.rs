use sqlx::mysql::MySqlPool;
use sqlx::Row;
use tracing::warn;

use crate::models::UserProfile;

fn encode_favorites(favorites: &[String]) -> String {
    serde_json::to_string(favorites).unwrap_or_else(|_| "[]".to_string())
}

/// A column that fails to parse is an error, so a later write cannot clobber it
fn decode_favorites(uid: &str, raw: &str) -> Result<Vec<String>, sqlx::Error> {
    serde_json::from_str(raw).map_err(|e| {
        warn!("Corrupt favorites column for {}: {}", uid, e);
        sqlx::Error::Decode(Box::new(e))
    })
}

/// Get a profile by identity-provider uid
pub async fn get_profile(pool: &MySqlPool, uid: &str) -> Result<Option<UserProfile>, sqlx::Error> {
    let row = sqlx::query(
        "SELECT uid, email, display_name, photo_url, created_at, favorites FROM user_profile WHERE uid = ?"
    )
    .bind(uid)
    .fetch_optional(pool)
    .await?;

    let Some(r) = row else {
        return Ok(None);
    };

    let uid = r.get::<String, _>("uid");
    let favorites = decode_favorites(&uid, &r.get::<String, _>("favorites"))?;
    Ok(Some(UserProfile {
        uid,
        email: r.get::<Option<String>, _>("email"),
        display_name: r.get::<Option<String>, _>("display_name"),
        photo_url: r.get::<Option<String>, _>("photo_url"),
        created_at: r.get::<String, _>("created_at"),
        favorites,
    }))
}

/// Insert a profile, leaving an existing row for the same uid untouched
pub async fn create_profile(pool: &MySqlPool, profile: &UserProfile) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT IGNORE INTO user_profile (uid, email, display_name, photo_url, created_at, favorites) VALUES (?, ?, ?, ?, ?, ?)"
    )
    .bind(&profile.uid)
    .bind(&profile.email)
    .bind(&profile.display_name)
    .bind(&profile.photo_url)
    .bind(&profile.created_at)
    .bind(encode_favorites(&profile.favorites))
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Replace the favorites list for a profile
pub async fn set_favorites(pool: &MySqlPool, uid: &str, favorites: &[String]) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE user_profile SET favorites = ? WHERE uid = ?")
        .bind(encode_favorites(favorites))
        .bind(uid)
        .execute(pool)
        .await?;

    Ok(())
}
