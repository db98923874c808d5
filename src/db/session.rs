use sqlx::mysql::MySqlPool;

/// Persist (or replace) the sealed refresh token for a Discord user
pub async fn upsert_session(
    pool: &MySqlPool,
    discord_id: i64,
    uid: &str,
    sealed_refresh_token: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO auth_session (discord_id, uid, sealed_refresh_token) VALUES (?, ?, ?) \
         ON DUPLICATE KEY UPDATE uid = VALUES(uid), sealed_refresh_token = VALUES(sealed_refresh_token)"
    )
    .bind(discord_id)
    .bind(uid)
    .bind(sealed_refresh_token)
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete the persisted session for a Discord user
pub async fn delete_session(pool: &MySqlPool, discord_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM auth_session WHERE discord_id = ?")
        .bind(discord_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// All persisted sessions as (discord_id, uid, sealed_refresh_token)
pub async fn get_all_sessions(pool: &MySqlPool) -> Result<Vec<(i64, String, String)>, sqlx::Error> {
    sqlx::query_as::<_, (i64, String, String)>(
        "SELECT discord_id, uid, sealed_refresh_token FROM auth_session"
    )
    .fetch_all(pool)
    .await
}
