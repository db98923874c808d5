use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::services::profile_service::ProfileStore;
use crate::services::session_service::require_session;

pub async fn execute(ctx: &Context, msg: &Message) -> Result<(), String> {
    let state = crate::state::app_state(ctx).await?;
    let session = require_session(&state.sessions, msg.author.id.get()).await?;
    let user = &session.user;

    let profile = state
        .profiles
        .get_profile(&user.uid)
        .await
        .map_err(|e| e.to_string())?;

    let mut embed = CreateEmbed::default()
        .title(format!("👤 {}", user.name_or_default()))
        .field("Email", user.email.as_deref().unwrap_or("—"), true)
        .field("Sign-in Method", &user.provider_id, true)
        .color(0x00b0f4);

    match &profile {
        Some(profile) => {
            let favorites = if profile.favorites.is_empty() {
                "None yet. Add one with `$fav add <coin>`".to_string()
            } else {
                profile.favorites.join(", ")
            };
            embed = embed
                .field("Member Since", &profile.created_at, false)
                .field("Favorites", favorites, false);
        }
        None => {
            embed = embed.field("Profile", "No profile stored yet.", false);
        }
    }

    if let Some(photo) = &user.photo_url {
        embed = embed.thumbnail(photo);
    }

    msg.channel_id
        .send_message(ctx, CreateMessage::default().embed(embed))
        .await
        .map_err(|e| e.to_string())?;

    Ok(())
}
