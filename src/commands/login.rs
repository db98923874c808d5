use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::api::firebase::FederatedProvider;

const USAGE: &str = "❌ Usage: `$login <email> <password>` or `$login google|facebook <token>`";

pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    if args.len() != 2 {
        return Err(USAGE.to_string());
    }

    let state = crate::state::app_state(ctx).await?;
    let discord_id = msg.author.id.get();

    let user = match FederatedProvider::parse(args[0]) {
        Some(provider) => state.auth.federated_sign_in(discord_id, provider, args[1]).await,
        None => state.auth.login(discord_id, args[0], args[1]).await,
    }
    .map_err(|e| e.to_string())?;

    let embed = CreateEmbed::default()
        .title("✅ Signed In")
        .description(format!(
            "Welcome back, **{}**! Predictions are now unlocked.",
            user.name_or_default()
        ))
        .color(0x00ff00);

    msg.channel_id
        .send_message(ctx, CreateMessage::default().embed(embed))
        .await
        .map_err(|e| e.to_string())?;

    Ok(())
}
