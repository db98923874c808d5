use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;

pub async fn execute(ctx: &Context, msg: &Message) -> Result<(), String> {
    let state = crate::state::app_state(ctx).await?;

    let ended = state
        .auth
        .logout(msg.author.id.get())
        .await
        .map_err(|e| e.to_string())?;

    let description = match ended {
        Some(user) => format!("👋 Signed out **{}**.", user.name_or_default()),
        None => "You were not signed in.".to_string(),
    };

    msg.channel_id
        .send_message(
            ctx,
            CreateMessage::default().embed(CreateEmbed::default().description(description).color(0x00b0f4)),
        )
        .await
        .map_err(|e| e.to_string())?;

    Ok(())
}
