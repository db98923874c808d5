use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;

pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    if args.len() < 3 {
        return Err("❌ Usage: `$register <email> <password> <display name>`".to_string());
    }

    let state = crate::state::app_state(ctx).await?;
    let email = args[0];
    let password = args[1];
    let display_name = args[2..].join(" ");

    let user = state
        .auth
        .register(msg.author.id.get(), email, password, &display_name)
        .await
        .map_err(|e| e.to_string())?;

    let embed = CreateEmbed::default()
        .title("✅ Account Created")
        .description(format!(
            "Welcome, **{}**! You are signed in and can now use `$predict` and `$chart`.",
            user.name_or_default()
        ))
        .color(0x00ff00);

    msg.channel_id
        .send_message(ctx, CreateMessage::default().embed(embed))
        .await
        .map_err(|e| e.to_string())?;

    Ok(())
}
