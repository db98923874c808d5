pub mod ping;
pub mod help;
pub mod coins;
pub mod predict;
pub mod chart;
pub mod register;
pub mod login;
pub mod logout;
pub mod profile;
pub mod favorites;

use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;
use tracing::{debug, error, warn};

use crate::utils::{check_cooldown, check_global_rate_limit, extract_clean_error};

/// Commands that carry credentials and must only be sent by direct message
const DM_ONLY_COMMANDS: &[&str] = &["$register", "$signup", "$login", "$signin"];

pub async fn handle_message(ctx: &Context, msg: &Message) {
    if msg.author.bot {
        return;
    }

    let parts: Vec<&str> = msg.content.split_whitespace().collect();
    let Some((&command, args)) = parts.split_first() else {
        return;
    };
    if !command.starts_with('$') {
        return;
    }

    if let Err(remaining_ms) = check_global_rate_limit().await {
        debug!("Global rate limit hit, dropping {} ({}ms remaining)", command, remaining_ms);
        return;
    }

    if let Err((remaining, should_warn)) = check_cooldown(msg.author.id.get(), command).await {
        if should_warn {
            let _ = msg.channel_id.send_message(
                ctx,
                CreateMessage::default().embed(
                    CreateEmbed::default()
                        .title("Command Cooldown")
                        .description(format!("⏳ Please wait {} seconds before using this command again.", remaining))
                        .color(0xffa500)
                )
            ).await;
        }
        return;
    }

    if DM_ONLY_COMMANDS.contains(&command) && msg.guild_id.is_some() {
        // Credentials were posted in a shared channel; remove them before anything else
        if let Err(e) = msg.delete(ctx).await {
            warn!("Failed to delete credential message from {}: {}", msg.author.id, e);
        }
        let _ = msg.channel_id.send_message(
            ctx,
            CreateMessage::default().embed(
                CreateEmbed::default()
                    .title("🔐 Direct Message Only")
                    .description(format!(
                        "<@{}> `{}` takes a password, so it only works in a DM with me. Your message was removed.",
                        msg.author.id, command
                    ))
                    .color(0xffa500)
            )
        ).await;
        return;
    }

    let result = match command {
        "$ping" => ping::execute(ctx, msg).await,
        "$help" => help::execute(ctx, msg).await,
        "$coins" | "$top" => coins::execute(ctx, msg, args).await,
        "$predict" => predict::execute(ctx, msg, args).await,
        "$chart" => chart::execute(ctx, msg, args).await,
        "$register" | "$signup" => register::execute(ctx, msg, args).await,
        "$login" | "$signin" => login::execute(ctx, msg, args).await,
        "$logout" | "$signout" => logout::execute(ctx, msg).await,
        "$profile" | "$me" => profile::execute(ctx, msg).await,
        "$fav" | "$favorites" => favorites::execute(ctx, msg, args).await,
        _ => return,
    };

    if let Err(error_msg) = result {
        error!("Error executing command {}: {}", command, error_msg);

        let clean_error = extract_clean_error(&error_msg);

        let user_message = if error_msg.contains("429") || error_msg.contains("rate limit") {
            "⚠️ **Rate Limited**: Too many requests right now. Please try again in a moment.".to_string()
        } else if error_msg.contains("HTTP request") {
            "⚠️ **Network Error**: Having trouble connecting. Please try again.".to_string()
        } else if clean_error.starts_with(&['❌', '⚠', '🔒'][..]) {
            clean_error
        } else if !clean_error.is_empty() {
            format!("❌ {}", clean_error)
        } else {
            "❌ An error occurred while executing the command.".to_string()
        };

        let embed = CreateEmbed::default()
            .title("Command Error")
            .description(user_message)
            .color(0xff0000);

        let _ = msg.channel_id
            .send_message(ctx, CreateMessage::default().embed(embed))
            .await;
    }
}
