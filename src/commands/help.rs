use serenity::builder::{CreateEmbed, CreateEmbedFooter, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::utils::get_cooldown_seconds;

pub async fn execute(ctx: &Context, msg: &Message) -> Result<(), String> {
    let embed = CreateEmbed::default()
        .title("📖 CryptoCast Commands Help")
        .description("**CryptoCast** - live prices for the top cryptocurrencies and simple linear-trend price predictions.")
        .color(0x00b0f4)
        .field(
            "🎯 General",
            "`$ping` - Check bot latency\n`$help` - Show this help message",
            false,
        )
        .field(
            "📈 Market",
            "`$coins [search] [page]` - Top cryptocurrencies by market cap (alias `$top`)",
            false,
        )
        .field(
            "🔮 Predictions (sign-in required)",
            "`$predict <coin> [7d|30d|3m]` - Trend-based price prediction\n`$chart <coin> [7d|30d|3m]` - Price history chart with the prediction\n`$fav [add|remove] <coin>` - Manage your favorite coins",
            false,
        )
        .field(
            "🔐 Account (DM only for credentials)",
            "`$register <email> <password> <name>` - Create an account\n`$login <email> <password>` - Sign in\n`$login google|facebook <token>` - Sign in with a provider token\n`$logout` - Sign out\n`$profile` - Show your profile (alias `$me`)",
            false,
        )
        .field(
            "⚡ Rate Limiting",
            format!("{}-second cooldown per command per user", get_cooldown_seconds()),
            false,
        )
        .footer(CreateEmbedFooter::new("Predictions extrapolate past prices and are not financial advice."));

    msg.channel_id
        .send_message(ctx, CreateMessage::default().embed(embed))
        .await
        .map_err(|e| format!("Failed to send help message: {}", e))?;

    Ok(())
}
