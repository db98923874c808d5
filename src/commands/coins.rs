use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::models::Fetch;
use crate::services::{coin_list_service, market_service};
use crate::utils::Page;

pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    let state = crate::state::app_state(ctx).await?;
    let (search, page_num) = coin_list_service::parse_args(args);

    // Fetch the ranked list; a fallback gets a notice instead of an empty table
    let fetched = market_service::list_top_assets(&state.market, state.top_assets_limit).await;
    if let Fetch::Fallback { reason, .. } = &fetched {
        tracing::warn!("Coin list unavailable for {}: {}", msg.author.id, reason);
        let embed = CreateEmbed::default()
            .title("📈 Top Cryptocurrencies")
            .description("Failed to load cryptocurrency data. Please try again later.")
            .color(0xffa500);
        msg.channel_id
            .send_message(ctx, CreateMessage::default().embed(embed))
            .await
            .map_err(|e| format!("Failed to send message: {}", e))?;
        return Ok(());
    }

    // Filter by search term
    let matches = market_service::search_assets(fetched.value(), &search);
    if matches.is_empty() {
        return Err(if search.is_empty() {
            "❌ No cryptocurrencies were returned.".to_string()
        } else {
            format!("❌ No cryptocurrencies match \"{}\".", search)
        });
    }

    // Build pages and jump to the requested one
    let mut page = Page::new(coin_list_service::create_coin_pages(&matches, &search));
    page.go_to(page_num)?;
    tracing::debug!("Showing coin page {}/{} for {}", page_num, page.total_pages(), msg.author.id);

    msg.channel_id
        .send_message(ctx, page.create_message())
        .await
        .map_err(|e| format!("Failed to send message: {}", e))?;

    Ok(())
}
