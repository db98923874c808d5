use serenity::builder::{CreateAttachment, CreateEmbed, CreateEmbedFooter, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::commands::predict::{self, DISCLAIMER};
use crate::services::{chart_service, prediction_service};
use crate::utils::{format_percent, format_usd};

pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    let state = crate::state::app_state(ctx).await?;
    let discord_id = msg.author.id.get();

    state.auth.active_session(discord_id).await?;
    let (coin, timeframe) = predict::parse_coin_and_timeframe(args)?;
    tracing::info!("🎨 Chart requested by {} for '{}' ({})", msg.author.id, coin, timeframe);

    let ticket = state.views.open(discord_id);
    if let Err(e) = msg.channel_id.broadcast_typing(ctx).await {
        tracing::warn!("Failed to broadcast typing: {}", e);
    }

    // Load and render as one unit so a stale view drops either outcome
    let loaded = async {
        let view = predict::load_prediction_view(&state, &coin).await?;
        let selected = prediction_service::select(&view.predictions, timeframe)
            .cloned()
            .ok_or_else(|| format!("❌ No prediction available for {}", timeframe))?;

        let coin_name = view.asset.name.clone();
        let series = view.series.clone();
        let chart_selected = selected.clone();
        let chart_data = tokio::task::spawn_blocking(move || {
            chart_service::generate_prediction_chart(
                &coin_name,
                &series,
                &chart_selected,
                chart_service::CHART_WIDTH,
                chart_service::CHART_HEIGHT,
            )
        })
        .await
        .map_err(|e| format!("Chart rendering task failed: {}", e))??;

        Ok::<_, String>((view, selected, chart_data))
    }
    .await;

    let wanted = predict::still_wanted(&state, &ticket, discord_id).await;
    let Some((view, selected, chart_data)) = predict::settle(loaded, wanted)? else {
        tracing::debug!("Discarding stale chart for {} ('{}')", msg.author.id, coin);
        return Ok(());
    };

    tracing::info!("✓ Chart generated for {}: {} bytes", view.asset.id, chart_data.len());

    let filename = format!("{}_{}.png", view.asset.id, timeframe.days());
    let embed = CreateEmbed::default()
        .title(format!("📊 {} ({})", view.asset.name, view.asset.display_symbol()))
        .description(format!(
            "{} → **{}** in {} ({})",
            format_usd(selected.current_price),
            format_usd(selected.predicted_price),
            timeframe.label(),
            format_percent(selected.percentage_change)
        ))
        .image(format!("attachment://{}", filename))
        .footer(CreateEmbedFooter::new(DISCLAIMER))
        .color(if selected.is_gain() { 0x00ff00 } else { 0xff0000 });

    let message = CreateMessage::default()
        .embed(embed)
        .add_file(CreateAttachment::bytes(chart_data, filename));

    msg.channel_id
        .send_message(ctx, message)
        .await
        .map_err(|e| format!("Failed to send chart: {}", e))?;

    Ok(())
}
