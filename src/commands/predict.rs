use serenity::builder::{CreateEmbed, CreateEmbedFooter, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;
use tracing::{debug, info};

use crate::models::{Asset, Fetch, HistoricalSeries, PredictionResult, Timeframe};
use crate::services::{market_service, prediction_service};
use crate::state::AppState;
use crate::utils::view::ViewTicket;
use crate::utils::{format_percent, format_usd};

pub const DISCLAIMER: &str = "Predictions extend the recent price trend in a straight line. This is not financial advice.";

/// `<coin words...> [timeframe]`: a trailing timeframe is optional
pub fn parse_coin_and_timeframe(args: &[&str]) -> Result<(String, Timeframe), String> {
    let (coin_words, timeframe) = match args.split_last() {
        Some((last, rest)) if !rest.is_empty() => match Timeframe::parse(last) {
            Ok(timeframe) => (rest, timeframe),
            Err(_) => (args, Timeframe::default()),
        },
        _ => (args, Timeframe::default()),
    };

    let coin = coin_words.join(" ");
    if coin.trim().is_empty() {
        return Err("❌ Usage: `<coin> [7d|30d|3m]`, e.g. `bitcoin 30d`".to_string());
    }
    Ok((coin, timeframe))
}

/// Coin, its history and every timeframe's prediction, ready to render
pub struct PredictionView {
    pub asset: Asset,
    pub series: HistoricalSeries,
    pub predictions: Vec<PredictionResult>,
}

/// Fetch everything a prediction view needs for `coin`
pub async fn load_prediction_view(state: &AppState, coin: &str) -> Result<PredictionView, String> {
    let asset = market_service::resolve_asset(&state.market, state.top_assets_limit, coin).await?;

    let series = match market_service::fetch_history(&state.market, &asset.id, state.history_days).await {
        Fetch::Fresh(series) => series,
        Fetch::Fallback { reason, .. } => {
            return Err(format!(
                "⚠️ Price history for {} is unavailable right now ({}). Please try again later.",
                asset.name, reason
            ));
        }
    };

    if series.len() < 2 {
        return Err(format!("❌ Not enough price history for {} to make a prediction.", asset.name));
    }

    let predictions = prediction_service::build_predictions(&asset, &series)
        .map_err(|e| format!("❌ {}", e))?;
    Ok(PredictionView { asset, series, predictions })
}

/// A view result may only be shown while it is still the user's open view and they are signed in
pub async fn still_wanted(state: &AppState, ticket: &ViewTicket, discord_id: u64) -> bool {
    ticket.is_current() && state.sessions.is_active(discord_id).await
}

/// Keep a finished load, success or failure, only while its view is still wanted
pub fn settle<T>(outcome: Result<T, String>, wanted: bool) -> Result<Option<T>, String> {
    if !wanted {
        return Ok(None);
    }
    outcome.map(Some)
}

pub fn create_prediction_embed(asset: &Asset, predictions: &[PredictionResult], selected: &PredictionResult) -> CreateEmbed {
    let others = predictions
        .iter()
        .map(|p| {
            let marker = if p.timeframe == selected.timeframe { "▶" } else { "•" };
            format!(
                "{} **{}**: {} ({})",
                marker,
                p.timeframe.label(),
                format_usd(p.predicted_price),
                format_percent(p.percentage_change)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let (trend, color) = if selected.is_gain() { ("📈", 0x00ff00) } else { ("📉", 0xff0000) };

    let mut embed = CreateEmbed::default()
        .title(format!("🔮 {} ({}) Price Prediction", asset.name, asset.display_symbol()))
        .field("Current Price", format_usd(selected.current_price), true)
        .field(
            format!("Predicted ({})", selected.timeframe.label()),
            format!("**{}**", format_usd(selected.predicted_price)),
            true,
        )
        .field("Change", format!("{} {}", trend, format_percent(selected.percentage_change)), true)
        .field("All Timeframes", others, false)
        .footer(CreateEmbedFooter::new(DISCLAIMER))
        .color(color);

    if !asset.image.is_empty() {
        embed = embed.thumbnail(&asset.image);
    }

    embed
}

pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    let state = crate::state::app_state(ctx).await?;
    let discord_id = msg.author.id.get();

    state.auth.active_session(discord_id).await?;
    let (coin, timeframe) = parse_coin_and_timeframe(args)?;
    info!("🔮 Prediction requested by {} for '{}' ({})", msg.author.id, coin, timeframe);

    let ticket = state.views.open(discord_id);
    let _ = msg.channel_id.broadcast_typing(ctx).await;

    let loaded = load_prediction_view(&state, &coin).await;

    // Errors for a superseded view are dropped along with results
    let wanted = still_wanted(&state, &ticket, discord_id).await;
    let Some(view) = settle(loaded, wanted)? else {
        debug!("Discarding stale prediction for {} ('{}')", msg.author.id, coin);
        return Ok(());
    };

    let selected = prediction_service::select(&view.predictions, timeframe)
        .ok_or_else(|| format!("❌ No prediction available for {}", timeframe))?;
    let embed = create_prediction_embed(&view.asset, &view.predictions, selected);

    msg.channel_id
        .send_message(ctx, CreateMessage::default().embed(embed))
        .await
        .map_err(|e| e.to_string())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::view::ViewTracker;

    #[test]
    fn test_parse_coin_and_timeframe() {
        assert_eq!(parse_coin_and_timeframe(&["bitcoin"]).unwrap(), ("bitcoin".to_string(), Timeframe::Week));
        assert_eq!(parse_coin_and_timeframe(&["eth", "3m"]).unwrap(), ("eth".to_string(), Timeframe::Quarter));
        assert_eq!(
            parse_coin_and_timeframe(&["usd", "coin", "30d"]).unwrap(),
            ("usd coin".to_string(), Timeframe::Month)
        );
        // A lone timeframe-looking word is the coin
        assert_eq!(parse_coin_and_timeframe(&["7d"]).unwrap(), ("7d".to_string(), Timeframe::Week));
        assert!(parse_coin_and_timeframe(&[]).is_err());
    }

    #[test]
    fn test_closed_view_drops_both_outcomes() {
        let views = ViewTracker::new();
        let ticket = views.open(1);
        assert_eq!(settle(Ok::<_, String>(5), ticket.is_current()), Ok(Some(5)));
        assert_eq!(
            settle(Err::<u32, _>("⚠️ Market data is unavailable".to_string()), ticket.is_current()),
            Err("⚠️ Market data is unavailable".to_string())
        );

        // Signing out closes the view while the fetch is still in flight
        views.close(1);
        assert_eq!(settle(Ok::<_, String>(5), ticket.is_current()), Ok(None));
        assert_eq!(settle(Err::<u32, _>("⚠️ Market data is unavailable".to_string()), ticket.is_current()), Ok(None));
    }

    #[test]
    fn test_newer_view_drops_older_error() {
        let views = ViewTracker::new();
        let older = views.open(1);
        let _newer = views.open(1);
        assert_eq!(settle(Err::<u32, _>("❌ Unknown coin".to_string()), older.is_current()), Ok(None));
    }
}
