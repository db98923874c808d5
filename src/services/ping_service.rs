use serenity::prelude::*;
use std::time::{Duration, Instant};

use crate::models::PingMetrics;

pub fn format_uptime(elapsed: Duration) -> String {
    let hours = elapsed.as_secs() / 3600;
    let minutes = (elapsed.as_secs() % 3600) / 60;
    let seconds = elapsed.as_secs() % 60;
    format!("{}h {}m {}s", hours, minutes, seconds)
}

pub async fn get_ping_metrics(ctx: &Context, start_time: Instant) -> Result<PingMetrics, String> {
    let response_latency = start_time.elapsed().as_millis() as u64;

    // Get bot uptime from client data
    let uptime = {
        let data = ctx.data.read().await;
        match data.get::<crate::BotData>() {
            Some(&bot_start_time) => format_uptime(bot_start_time.elapsed()),
            None => "Unknown".to_string(),
        }
    };

    let active_sessions = crate::state::app_state(ctx).await?.sessions.active_count().await;

    Ok(PingMetrics {
        response_latency,
        uptime,
        active_sessions,
    })
}

pub fn create_ping_embed(metrics: &PingMetrics) -> serenity::builder::CreateEmbed {
    serenity::builder::CreateEmbed::default()
        .title("Pong! 🏓")
        .field("Response Latency", format!("{}ms", metrics.response_latency), true)
        .field("Signed-in Users", metrics.active_sessions.to_string(), true)
        .field("Uptime", &metrics.uptime, false)
        .color(0x00b0f4)
}
