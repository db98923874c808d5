use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::model::channel::Message;
use serenity::prelude::Context;

use crate::services::{market_service, profile_service};

const USAGE: &str = "❌ Usage: `$fav`, `$fav add <coin>` or `$fav remove <coin>`";

enum FavoriteAction {
    List,
    Add(String),
    Remove(String),
}

/// A bare coin name means "add"
fn parse_action(args: &[&str]) -> Result<FavoriteAction, String> {
    let (action, coin) = match args.split_first() {
        None => return Ok(FavoriteAction::List),
        Some((&first, rest)) => match first.to_lowercase().as_str() {
            "add" => ("add", rest.join(" ")),
            "remove" | "rm" => ("remove", rest.join(" ")),
            "list" if rest.is_empty() => return Ok(FavoriteAction::List),
            _ => ("add", args.join(" ")),
        },
    };

    let coin = coin.trim().to_string();
    if coin.is_empty() {
        return Err(USAGE.to_string());
    }
    Ok(if action == "add" { FavoriteAction::Add(coin) } else { FavoriteAction::Remove(coin) })
}

pub async fn execute(ctx: &Context, msg: &Message, args: &[&str]) -> Result<(), String> {
    let action = parse_action(args)?;
    let state = crate::state::app_state(ctx).await?;
    let session = state.auth.active_session(msg.author.id.get()).await?;
    let uid = &session.user.uid;
    let store = state.profiles.as_ref();

    let (title, favorites) = match action {
        FavoriteAction::List => ("⭐ Your Favorites", profile_service::list_favorites(store, uid).await),
        FavoriteAction::Add(coin) => {
            let asset = market_service::resolve_asset(&state.market, state.top_assets_limit, &coin).await?;
            ("⭐ Added to Favorites", profile_service::add_favorite(store, uid, &asset.id).await)
        }
        FavoriteAction::Remove(coin) => {
            let current = profile_service::list_favorites(store, uid).await.map_err(|e| e.to_string())?;
            let coin_id = coin.to_lowercase();
            // Favorites hold coin ids; accept a symbol or name too when the id isn't listed
            let coin_id = if current.contains(&coin_id) {
                coin_id
            } else {
                market_service::resolve_asset(&state.market, state.top_assets_limit, &coin).await?.id
            };
            ("🗑️ Removed from Favorites", profile_service::remove_favorite(store, uid, &coin_id).await)
        }
    };
    let favorites = favorites.map_err(|e| e.to_string())?;

    let description = if favorites.is_empty() {
        "You have no favorite coins yet.".to_string()
    } else {
        favorites
            .iter()
            .enumerate()
            .map(|(i, id)| format!("{}. `{}`", i + 1, id))
            .collect::<Vec<_>>()
            .join("\n")
    };

    msg.channel_id
        .send_message(
            ctx,
            CreateMessage::default().embed(CreateEmbed::default().title(title).description(description).color(0xffd700)),
        )
        .await
        .map_err(|e| e.to_string())?;

    Ok(())
}
