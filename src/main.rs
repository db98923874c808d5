use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn, error, debug};
use tracing_subscriber::EnvFilter;

mod api;
mod commands;
mod config;
mod db;
mod models;
mod services;
mod state;
mod utils;

use api::coingecko::CoinGeckoClient;
use api::firebase::FirebaseIdentityClient;
use config::Config;
use services::auth_service::{AuthService, SessionPersistence};
use services::profile_service::MySqlProfileStore;
use services::session_service::SessionRegistry;
use state::{AppData, AppState};
use utils::encryption::TokenCipher;
use utils::view::ViewTracker;

struct Handler;

struct BotData;

impl TypeMapKey for BotData {
    type Value = Instant;
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        commands::handle_message(&ctx, &msg).await;
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);

        debug!("Checking Discord rate limit status...");
        match ctx.http.get_current_user().await {
            Ok(_) => {
                info!("No rate limit detected - Bot is fully ready!");
            }
            Err(e) => {
                let error_msg = e.to_string();
                if error_msg.contains("429") || error_msg.contains("rate limit") || error_msg.contains("Ratelimited") {
                    warn!("Bot is being rate limited by Discord! Error: {}", error_msg);
                } else {
                    warn!("Failed to check rate limit status: {}", error_msg);
                }
            }
        }
    }
}

fn init_tracing() {
    let mut filter = EnvFilter::from_default_env();
    for directive in ["cryptocast=debug", "serenity=warn"] {
        match directive.parse() {
            Ok(d) => filter = filter.add_directive(d),
            Err(e) => eprintln!("Invalid log directive {}: {}", directive, e),
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    init_tracing();

    info!("🤖 Starting CryptoCast bot v{}...", env!("CARGO_PKG_VERSION"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };

    let cipher = match TokenCipher::from_hex(&config.session_encryption_key) {
        Ok(cipher) => cipher,
        Err(e) => {
            error!("Invalid SESSION_ENCRYPTION_KEY: {}", e);
            return;
        }
    };

    info!("Initializing database...");
    let pool = match db::init_db(&config.database_url).await {
        Ok(p) => {
            info!("Database initialized successfully");
            p
        }
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return;
        }
    };

    let sessions = Arc::new(SessionRegistry::new());
    let views = ViewTracker::new();
    let profiles = Arc::new(MySqlProfileStore::new(pool.clone()));
    let identity = Arc::new(FirebaseIdentityClient::new(config.firebase_api_key.clone()));

    let auth = AuthService::new(
        identity,
        profiles.clone(),
        sessions.clone(),
        views.clone(),
        Some(SessionPersistence { pool, cipher }),
    );

    let restored = auth.restore_sessions().await;
    info!("Restored {} saved session(s)", restored);

    let app_state = Arc::new(AppState {
        market: CoinGeckoClient::with_base_url(config.coingecko_api_key.clone(), config.coingecko_base_url.clone()),
        auth,
        sessions,
        views,
        profiles,
        top_assets_limit: config.top_assets_limit,
        history_days: config.history_days,
    });

    let intents = GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MESSAGES;

    let mut client = match Client::builder(&config.discord_token, intents)
        .event_handler(Handler)
        .await
    {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create client: {}", e);
            return;
        }
    };

    {
        let mut data = client.data.write().await;
        data.insert::<BotData>(Instant::now());
        data.insert::<AppData>(app_state);
    }

    if let Err(e) = client.start().await {
        error!("Client error: {}", e);
    }
}
