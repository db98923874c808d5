use serenity::prelude::{Context, TypeMapKey};
use std::sync::Arc;

use crate::api::coingecko::CoinGeckoClient;
use crate::services::auth_service::AuthService;
use crate::services::profile_service::ProfileStore;
use crate::services::session_service::SessionRegistry;
use crate::utils::view::ViewTracker;

/// Everything commands need, built once in `main`
pub struct AppState {
    pub market: CoinGeckoClient,
    pub auth: AuthService,
    pub sessions: Arc<SessionRegistry>,
    pub views: ViewTracker,
    pub profiles: Arc<dyn ProfileStore>,
    pub top_assets_limit: u32,
    pub history_days: u32,
}

pub struct AppData;

impl TypeMapKey for AppData {
    type Value = Arc<AppState>;
}

/// Pull the shared state out of the client data
pub async fn app_state(ctx: &Context) -> Result<Arc<AppState>, String> {
    let data = ctx.data.read().await;
    data.get::<AppData>()
        .cloned()
        .ok_or_else(|| "Bot state not initialized".to_string())
}
