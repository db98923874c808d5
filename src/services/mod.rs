pub mod auth_service;
pub mod chart_service;
pub mod coin_list_service;
pub mod market_service;
pub mod ping_service;
pub mod prediction_service;
pub mod profile_service;
pub mod session_service;
