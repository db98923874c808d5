//! Ping/status command models

/// Bot latency and uptime information
#[derive(Debug)]
pub struct PingMetrics {
    pub response_latency: u64,
    pub uptime: String,
    pub active_sessions: usize,
}
