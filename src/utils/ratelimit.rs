use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use lazy_static::lazy_static;
use tokio::sync::Mutex;

lazy_static! {
    static ref COMMAND_COOLDOWNS: Mutex<CooldownTracker> =
        Mutex::new(CooldownTracker::new(COOLDOWN_SECONDS));

    // Global rate limiting: request timestamps inside a sliding 1 second window
    static ref GLOBAL_REQUESTS: Mutex<Vec<u64>> = Mutex::new(Vec::new());
}

const COOLDOWN_SECONDS: u64 = 5;
const GLOBAL_RATE_LIMIT: usize = 50;  // requests per second
const RATE_WINDOW_MS: u64 = 1000;

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Per (user, command) cooldown bookkeeping
pub struct CooldownTracker {
    cooldown_secs: u64,
    last_used: HashMap<(u64, String), u64>,
    // When the user was last told about a cooldown, to avoid message spam
    last_warned: HashMap<(u64, String), u64>,
}

impl CooldownTracker {
    pub fn new(cooldown_secs: u64) -> Self {
        Self {
            cooldown_secs,
            last_used: HashMap::new(),
            last_warned: HashMap::new(),
        }
    }

    /// Ok if the command may run now (and records the use).
    /// Err((remaining_seconds, should_warn)) otherwise; `should_warn` is true
    /// only on the first rejection of a cooldown period.
    pub fn check(&mut self, user_id: u64, command: &str, now_secs: u64) -> Result<(), (u64, bool)> {
        let key = (user_id, command.to_string());

        if let Some(&last_time) = self.last_used.get(&key) {
            let elapsed = now_secs.saturating_sub(last_time);
            if elapsed < self.cooldown_secs {
                let should_warn = match self.last_warned.get(&key) {
                    Some(&last_warning) => last_warning < last_time,
                    None => true,
                };
                if should_warn {
                    self.last_warned.insert(key, now_secs);
                }
                return Err((self.cooldown_secs - elapsed, should_warn));
            }
        }

        self.last_used.insert(key, now_secs);
        Ok(())
    }
}

/// Check if a user can execute a command (cooldown not active)
pub async fn check_cooldown(user_id: u64, command: &str) -> Result<(), (u64, bool)> {
    let now = now_millis() / 1000;
    COMMAND_COOLDOWNS.lock().await.check(user_id, command, now)
}

/// Check global rate limit (50 requests per second across all users)
/// Returns Ok(()) if under limit, Err(remaining_ms) if rate limit exceeded
pub async fn check_global_rate_limit() -> Result<(), u64> {
    let now = now_millis();
    let window_start = now.saturating_sub(RATE_WINDOW_MS);

    let mut requests = GLOBAL_REQUESTS.lock().await;
    requests.retain(|&timestamp| timestamp > window_start);

    if requests.len() >= GLOBAL_RATE_LIMIT {
        // Wait until the oldest request leaves the window
        let oldest_leaves_at = requests[0] + RATE_WINDOW_MS;
        Err(oldest_leaves_at.saturating_sub(now))
    } else {
        requests.push(now);
        Ok(())
    }
}

pub fn get_cooldown_seconds() -> u64 {
    COOLDOWN_SECONDS
}
