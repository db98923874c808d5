use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Tracks which prediction view is currently open for each user.
///
/// A fetch started for a view keeps its [`ViewTicket`]; once the user opens
/// another view or signs out, the ticket goes stale and the fetched result
/// must be dropped instead of rendered.
#[derive(Clone, Default)]
pub struct ViewTracker {
    generations: Arc<Mutex<HashMap<u64, u64>>>,
}

pub struct ViewTicket {
    tracker: ViewTracker,
    user_id: u64,
    generation: u64,
}

impl ViewTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&self, user_id: u64) -> u64 {
        let mut generations = match self.generations.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let generation = generations.entry(user_id).or_insert(0);
        *generation += 1;
        *generation
    }

    fn current(&self, user_id: u64) -> u64 {
        let generations = match self.generations.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        generations.get(&user_id).copied().unwrap_or(0)
    }

    /// Open a new view for the user, superseding any previous one
    pub fn open(&self, user_id: u64) -> ViewTicket {
        ViewTicket {
            tracker: self.clone(),
            user_id,
            generation: self.bump(user_id),
        }
    }

    /// Close whatever view the user has open
    pub fn close(&self, user_id: u64) {
        self.bump(user_id);
    }
}

impl ViewTicket {
    pub fn is_current(&self) -> bool {
        self.tracker.current(self.user_id) == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_view_supersedes_older() {
        let tracker = ViewTracker::new();
        let first = tracker.open(1);
        assert!(first.is_current());

        let second = tracker.open(1);
        assert!(!first.is_current());
        assert!(second.is_current());
    }

    #[test]
    fn test_close_invalidates_ticket() {
        let tracker = ViewTracker::new();
        let ticket = tracker.open(1);
        tracker.close(1);
        assert!(!ticket.is_current());
    }

    #[test]
    fn test_users_are_independent() {
        let tracker = ViewTracker::new();
        let alice = tracker.open(1);
        let _bob = tracker.open(2);
        tracker.close(2);
        assert!(alice.is_current());
    }
}
