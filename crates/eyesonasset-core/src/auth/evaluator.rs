use std::sync::Arc;

use tracing::{debug, warn};

use super::clock::Clock;
use super::session::{SessionRecord, SessionStore};

/// Decides whether the stored session may be used right now.
///
/// Checked lazily on each call. A record found expired (or with an
/// unreadable expiry) is cleared as a side effect.
#[derive(Clone)]
pub struct SessionEvaluator {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
}

impl SessionEvaluator {
    pub fn new(store: Arc<dyn SessionStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn is_valid(&self) -> bool {
        self.current().is_some()
    }

    /// The stored record if it is still valid
    pub fn current(&self) -> Option<SessionRecord> {
        let record = self.store.read()?;
        if record.is_expired_at(self.clock.now()) {
            debug!(raw_expiry = record.raw_expiry(), "Session expired, clearing");
            if let Err(e) = self.store.clear() {
                warn!(error = %e, "Failed to clear expired session");
            }
            return None;
        }
        Some(record)
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::clock::ManualClock;
    use crate::auth::session::{LocalSessionStore, EXPIRY_KEY, TOKEN_KEY};
    use crate::auth::storage::{KeyValueStorage, MemoryStorage};
    use chrono::Duration;

    fn setup() -> (SessionEvaluator, Arc<LocalSessionStore>, Arc<MemoryStorage>, ManualClock) {
        let clock = ManualClock::starting_now();
        let storage = Arc::new(MemoryStorage::new());
        let store = Arc::new(LocalSessionStore::new(storage.clone(), Arc::new(clock.clone())));
        let evaluator = SessionEvaluator::new(store.clone(), Arc::new(clock.clone()));
        (evaluator, store, storage, clock)
    }

    #[test]
    fn test_absent_session_is_invalid() {
        let (evaluator, _, _, _) = setup();
        assert!(!evaluator.is_valid());
    }

    #[test]
    fn test_fresh_session_is_valid() {
        let (evaluator, store, _, _) = setup();
        for secs in [1, 60, 3600, 86_400 * 365] {
            store.save("abc", Some(secs)).unwrap();
            assert!(evaluator.is_valid(), "expires_in={secs}");
        }
    }

    #[test]
    fn test_expired_session_is_cleared() {
        let (evaluator, store, _, clock) = setup();
        store.save("abc", Some(60)).unwrap();

        clock.advance(Duration::seconds(60));

        assert!(!evaluator.is_valid());
        assert!(store.read().is_none());
    }

    #[test]
    fn test_one_millisecond_past_expiry() {
        let (evaluator, store, storage, clock) = setup();
        let expiry = clock.now() - Duration::milliseconds(1);
        storage.set(TOKEN_KEY, "abc").unwrap();
        storage.set(EXPIRY_KEY, &expiry.timestamp_millis().to_string()).unwrap();

        assert!(!evaluator.is_valid());
        assert!(store.read().is_none());
    }

    #[test]
    fn test_unparsable_expiry_fails_closed() {
        let (evaluator, store, storage, _) = setup();
        storage.set(TOKEN_KEY, "abc").unwrap();
        storage.set(EXPIRY_KEY, "NaN").unwrap();

        assert!(!evaluator.is_valid());
        assert!(store.read().is_none());
    }

    #[test]
    fn test_clear_then_invalid() {
        let (evaluator, store, _, _) = setup();
        store.save("abc", Some(3600)).unwrap();
        store.clear().unwrap();
        assert!(!evaluator.is_valid());
    }

    #[test]
    fn test_no_background_expiry() {
        // Nothing happens to the stored record until somebody asks
        let (evaluator, store, _, clock) = setup();
        store.save("abc", Some(1)).unwrap();
        clock.advance(Duration::seconds(5));

        assert!(store.read().is_some());
        assert!(!evaluator.is_valid());
        assert!(store.read().is_none());
    }
}
