use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use super::clock::Clock;
use super::storage::KeyValueStorage;

/// Storage key holding the bearer token
pub const TOKEN_KEY: &str = "token";

/// Storage key holding the expiry instant, milliseconds since epoch
pub const EXPIRY_KEY: &str = "tokenExpiration";

/// Session lifetime used when the backend sends no `expires_in` hint (24h).
pub const DEFAULT_SESSION_LIFETIME_SECS: u64 = 86_400;

/// The persisted token + expiry pair, exactly as found in storage.
///
/// The expiry is kept as the raw stored string. A value that does not parse
/// is reported as expired so a damaged record never grants access.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionRecord {
    token: String,
    raw_expiry: String,
}

impl SessionRecord {
    pub fn new(token: impl Into<String>, raw_expiry: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            raw_expiry: raw_expiry.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn raw_expiry(&self) -> &str {
        &self.raw_expiry
    }

    /// Parsed expiry, or `None` if the stored value is not a millisecond timestamp
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let millis: i64 = self.raw_expiry.trim().parse().ok()?;
        DateTime::from_timestamp_millis(millis)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at() {
            Some(expiry) => now >= expiry,
            None => true,
        }
    }

    pub fn time_until_expiry(&self, now: DateTime<Utc>) -> Duration {
        self.expires_at()
            .map(|expiry| expiry - now)
            .unwrap_or_else(Duration::zero)
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        self.time_until_expiry(now).num_minutes().max(0)
    }
}

impl fmt::Debug for SessionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRecord")
            .field("token", &"<redacted>")
            .field("raw_expiry", &self.raw_expiry)
            .finish()
    }
}

/// Largest second count `chrono::Duration::seconds` accepts
fn clamp_secs(secs: u64) -> i64 {
    secs.min((i64::MAX / 1000) as u64) as i64
}

/// Capability over the single persisted session.
pub trait SessionStore: Send + Sync {
    /// Persist `token`, expiring `expires_in_secs` from now (or the fallback
    /// lifetime when absent or zero). Overwrites any prior record.
    fn save(&self, token: &str, expires_in_secs: Option<u64>) -> Result<SessionRecord>;

    /// The stored pair, or `None` if either half is missing or unreadable.
    fn read(&self) -> Option<SessionRecord>;

    /// Remove both keys. Clearing an absent session is not an error.
    fn clear(&self) -> Result<()>;
}

/// Session store over a `KeyValueStorage`. Holds no cache: every call goes
/// to storage, so storage is the single source of truth.
#[derive(Clone)]
pub struct LocalSessionStore {
    storage: Arc<dyn KeyValueStorage>,
    clock: Arc<dyn Clock>,
    fallback_lifetime: Duration,
}

impl LocalSessionStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            fallback_lifetime: Duration::seconds(DEFAULT_SESSION_LIFETIME_SECS as i64),
        }
    }

    pub fn with_fallback_lifetime(mut self, secs: u64) -> Self {
        self.fallback_lifetime = Duration::seconds(clamp_secs(secs));
        self
    }

    pub fn fallback_lifetime(&self) -> Duration {
        self.fallback_lifetime
    }

    fn read_key(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, key, "Failed to read session key, treating session as absent");
                None
            }
        }
    }
}

impl SessionStore for LocalSessionStore {
    fn save(&self, token: &str, expires_in_secs: Option<u64>) -> Result<SessionRecord> {
        if token.is_empty() {
            anyhow::bail!("Refusing to store an empty token");
        }

        let lifetime = match expires_in_secs {
            Some(secs) if secs > 0 => Duration::seconds(clamp_secs(secs)),
            _ => self.fallback_lifetime,
        };
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(lifetime)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let raw_expiry = expires_at.timestamp_millis().to_string();

        self.storage.set(TOKEN_KEY, token)?;
        if let Err(e) = self.storage.set(EXPIRY_KEY, &raw_expiry) {
            // The new token must not pair with an older expiry
            if let Err(clear_err) = self.clear() {
                warn!(error = %clear_err, "Failed to roll back partially saved session");
            }
            return Err(e);
        }

        debug!(expires_at = %expires_at, "Session saved");
        Ok(SessionRecord::new(token, raw_expiry))
    }

    fn read(&self) -> Option<SessionRecord> {
        let token = self.read_key(TOKEN_KEY).filter(|t| !t.is_empty())?;
        let raw_expiry = self.read_key(EXPIRY_KEY)?;
        Some(SessionRecord::new(token, raw_expiry))
    }

    fn clear(&self) -> Result<()> {
        // Attempt both removals even if the first fails
        let token_result = self.storage.remove(TOKEN_KEY);
        let expiry_result = self.storage.remove(EXPIRY_KEY);
        token_result?;
        expiry_result?;
        debug!("Session cleared");
        Ok(())
    }
}
