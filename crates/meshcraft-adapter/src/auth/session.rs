/*
[INPUT]:  Bearer tokens and optional expirations from the sign-in flow
[OUTPUT]: Token retrieval and expiration status
[POS]:    Auth layer - session token lifecycle management
[UPDATE]: When adding token refresh or changing storage strategy
*/

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

/// Stored token data with metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenData {
    pub token: String,
    /// `None` means the backend did not announce an expiry
    pub expires_at: Option<DateTime<Utc>>,
    pub user_id: Option<String>,
}

impl TokenData {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now > at)
    }
}

/// Thread-safe session token store, shared between the HTTP client and the app
#[derive(Debug, Clone)]
pub struct SessionManager {
    data: Arc<RwLock<Option<TokenData>>>,
}

impl SessionManager {
    /// Create a new signed-out session
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(None)),
        }
    }

    /// Store a new token, optionally expiring after `expires_seconds`
    pub fn set_token(&self, token: String, expires_seconds: Option<u64>, user_id: Option<String>) {
        let expires_at = expires_seconds.and_then(expiry_after);
        self.restore(TokenData {
            token,
            expires_at,
            user_id,
        });
    }

    /// Replace the session with previously persisted token data
    pub fn restore(&self, data: TokenData) {
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(data);
    }

    /// Get the current token if one is stored and not expired
    pub fn valid_token(&self) -> Option<String> {
        let guard = self.data.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .as_ref()
            .filter(|data| !data.is_expired_at(Utc::now()))
            .map(|data| data.token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.valid_token().is_some()
    }

    /// Get token data if available, expired or not
    pub fn token_data(&self) -> Option<TokenData> {
        let guard = self.data.read().unwrap_or_else(PoisonError::into_inner);
        guard.clone()
    }

    /// Sign out
    pub fn clear(&self) {
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
    }
}

/// `None` when the lifetime is too large to represent; such a token never expires
fn expiry_after(secs: u64) -> Option<DateTime<Utc>> {
    let lifetime = Duration::try_seconds(i64::try_from(secs).ok()?)?;
    Utc::now().checked_add_signed(lifetime)
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
