//! In-memory admin session registry.
//!
//! Sessions are deliberately not persisted: a restart logs every admin out,
//! which is an accepted trade-off for this deployment. Expiry is checked
//! lazily on read instead of through scheduled deletions, so logout never
//! has to cancel a pending timer.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct SessionRegistry {
    tokens: Arc<DashMap<String, DateTime<Utc>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token valid for `ttl` from now.
    pub fn insert(&self, token: String, ttl: Duration) {
        self.tokens.insert(token, Utc::now() + ttl);
    }

    /// A token is valid while it is present and unexpired. Expired entries
    /// are dropped on the spot so a long-lived process does not leak them.
    pub fn is_valid(&self, token: &str) -> bool {
        let expired = match self.tokens.get(token) {
            Some(entry) => *entry.value() <= Utc::now(),
            None => return false,
        };
        if expired {
            self.tokens.remove(token);
            return false;
        }
        true
    }

    /// Remove a token. Revoking an absent token is a no-op.
    pub fn revoke(&self, token: &str) {
        self.tokens.remove(token);
    }

    pub fn active_count(&self) -> usize {
        self.tokens.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_is_valid_until_revoked() {
        let registry = SessionRegistry::new();
        registry.insert("tok".to_string(), Duration::hours(24));
        assert!(registry.is_valid("tok"));

        registry.revoke("tok");
        assert!(!registry.is_valid("tok"));
    }

    #[test]
    fn revoking_twice_is_a_noop() {
        let registry = SessionRegistry::new();
        registry.insert("tok".to_string(), Duration::hours(1));
        registry.revoke("tok");
        registry.revoke("tok");
        assert!(!registry.is_valid("tok"));
    }

    #[test]
    fn unknown_token_is_invalid() {
        let registry = SessionRegistry::new();
        assert!(!registry.is_valid("never-issued"));
    }

    #[test]
    fn expired_token_is_invalid_and_dropped() {
        let registry = SessionRegistry::new();
        registry.insert("old".to_string(), Duration::seconds(-1));
        assert!(!registry.is_valid("old"));
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn registries_share_state_across_clones() {
        let registry = SessionRegistry::new();
        let other = registry.clone();
        registry.insert("tok".to_string(), Duration::hours(1));
        assert!(other.is_valid("tok"));
        other.revoke("tok");
        assert!(!registry.is_valid("tok"));
    }
}
