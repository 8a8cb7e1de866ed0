//! Tabula Auth - In-Memory Token Sessions
//!
//! Trivial request authentication: opaque tokens mapped to session ids in
//! process memory. Nothing here survives a restart, and nothing here is a
//! substitute for real credential storage — it exists to gate the request
//! pipeline during development and tests.

pub mod random;

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

pub use random::{random_string, random_string_excluding};

/// Tokens are fixed at ten characters.
const TOKEN_LENGTH: usize = 10;

/// In-memory token registry.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    tokens: RwLock<HashMap<String, i64>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh token for `id` and remember the association.
    pub fn register(&self, id: i64) -> String {
        let token = random_string(TOKEN_LENGTH);
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.clone(), id);
        token
    }

    /// Whether `token` was issued for `id`.
    pub fn check(&self, id: i64, token: &str) -> bool {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            == Some(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_then_check() {
        let registry = SessionRegistry::new();
        let token = registry.register(10);
        assert_eq!(token.chars().count(), TOKEN_LENGTH);
        assert!(registry.check(10, &token));
        assert!(!registry.check(11, &token));
        assert!(!registry.check(10, "not-a-token"));
    }

    #[test]
    fn test_tokens_are_distinct_per_registration() {
        let registry = SessionRegistry::new();
        let a = registry.register(1);
        let b = registry.register(1);
        // Collisions over a 62-char alphabet at length 10 are negligible.
        assert_ne!(a, b);
        assert!(registry.check(1, &a));
        assert!(registry.check(1, &b));
    }
}
