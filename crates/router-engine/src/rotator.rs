//! Credential rotation.

use router_core::ApiKey;

/// Ordered, immutable set of credentials for a provider.
///
/// Rotation is deliberately stateless: every operation walks the pool from
/// the first credential in configured order, stopping at the first success.
/// This trades efficiency for simplicity and determinism; nothing about a
/// success or failure is remembered between operations.
#[derive(Debug, Clone)]
pub struct CredentialPool {
    keys: Vec<ApiKey>,
}

impl CredentialPool {
    /// Create a pool from credentials in configured order.
    #[must_use]
    pub fn new(keys: Vec<ApiKey>) -> Self {
        Self { keys }
    }

    /// Number of credentials.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the pool holds no credentials.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The attempt sequence for one operation: every credential, in fixed
    /// configured order, starting again from the first.
    pub fn attempts(&self) -> impl Iterator<Item = &ApiKey> {
        self.keys.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> CredentialPool {
        CredentialPool::new(vec![
            ApiKey::new("key-1"),
            ApiKey::new("key-2"),
            ApiKey::new("key-3"),
        ])
    }

    #[test]
    fn test_attempts_follow_configured_order() {
        let pool = pool();
        let order: Vec<&str> = pool.attempts().map(ApiKey::expose).collect();
        assert_eq!(order, vec!["key-1", "key-2", "key-3"]);
    }

    #[test]
    fn test_every_operation_restarts_from_first() {
        let pool = pool();
        // Consume one sequence fully, then start another.
        let _ = pool.attempts().count();
        let first = pool.attempts().next().map(ApiKey::expose);
        assert_eq!(first, Some("key-1"));
    }

    #[test]
    fn test_empty_pool() {
        let pool = CredentialPool::new(Vec::new());
        assert!(pool.is_empty());
        assert_eq!(pool.attempts().count(), 0);
    }
}
