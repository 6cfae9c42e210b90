//! Route cache keys.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::route::{Route, RouteFingerprint};

/// Identity of a cached route query: stable id plus geometry fingerprint.
///
/// Two keys match only if both parts are equal, so reusing an id for a
/// changed route never hits the old entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteKey {
    pub route_id: String,
    pub fingerprint: RouteFingerprint,
}

impl RouteKey {
    pub fn new(route_id: impl Into<String>, fingerprint: RouteFingerprint) -> Self {
        Self {
            route_id: route_id.into(),
            fingerprint,
        }
    }

    /// Key for a route's current geometry.
    pub fn for_route(route: &Route) -> Self {
        Self::new(route.id(), route.fingerprint().clone())
    }

    /// Provider-safe store key: lowercase SHA-256 hex of `id NUL fingerprint`.
    pub fn store_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.route_id.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.fingerprint.as_str().as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

impl std::fmt::Display for RouteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let short: String = self.fingerprint.as_str().chars().take(12).collect();
        write!(f, "{}@{}", self.route_id, short)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::traits::is_valid_key;

    #[test]
    fn test_store_key_is_valid_and_stable() {
        let key = RouteKey::new("colchester", RouteFingerprint::from_hex("f1"));
        let store_key = key.store_key();
        assert_eq!(store_key.len(), 64);
        assert!(is_valid_key(&store_key));
        assert_eq!(store_key, key.clone().store_key());
    }

    #[test]
    fn test_store_key_separates_parts() {
        // Without the separator these would hash the same bytes.
        let a = RouteKey::new("ab", RouteFingerprint::from_hex("c"));
        let b = RouteKey::new("a", RouteFingerprint::from_hex("bc"));
        assert_ne!(a.store_key(), b.store_key());
    }

    #[test]
    fn test_display_truncates_fingerprint() {
        let key = RouteKey::new("colchester", RouteFingerprint::from_hex("0123456789abcdef"));
        assert_eq!(key.to_string(), "colchester@0123456789ab");
    }
}
