//! Response cache for translations.
//!
//! Entries hold the raw backend text, before the acting user is substituted
//! for the placeholder, so the stored value is the same for anyone whose
//! request produced the same key.

use async_trait::async_trait;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

const KEY_PREFIX: &str = "command_translator";

/// Cache key for one (user, query, view) triple.
///
/// The parts are compared as separate fields, so ids and queries containing
/// `:` cannot collide. [`Display`](fmt::Display) renders
/// `command_translator:<user id>:<query>:<view description>` for logs only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    user_id: String,
    query: String,
    view_description: String,
}

impl CacheKey {
    pub fn new(user_id: &str, query: &str, view_description: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            query: query.to_string(),
            view_description: view_description.to_string(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn view_description(&self) -> &str {
        &self.view_description
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}:{}", KEY_PREFIX, self.user_id, self.query, self.view_description)
    }
}

#[async_trait]
pub trait ResponseCache: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Option<String>;

    async fn put(&self, key: CacheKey, response: String);
}

#[async_trait]
impl<T: ResponseCache + ?Sized> ResponseCache for Arc<T> {
    async fn get(&self, key: &CacheKey) -> Option<String> {
        (**self).get(key).await
    }

    async fn put(&self, key: CacheKey, response: String) {
        (**self).put(key, response).await
    }
}

/// Process-local cache. Clones share the same entries; nothing is evicted.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<DashMap<CacheKey, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[async_trait]
impl ResponseCache for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    async fn put(&self, key: CacheKey, response: String) {
        self.entries.insert(key, response);
    }
}

/// A cache that never remembers anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

#[async_trait]
impl ResponseCache for NoCache {
    async fn get(&self, _key: &CacheKey) -> Option<String> {
        None
    }

    async fn put(&self, _key: CacheKey, _response: String) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_components() {
        let key = CacheKey::new("u-1", "my cards", "inside a card");
        assert_eq!(key.to_string(), "command_translator:u-1:my cards:inside a card");
        assert_eq!(key.user_id(), "u-1");

        assert_ne!(key, CacheKey::new("u-2", "my cards", "inside a card"));
        assert_ne!(key, CacheKey::new("u-1", "my card", "inside a card"));
        assert_ne!(key, CacheKey::new("u-1", "my cards", "not seeing cards"));
    }

    #[test]
    fn test_colons_do_not_collide() {
        let a = CacheKey::new("a:b", "c", "inside a card");
        let b = CacheKey::new("a", "b:c", "inside a card");
        assert_eq!(a.to_string(), b.to_string());
        assert_ne!(a, b);

        let gid = CacheKey::new("gid://app/User/1", "my cards", "inside a card");
        assert_ne!(gid, CacheKey::new("gid", "//app/User/1:my cards", "inside a card"));
    }

    #[tokio::test]
    async fn test_memory_cache_shared_between_clones() {
        let cache = MemoryCache::new();
        let other = cache.clone();
        let key = CacheKey::new("u-1", "q", "v");

        assert_eq!(cache.get(&key).await, None);
        other.put(key.clone(), "{}".to_string()).await;
        assert_eq!(cache.get(&key).await.as_deref(), Some("{}"));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn test_no_cache_forgets() {
        let key = CacheKey::new("u-1", "q", "v");
        NoCache.put(key.clone(), "{}".to_string()).await;
        assert_eq!(NoCache.get(&key).await, None);
    }
}
