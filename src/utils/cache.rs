use moka::future::Cache;
use once_cell::sync::Lazy;
use std::time::Duration;

// Profile lookups by username. Entries are serialized User documents;
// mutating operations must remove the affected usernames.
pub static PROFILE_CACHE: Lazy<Cache<String, String>> = Lazy::new(|| {
    Cache::builder()
        .time_to_live(Duration::from_secs(5 * 60))
        .time_to_idle(Duration::from_secs(60))
        .max_capacity(10_000)
        .build()
});

pub async fn put<K, V>(cache: &Cache<K, V>, key: K, value: V) -> bool
where
    K: Clone + std::hash::Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    let exists = cache.get(&key).await.is_some();
    cache.insert(key, value).await;
    !exists
}

pub async fn get<K, V>(cache: &Cache<K, V>, key: &K) -> Option<V>
where
    K: Clone + std::hash::Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    cache.get(key).await
}

pub async fn remove<K, V>(cache: &Cache<K, V>, key: &K)
where
    K: Clone + std::hash::Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    cache.remove(key).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_reports_whether_key_was_new() {
        let cache: Cache<String, String> = Cache::builder().max_capacity(10).build();

        assert!(put(&cache, "anna".to_string(), "v1".to_string()).await);
        assert!(!put(&cache, "anna".to_string(), "v2".to_string()).await);
        assert_eq!(get(&cache, &"anna".to_string()).await.as_deref(), Some("v2"));
    }

    #[tokio::test]
    async fn remove_evicts_entry() {
        let cache: Cache<String, String> = Cache::builder().max_capacity(10).build();

        put(&cache, "stefan".to_string(), "v".to_string()).await;
        remove(&cache, &"stefan".to_string()).await;
        assert!(get(&cache, &"stefan".to_string()).await.is_none());
    }
}
