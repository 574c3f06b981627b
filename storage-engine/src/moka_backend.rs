use async_trait::async_trait;
use bytes::Bytes;
use moka::Expiry;
use moka::future::Cache;
use pastebin::ports::{KeyEntry, KeyTtl, KeyValueBackend};
use shared::{Error, Result, TtlSecs};
use std::fmt::Debug;
use std::time::{Duration, Instant};

/// Longest deadline handed to the cache. Larger lifetimes are clamped to it so
/// the deadline stays representable as an `Instant`.
const MAX_LIFETIME: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

#[derive(Clone)]
struct MokaEntry {
    value: Bytes,
    expires_at: Instant,
}

impl MokaEntry {
    fn remaining(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }

    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Expires each entry at its own deadline; an overwrite replaces the deadline.
struct PerKeyExpiry;

impl Expiry<String, MokaEntry> for PerKeyExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &MokaEntry,
        created_at: Instant,
    ) -> Option<Duration> {
        Some(value.remaining(created_at))
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &MokaEntry,
        updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.remaining(updated_at))
    }
}

/// Moka-based in-memory backend with per-key TTL
/// Provides a lock-free, concurrent map with optional size bound
pub struct MokaBackend {
    cache: Cache<String, MokaEntry>,
}

impl MokaBackend {
    /// Create a Moka backend with an optional entry bound
    pub fn new(name: &str, max_entries: Option<u64>) -> Self {
        let mut builder = Cache::builder().name(name).expire_after(PerKeyExpiry);

        if let Some(capacity) = max_entries {
            builder = builder.max_capacity(capacity);
        }

        Self {
            cache: builder.build(),
        }
    }

    pub fn unbounded() -> Self {
        Self::new("pastes", None)
    }

    async fn live_entry(&self, key: &str) -> Option<MokaEntry> {
        self.cache
            .get(key)
            .await
            .filter(|entry| entry.is_live(Instant::now()))
    }
}

#[async_trait]
impl KeyValueBackend for MokaBackend {
    async fn set_with_ttl(&self, key: &str, value: Bytes, ttl: TtlSecs) -> Result<()> {
        let expires_at = Instant::now()
            .checked_add(ttl.as_duration().min(MAX_LIFETIME))
            .ok_or_else(|| Error::Backend(format!("Lifetime of {}s is out of range", ttl.0)))?;
        let entry = MokaEntry { value, expires_at };
        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        Ok(self.live_entry(key).await.map(|entry| entry.value))
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let removed = self.cache.remove(key).await;
        Ok(removed.is_some())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.live_entry(key).await.is_some())
    }

    async fn ttl(&self, key: &str) -> Result<KeyTtl> {
        Ok(match self.live_entry(key).await {
            Some(entry) => KeyTtl::Expires(entry.remaining(Instant::now())),
            None => KeyTtl::Missing,
        })
    }

    async fn scan(&self) -> Result<Vec<KeyEntry>> {
        let now = Instant::now();
        Ok(self
            .cache
            .iter()
            .map(|(key, entry)| KeyEntry {
                key: key.as_ref().clone(),
                ttl: if entry.is_live(now) {
                    KeyTtl::Expires(entry.remaining(now))
                } else {
                    KeyTtl::Expired
                },
            })
            .collect())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.cache.run_pending_tasks().await;
        Ok(())
    }
}

impl Debug for MokaBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaBackend")
            .field("entry_count", &self.cache.entry_count())
            .field("weighted_size", &self.cache.weighted_size())
            .finish()
    }
}
