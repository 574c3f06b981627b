#![deny(clippy::all)]

use async_trait::async_trait;
use bytes::Bytes;
use shared::config::Config;
use shared::{Result, TtlSecs};
use std::sync::Arc;
use std::time::Duration;

// Ports are the pluggable extension points for the key-value engine underneath the paste store

/// Expiry state of a single key, as reported by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyTtl {
    /// No such key.
    Missing,
    /// Key exists without an expiration.
    Persistent,
    /// Key is still stored but its deadline has passed; the engine has not
    /// reclaimed it yet.
    Expired,
    /// Key expires after the given duration.
    Expires(Duration),
}

impl KeyTtl {
    /// Remaining lifetime in whole seconds, rounded up so that a live key never
    /// reports zero. `None` when the key is missing, expired or persistent.
    pub fn remaining_secs(&self) -> Option<i64> {
        match self {
            KeyTtl::Expires(remaining) if !remaining.is_zero() => {
                let secs = remaining.as_millis().div_ceil(1000);
                Some(i64::try_from(secs).unwrap_or(i64::MAX))
            }
            _ => None,
        }
    }

    pub fn is_expired(&self) -> bool {
        match self {
            KeyTtl::Expired => true,
            KeyTtl::Expires(remaining) => remaining.is_zero(),
            _ => false,
        }
    }
}

/// One stored key and its expiry state, as returned by a scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEntry {
    pub key: String,
    pub ttl: KeyTtl,
}

/// Port for the key-value engine. Every call is a single atomic per-key
/// operation against the backend; implementations never retry.
#[async_trait]
pub trait KeyValueBackend: Send + Sync + 'static {
    /// Store `value` under `key`, replacing any previous value and expiry.
    async fn set_with_ttl(&self, key: &str, value: Bytes, ttl: TtlSecs) -> Result<()>;

    /// Read a live value. Expired keys read as `None`.
    async fn get(&self, key: &str) -> Result<Option<Bytes>>;

    /// Remove a key. Returns whether an entry was removed, including one still
    /// held past its deadline.
    async fn delete(&self, key: &str) -> Result<bool>;

    async fn exists(&self, key: &str) -> Result<bool>;

    async fn ttl(&self, key: &str) -> Result<KeyTtl>;

    /// Enumerate stored keys, including expired entries not yet reclaimed.
    async fn scan(&self) -> Result<Vec<KeyEntry>>;

    async fn ping(&self) -> Result<()>;

    /// Flush and release resources. Called once at shutdown.
    async fn close(&self) -> Result<()>;
}

/// Port for creating a backend from configuration
/// This allows different engines to be plugged in
pub trait StorageFactory: Send + Sync + 'static {
    fn create_from_config(&self, config: &Config) -> Result<Arc<dyn KeyValueBackend>>;
}
