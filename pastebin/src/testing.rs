//! Backends for unit tests: a map with deadlines, and one that always fails.

use crate::ports::{KeyEntry, KeyTtl, KeyValueBackend};
use async_trait::async_trait;
use bytes::Bytes;
use shared::{Error, Result, TtlSecs};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

#[derive(Default)]
pub struct MapBackend {
    entries: Mutex<HashMap<String, (Bytes, Instant)>>,
    fail_reads: AtomicBool,
    ghosts: Mutex<Vec<String>>,
}

impl MapBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an entry whose deadline already passed, as an engine with lazy
    /// eviction would still hold it.
    pub fn insert_expired(&self, key: &str, value: Bytes) {
        let past = Instant::now() - Duration::from_secs(1);
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value, past));
    }

    /// Report `key` as expired in scans without storing it, as if another
    /// caller deleted it between the scan and the delete.
    pub fn insert_ghost(&self, key: &str) {
        self.ghosts.lock().unwrap().push(key.to_string());
    }

    /// Make `get` and `ttl` fail while writes keep succeeding.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn raw_len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    fn check_reads(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::Backend("read refused".into()));
        }
        Ok(())
    }

    fn live(&self, key: &str) -> Option<(Bytes, Instant)> {
        let entries = self.entries.lock().unwrap();
        entries
            .get(key)
            .filter(|(_, deadline)| *deadline > Instant::now())
            .cloned()
    }
}

#[async_trait]
impl KeyValueBackend for MapBackend {
    async fn set_with_ttl(&self, key: &str, value: Bytes, ttl: TtlSecs) -> Result<()> {
        let deadline = Instant::now() + ttl.as_duration();
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value, deadline));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        self.check_reads()?;
        Ok(self.live(key).map(|(value, _)| value))
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let removed = self.entries.lock().unwrap().remove(key);
        Ok(removed.is_some())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.live(key).is_some())
    }

    async fn ttl(&self, key: &str) -> Result<KeyTtl> {
        self.check_reads()?;
        Ok(match self.live(key) {
            Some((_, deadline)) => KeyTtl::Expires(deadline.saturating_duration_since(Instant::now())),
            None => KeyTtl::Missing,
        })
    }

    async fn scan(&self) -> Result<Vec<KeyEntry>> {
        let now = Instant::now();
        let entries = self.entries.lock().unwrap();
        let ghosts = self.ghosts.lock().unwrap();
        Ok(entries
            .iter()
            .map(|(key, (_, deadline))| KeyEntry {
                key: key.clone(),
                ttl: if *deadline > now {
                    KeyTtl::Expires(*deadline - now)
                } else {
                    KeyTtl::Expired
                },
            })
            .chain(ghosts.iter().map(|key| KeyEntry {
                key: key.clone(),
                ttl: KeyTtl::Expired,
            }))
            .collect())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Every operation fails as if the engine were unreachable.
pub struct FailingBackend;

fn unreachable_backend<T>() -> Result<T> {
    Err(Error::Backend("connection refused".into()))
}

#[async_trait]
impl KeyValueBackend for FailingBackend {
    async fn set_with_ttl(&self, _key: &str, _value: Bytes, _ttl: TtlSecs) -> Result<()> {
        unreachable_backend()
    }

    async fn get(&self, _key: &str) -> Result<Option<Bytes>> {
        unreachable_backend()
    }

    async fn delete(&self, _key: &str) -> Result<bool> {
        unreachable_backend()
    }

    async fn exists(&self, _key: &str) -> Result<bool> {
        unreachable_backend()
    }

    async fn ttl(&self, _key: &str) -> Result<KeyTtl> {
        unreachable_backend()
    }

    async fn scan(&self) -> Result<Vec<KeyEntry>> {
        unreachable_backend()
    }

    async fn ping(&self) -> Result<()> {
        unreachable_backend()
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
