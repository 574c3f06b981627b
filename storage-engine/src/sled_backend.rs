use async_trait::async_trait;
use bytes::Bytes;
use pastebin::ports::{KeyEntry, KeyTtl, KeyValueBackend};
use shared::{Error, Result, TtlSecs};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

const HEADER_LEN: usize = 8;

/// Sled-based on-disk backend
///
/// Every value is prefixed with its absolute deadline (big-endian ms since the
/// Unix epoch). Reads past the deadline behave as a miss and drop the entry;
/// entries never read again stay on disk until the expiry sweeper reclaims them.
pub struct SledBackend {
    db: sled::Db,
}

impl SledBackend {
    /// Open (or create) the database at `path`
    /// Creates the parent directory if it doesn't exist
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Backend(format!("Failed to create directory: {}", e)))?;
        }

        let db = sled::open(path)
            .map_err(|e| Error::Backend(format!("Failed to open Sled database: {}", e)))?;

        Ok(Self { db })
    }

    fn read(&self, key: &str) -> Result<Option<(u64, sled::IVec)>> {
        let raw = self
            .db
            .get(key.as_bytes())
            .map_err(|e| Error::Backend(format!("Failed to read key: {}", e)))?;

        match raw {
            Some(raw) => Ok(Some((decode_deadline(&raw)?, raw))),
            None => Ok(None),
        }
    }

    /// Live value and deadline, evicting the entry if its deadline has passed.
    fn read_live(&self, key: &str) -> Result<Option<(u64, sled::IVec)>> {
        let Some((deadline, raw)) = self.read(key)? else {
            return Ok(None);
        };

        if deadline > now_ms() {
            return Ok(Some((deadline, raw)));
        }

        // Only remove the exact expired value; a concurrent overwrite wins.
        let swapped = self
            .db
            .compare_and_swap(key.as_bytes(), Some(&raw), None as Option<&[u8]>)
            .map_err(|e| Error::Backend(format!("Failed to evict key: {}", e)))?;
        if swapped.is_ok() {
            debug!("Evicted expired key {}", key);
        }
        Ok(None)
    }
}

fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

fn encode(deadline_ms: u64, value: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN + value.len());
    buf.extend_from_slice(&deadline_ms.to_be_bytes());
    buf.extend_from_slice(value);
    buf
}

fn decode_deadline(raw: &[u8]) -> Result<u64> {
    let header: [u8; HEADER_LEN] = raw
        .get(..HEADER_LEN)
        .and_then(|h| h.try_into().ok())
        .ok_or_else(|| Error::Backend("Corrupt entry: missing expiry header".to_string()))?;
    Ok(u64::from_be_bytes(header))
}

fn ttl_from_deadline(deadline_ms: u64, now_ms: u64) -> KeyTtl {
    if deadline_ms > now_ms {
        KeyTtl::Expires(Duration::from_millis(deadline_ms - now_ms))
    } else {
        KeyTtl::Expired
    }
}

#[async_trait]
impl KeyValueBackend for SledBackend {
    async fn set_with_ttl(&self, key: &str, value: Bytes, ttl: TtlSecs) -> Result<()> {
        let deadline = now_ms().saturating_add(ttl.0.saturating_mul(1000));
        self.db
            .insert(key.as_bytes(), encode(deadline, &value))
            .map_err(|e| Error::Backend(format!("Failed to write key: {}", e)))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        Ok(self
            .read_live(key)?
            .map(|(_, raw)| Bytes::copy_from_slice(&raw[HEADER_LEN..])))
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let removed = self
            .db
            .remove(key.as_bytes())
            .map_err(|e| Error::Backend(format!("Failed to delete key: {}", e)))?;

        Ok(removed.is_some())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.read_live(key)?.is_some())
    }

    async fn ttl(&self, key: &str) -> Result<KeyTtl> {
        Ok(match self.read(key)? {
            Some((deadline, _)) => ttl_from_deadline(deadline, now_ms()),
            None => KeyTtl::Missing,
        })
    }

    async fn scan(&self) -> Result<Vec<KeyEntry>> {
        let now = now_ms();
        let mut entries = Vec::new();

        for result in self.db.iter() {
            let (key, raw) = result
                .map_err(|e| Error::Backend(format!("Failed to iterate database: {}", e)))?;

            let key = String::from_utf8(key.to_vec())
                .map_err(|e| Error::Backend(format!("Non UTF-8 key: {}", e)))?;

            entries.push(KeyEntry {
                key,
                ttl: ttl_from_deadline(decode_deadline(&raw)?, now),
            });
        }

        Ok(entries)
    }

    async fn ping(&self) -> Result<()> {
        self.db
            .size_on_disk()
            .map_err(|e| Error::Backend(format!("Database unavailable: {}", e)))?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.db
            .flush()
            .map_err(|e| Error::Backend(format!("Failed to flush database: {}", e)))?;
        Ok(())
    }
}

impl std::fmt::Debug for SledBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SledBackend")
            .field("len", &self.db.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, SledBackend) {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = SledBackend::open(temp_dir.path().join("pastes.sled")).unwrap();
        (temp_dir, backend)
    }

    #[test]
    fn test_header_roundtrip() {
        let raw = encode(1_700_000_000_000, b"payload");
        assert_eq!(raw.len(), HEADER_LEN + 7);
        assert_eq!(decode_deadline(&raw).unwrap(), 1_700_000_000_000);
        assert_eq!(&raw[HEADER_LEN..], b"payload");
    }

    #[test]
    fn test_short_entry_is_corrupt() {
        assert!(matches!(decode_deadline(b"abc"), Err(Error::Backend(_))));
    }

    #[tokio::test]
    async fn test_sled_backend_set_get_delete() {
        let (_dir, backend) = open_temp();

        backend
            .set_with_ttl("key", Bytes::from_static(b"value"), TtlSecs(60))
            .await
            .unwrap();

        assert_eq!(
            backend.get("key").await.unwrap(),
            Some(Bytes::from_static(b"value"))
        );
        assert!(backend.exists("key").await.unwrap());
        assert!(backend.ttl("key").await.unwrap().remaining_secs().unwrap() <= 60);

        assert!(backend.delete("key").await.unwrap());
        assert!(!backend.delete("key").await.unwrap());
        assert_eq!(backend.get("key").await.unwrap(), None);
        assert_eq!(backend.ttl("key").await.unwrap(), KeyTtl::Missing);
    }

    #[tokio::test]
    async fn test_sled_backend_expired_entry_is_lazily_evicted() {
        let (_dir, backend) = open_temp();

        backend
            .db
            .insert("old", encode(now_ms() - 1_000, b"stale"))
            .unwrap();

        assert_eq!(backend.ttl("old").await.unwrap(), KeyTtl::Expired);
        assert_eq!(backend.get("old").await.unwrap(), None);
        assert!(backend.db.get("old").unwrap().is_none());
        assert_eq!(backend.ttl("old").await.unwrap(), KeyTtl::Missing);
    }

    #[tokio::test]
    async fn test_sled_backend_delete_reclaims_expired_entry() {
        let (_dir, backend) = open_temp();

        backend
            .db
            .insert("old", encode(now_ms() - 1_000, b"stale"))
            .unwrap();

        assert!(backend.delete("old").await.unwrap());
        assert!(!backend.delete("old").await.unwrap());
    }

    #[tokio::test]
    async fn test_sled_backend_scan_reports_expired() {
        let (_dir, backend) = open_temp();

        backend
            .set_with_ttl("live", Bytes::from_static(b"a"), TtlSecs(60))
            .await
            .unwrap();
        backend
            .db
            .insert("dead", encode(now_ms() - 1_000, b"b"))
            .unwrap();

        let entries = backend.scan().await.unwrap();
        assert_eq!(entries.len(), 2);

        let dead = entries.iter().find(|e| e.key == "dead").unwrap();
        assert_eq!(dead.ttl, KeyTtl::Expired);
        let live = entries.iter().find(|e| e.key == "live").unwrap();
        assert!(!live.ttl.is_expired());
    }

    #[tokio::test]
    async fn test_sled_backend_survives_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("pastes.sled");

        {
            let backend = SledBackend::open(&path).unwrap();
            backend
                .set_with_ttl("key", Bytes::from_static(b"value"), TtlSecs(60))
                .await
                .unwrap();
            backend.close().await.unwrap();
        }

        let reopened = SledBackend::open(&path).unwrap();
        assert_eq!(
            reopened.get("key").await.unwrap(),
            Some(Bytes::from_static(b"value"))
        );
    }
}
