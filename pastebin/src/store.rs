use crate::domain::{Paste, StoredPaste};
use crate::ports::{KeyTtl, KeyValueBackend};
use bytes::Bytes;
use shared::{Error, Result, TtlSecs, ValidationError};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{error, info, warn};

/// TTL-scoped persistence for paste bodies over a key-value backend.
///
/// One backend key per live paste, key == id. The value is the JSON encoding
/// of [`StoredPaste`]; the lifetime is carried only by the backend's per-key
/// expiration, and is read back live on every [`PasteStore::get`].
///
/// The handle is cheap to clone and is shared between the service and the
/// expiry sweeper.
#[derive(Clone)]
pub struct PasteStore {
    backend: Arc<dyn KeyValueBackend>,
}

impl PasteStore {
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self { backend }
    }

    /// Write `id -> content` expiring after `ttl`. Silently overwrites an
    /// existing key.
    pub async fn put(&self, id: &str, content: &str, ttl: TtlSecs) -> Result<()> {
        if id.is_empty() {
            return Err(ValidationError::MissingId.into());
        }
        if ttl.0 == 0 {
            return Err(ValidationError::NonPositiveLifetime(0).into());
        }

        let stored = StoredPaste {
            id: id.to_string(),
            content: content.to_string(),
        };
        let value = Bytes::from(serde_json::to_vec(&stored)?);

        self.backend
            .set_with_ttl(id, value, ttl)
            .await
            .inspect_err(|e| error!("Failed to save paste {}: {}", id, e))
    }

    /// Read a paste and its live remaining lifetime. `Ok(None)` when the key is
    /// absent or has expired; errors are reserved for backend failures.
    pub async fn get(&self, id: &str) -> Result<Option<Paste>> {
        let Some(raw) = self
            .backend
            .get(id)
            .await
            .inspect_err(|e| error!("Failed to retrieve paste {}: {}", id, e))?
        else {
            info!("Paste not found: {}", id);
            return Ok(None);
        };

        let stored: StoredPaste = serde_json::from_slice(&raw).map_err(|e| {
            error!("Failed to decode paste {}: {}", id, e);
            Error::from(e)
        })?;
        if stored.id != id {
            warn!("Paste {} holds a record for id {}", id, stored.id);
        }

        let ttl = self
            .backend
            .ttl(id)
            .await
            .inspect_err(|e| error!("Failed to get TTL for paste {}: {}", id, e))?;

        match ttl {
            // Expired between the value read and the TTL query.
            KeyTtl::Missing | KeyTtl::Expired => Ok(None),
            KeyTtl::Persistent => Err(Error::Backend(format!(
                "paste {} is stored without an expiration",
                id
            ))),
            KeyTtl::Expires(_) => Ok(ttl
                .remaining_secs()
                .map(|secs| Paste::new(id, stored.content, secs))),
        }
    }

    /// Remove a paste. Deleting an absent or expired id is a successful no-op;
    /// the returned flag says whether the backend still held an entry for it.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        self.backend
            .delete(id)
            .await
            .inspect_err(|e| error!("Failed to delete paste {}: {}", id, e))
    }

    pub async fn exists(&self, id: &str) -> Result<bool> {
        self.backend
            .exists(id)
            .await
            .inspect_err(|e| error!("Failed to check paste {}: {}", id, e))
    }

    /// Enumerate stored ids with their expiry state.
    pub async fn list(&self) -> Result<Vec<(String, KeyTtl)>> {
        let entries = self.backend.scan().await?;
        Ok(entries.into_iter().map(|e| (e.key, e.ttl)).collect())
    }

    pub async fn ping(&self) -> Result<()> {
        self.backend.ping().await
    }

    pub async fn close(&self) -> Result<()> {
        self.backend.close().await
    }
}

impl Debug for PasteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasteStore")
            .field("backend", &"<dyn KeyValueBackend>")
            .finish()
    }
}
