use crate::domain::Paste;
use crate::domain::response::DeleteResponse;
use crate::id::generate_paste_id;
use crate::store::PasteStore;
use crate::validation::PasteRequestValidator;
use shared::Result;
use tracing::{info, warn};

/// Application service that orchestrates paste operations
/// This is the only place identifiers are generated and input rules enforced
#[derive(Clone, Debug)]
pub struct PasteService {
    store: PasteStore,
}

impl PasteService {
    pub fn new(store: PasteStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &PasteStore {
        &self.store
    }

    /// Create a paste under a fresh identifier.
    ///
    /// After the write the paste is read back so the response carries the
    /// backend-reported remaining lifetime. That read is best effort: if it
    /// fails or misses, the create still succeeds and `lifetime_seconds` is
    /// reported as 0 (unknown).
    pub async fn create_paste(&self, content: String, lifetime_seconds: i64) -> Result<Paste> {
        let ttl = PasteRequestValidator::validate_create(&content, lifetime_seconds)?;
        let id = generate_paste_id();

        info!("Creating paste {} with lifetime {}s", id, ttl.0);
        self.store.put(&id, &content, ttl).await?;

        match self.store.get(&id).await {
            Ok(Some(paste)) => {
                info!("Paste {} saved and verified", id);
                Ok(paste)
            }
            Ok(None) => {
                warn!("Paste {} was not readable right after saving", id);
                Ok(Paste::new(id, content, 0))
            }
            Err(e) => {
                warn!("Failed to verify paste {} was saved: {}", id, e);
                Ok(Paste::new(id, content, 0))
            }
        }
    }

    /// `Ok(None)` when the paste is absent or expired.
    pub async fn get_paste(&self, id: &str) -> Result<Option<Paste>> {
        let id = PasteRequestValidator::validate_id(id)?;
        let paste = self.store.get(id).await?;
        if paste.is_some() {
            info!("Paste {} retrieved", id);
        }
        Ok(paste)
    }

    /// Delete a paste, reporting whether there was anything to delete.
    pub async fn delete_paste(&self, id: &str) -> Result<DeleteResponse> {
        let id = PasteRequestValidator::validate_id(id)?;

        if !self.store.exists(id).await? {
            info!("Paste {} not found for deletion", id);
            return Ok(DeleteResponse::new(false));
        }

        self.store.delete(id).await?;
        info!("Paste {} deleted", id);
        Ok(DeleteResponse::new(true))
    }
}
