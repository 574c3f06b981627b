pub mod moka_backend;
pub mod sled_backend;

use pastebin::ports::{KeyValueBackend, StorageFactory};
use shared::Result;
use shared::config::{BackendKind, Config};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub use moka_backend::MokaBackend;
pub use sled_backend::SledBackend;

const SLED_FILE: &str = "pastes.sled";

/// Builds the backend named by `Config::backend`
pub struct UnifiedStorageFactory;

impl StorageFactory for UnifiedStorageFactory {
    fn create_from_config(&self, config: &Config) -> Result<Arc<dyn KeyValueBackend>> {
        match config.backend {
            BackendKind::Memory => {
                info!(
                    "Using in-memory backend (max entries: {:?})",
                    config.max_entries
                );
                Ok(Arc::new(MokaBackend::new("pastes", config.max_entries)))
            }
            BackendKind::Sled => {
                let path = Path::new(&config.data_dir).join(SLED_FILE);
                info!("Using sled backend at {}", path.display());
                Ok(Arc::new(SledBackend::open(path)?))
            }
        }
    }
}
