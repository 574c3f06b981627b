use serde::{Deserialize, Serialize};

/// Opaque paste identifier. Also the backend key.
pub type PasteId = String;

/// A paste as seen by callers. `lifetime_seconds` is the remaining lifetime
/// reported by the backend at read time, never a stored field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paste {
    pub id: PasteId,
    pub content: String,
    pub lifetime_seconds: i64,
}

impl Paste {
    pub fn new(id: impl Into<PasteId>, content: impl Into<String>, lifetime_seconds: i64) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            lifetime_seconds,
        }
    }
}

/// Value persisted under the paste key. The lifetime lives in the backend's
/// per-key expiration only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPaste {
    pub id: PasteId,
    pub content: String,
}

pub mod response {
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct DeleteResponse {
        /// False when there was nothing to delete.
        pub deleted: bool,
    }

    impl DeleteResponse {
        pub fn new(deleted: bool) -> Self {
            Self { deleted }
        }
    }
}
