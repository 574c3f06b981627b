use crate::domain::PasteId;
use uuid::Uuid;

/// Generate a fresh paste identifier from 128 random bits (UUID v4, hyphenated).
pub fn generate_paste_id() -> PasteId {
    Uuid::new_v4().to_string()
}
