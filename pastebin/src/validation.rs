use shared::{TtlSecs, ValidationError};

/// Input rules shared by every caller binding (HTTP, CLI, ...).
pub struct PasteRequestValidator;

impl PasteRequestValidator {
    /// Validate a create request and return the backend TTL it maps to.
    /// Content is checked first, so an empty body with a bad lifetime reports
    /// the empty content.
    pub fn validate_create(content: &str, lifetime_seconds: i64) -> Result<TtlSecs, ValidationError> {
        if content.is_empty() {
            return Err(ValidationError::EmptyContent);
        }
        TtlSecs::try_from(lifetime_seconds)
    }

    /// Ids are opaque: a blank id is rejected, anything else passes unchanged.
    pub fn validate_id(id: &str) -> Result<&str, ValidationError> {
        if id.trim().is_empty() {
            return Err(ValidationError::MissingId);
        }
        Ok(id)
    }
}
