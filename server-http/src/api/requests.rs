use serde::Deserialize;

/// Body of `POST /api/paste`. A missing `content` deserializes as empty and is
/// rejected by validation, not by the JSON extractor.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePasteRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub lifetime_seconds: Option<i64>,
}
