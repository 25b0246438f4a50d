use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// A stored attachment. The blob itself lives in the external store; the
// request keeps these four fields verbatim.
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Stable retrieval URL returned by the blob store.
    pub url: String,

    /// Filename as uploaded by the applicant.
    pub original_name: String,

    /// Declared MIME type ("application/pdf", "image/jpeg", "image/png").
    pub mime_type: String,

    /// Size in bytes.
    pub size: u64,
}
