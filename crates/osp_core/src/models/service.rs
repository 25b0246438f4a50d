use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Catalog entry: something an applicant can book.
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: Uuid,

    // Unique across the catalog
    pub name: String,

    pub description: String,

    /// Ordered, free-text document labels. Staff match uploads against these
    /// by eye; nothing in the system interprets them.
    pub required_documents: Vec<String>,

    /// Fee in whole currency units, never negative.
    pub fee: i64,

    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Staff-supplied fields for creating or replacing a catalog entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDraft {
    pub name: String,

    #[serde(default)]
    pub description: String,

    // Older clients still send "price"
    #[serde(default, alias = "price")]
    pub fee: i64,

    #[serde(default)]
    pub required_documents: Vec<String>,
}

impl ServiceDraft {
    pub fn new(name: &str, description: &str, fee: i64, required_documents: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            fee,
            required_documents: required_documents.iter().map(|d| d.to_string()).collect(),
        }
    }

    /// Builds a brand new catalog entry.
    pub fn into_service(self) -> Service {
        let now = OffsetDateTime::now_utc();
        Service {
            id: Uuid::now_v7(),
            name: self.name.trim().to_string(),
            description: self.description,
            required_documents: self.required_documents,
            fee: self.fee,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the editable fields of `existing`, keeping its identity.
    pub fn apply_to(self, existing: &Service) -> Service {
        Service {
            id: existing.id,
            created_at: existing.created_at,
            updated_at: OffsetDateTime::now_utc(),
            ..self.into_service()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_accepts_legacy_price_field() {
        let draft: ServiceDraft = serde_json::from_str(
            r#"{"name":"Income Certificate","price":149,"requiredDocuments":["Aadhaar Card"]}"#,
        )
        .unwrap();
        assert_eq!(draft.fee, 149);
        assert_eq!(draft.description, "");
        assert_eq!(draft.required_documents, vec!["Aadhaar Card"]);
    }

    #[test]
    fn apply_to_keeps_identity() {
        let original = ServiceDraft::new("PAN Card", "", 299, &["Aadhaar"]).into_service();
        let updated = ServiceDraft::new("  PAN Card Reprint ", "", 99, &[]).apply_to(&original);

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.name, "PAN Card Reprint");
        assert_eq!(updated.fee, 99);
        assert!(updated.required_documents.is_empty());
    }
}
