use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::document::Document;
use crate::error::Error;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Review state of a request. Staff may move between any of these freely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    #[default]
    Pending,
    Verified,
    #[serde(rename = "Documents Needed")]
    DocumentsNeeded,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Rejected,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 6] = [
        RequestStatus::Pending,
        RequestStatus::Verified,
        RequestStatus::DocumentsNeeded,
        RequestStatus::InProgress,
        RequestStatus::Completed,
        RequestStatus::Rejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Verified => "Verified",
            RequestStatus::DocumentsNeeded => "Documents Needed",
            RequestStatus::InProgress => "In Progress",
            RequestStatus::Completed => "Completed",
            RequestStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RequestStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                Error::invalid(
                    "OSP-201",
                    "status",
                    format!("'{}' is not a recognised status", s),
                )
            })
    }
}

// ---------------------------------------------------------------------------
// Applicant
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Applicant {
    pub full_name: String,

    // Exactly 10 digits, no formatting
    pub phone: String,

    pub email: Option<String>,
    pub address: Option<String>,
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Internal identity, used by staff operations.
    pub id: Uuid,

    /// Public identifier disclosed to the applicant ("REQ-XXXXXXXXXX").
    pub request_id: String,

    pub service_id: Uuid,

    pub applicant: Applicant,

    /// Applicant-claimed payment transaction reference. Unique, never verified.
    pub utr: String,

    pub notes: Option<String>,

    pub documents: Vec<Document>,

    pub status: RequestStatus,

    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Request {
    /// A fresh `Pending` request. `request_id` is left empty; it is allocated
    /// at insert time so a collision can be retried with a new value.
    pub fn pending(
        service_id: Uuid,
        applicant: Applicant,
        utr: String,
        notes: Option<String>,
        documents: Vec<Document>,
    ) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::now_v7(),
            request_id: String::new(),
            service_id,
            applicant,
            utr,
            notes,
            documents,
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_display_names() {
        for status in RequestStatus::ALL {
            assert_eq!(status.as_str().parse::<RequestStatus>().unwrap(), status);
        }
    }

    #[test]
    fn status_serializes_with_spaces() {
        let json = serde_json::to_string(&RequestStatus::DocumentsNeeded).unwrap();
        assert_eq!(json, "\"Documents Needed\"");
    }

    #[test]
    fn unknown_status_is_a_validation_error() {
        let err = "Archived".parse::<RequestStatus>().unwrap_err();
        match err {
            Error::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "status");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        // Case matters: the enumeration is exact.
        assert!("pending".parse::<RequestStatus>().is_err());
    }

    #[test]
    fn new_requests_start_pending() {
        let request = Request::pending(
            Uuid::now_v7(),
            Applicant {
                full_name: "A B".into(),
                phone: "9876543210".into(),
                email: None,
                address: None,
            },
            "UTR1".into(),
            None,
            vec![],
        );
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.created_at, request.updated_at);
    }
}
