use serde::{Deserialize, Serialize};

/// The staff member behind a verified bearer credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffSubject {
    pub subject: String,
    pub email: Option<String>,
}
