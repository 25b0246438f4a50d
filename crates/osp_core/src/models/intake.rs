use serde::Deserialize;

/// Raw applicant input for a new request, exactly as submitted.
///
/// Nothing here is trusted: the intake rules check every field before a
/// [`Request`](super::request::Request) is built from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeForm {
    pub service_id: String,
    pub full_name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub utr: String,
}

impl IntakeForm {
    /// Email with blanks treated as "not provided".
    pub fn email(&self) -> Option<&str> {
        non_blank(self.email.as_deref())
    }

    pub fn address(&self) -> Option<&str> {
        non_blank(self.address.as_deref())
    }

    pub fn notes(&self) -> Option<&str> {
        non_blank(self.notes.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_optionals_read_as_absent() {
        let form = IntakeForm {
            email: Some("  ".to_string()),
            address: Some("".to_string()),
            notes: Some(" call after 5pm ".to_string()),
            ..IntakeForm::default()
        };
        assert_eq!(form.email(), None);
        assert_eq!(form.address(), None);
        assert_eq!(form.notes(), Some("call after 5pm"));
    }
}
