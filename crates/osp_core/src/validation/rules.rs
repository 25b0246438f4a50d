use std::sync::LazyLock;

use regex::Regex;

use crate::models::intake::IntakeForm;
use crate::models::service::{Service, ServiceDraft};
use crate::validation::{ValidationError, ValidationRule};

static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("phone pattern compiles"));

// local@domain.tld, nothing fancier
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Exactly ten ASCII digits, no spaces, dashes or country code.
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE.is_match(phone)
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

// =========================================================================
// RULE: OSP-001
// "Full name is required"
// =========================================================================
pub struct FullNameRule;

impl ValidationRule<IntakeForm> for FullNameRule {
    fn rule_id(&self) -> &'static str { "OSP-001" }

    fn check(&self, form: &IntakeForm) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if form.full_name.trim().is_empty() {
            errors.push(ValidationError::new(
                self.rule_id(),
                "fullName",
                "full name is required",
            ));
        }
        errors
    }
}

// =========================================================================
// RULE: OSP-002
// "Phone must be exactly 10 digits"
// =========================================================================
pub struct PhoneRule;

impl ValidationRule<IntakeForm> for PhoneRule {
    fn rule_id(&self) -> &'static str { "OSP-002" }

    fn check(&self, form: &IntakeForm) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if !is_valid_phone(&form.phone) {
            errors.push(ValidationError::new(
                self.rule_id(),
                "phone",
                format!("phone '{}' must be exactly 10 digits", form.phone),
            ));
        }
        errors
    }
}

// =========================================================================
// RULE: OSP-003
// "Email, when given, must look like local@domain"
// =========================================================================
pub struct EmailRule;

impl ValidationRule<IntakeForm> for EmailRule {
    fn rule_id(&self) -> &'static str { "OSP-003" }

    fn check(&self, form: &IntakeForm) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if let Some(email) = form.email() {
            if !is_valid_email(email) {
                errors.push(ValidationError::new(
                    self.rule_id(),
                    "email",
                    format!("'{}' is not a valid email address", email),
                ));
            }
        }
        errors
    }
}

// =========================================================================
// RULE: OSP-004
// "Payment reference (UTR) is required"
// =========================================================================
pub struct PaymentReferenceRule;

impl ValidationRule<IntakeForm> for PaymentReferenceRule {
    fn rule_id(&self) -> &'static str { "OSP-004" }

    fn check(&self, form: &IntakeForm) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if form.utr.trim().is_empty() {
            errors.push(ValidationError::new(
                self.rule_id(),
                "utr",
                "payment reference (UTR) is required",
            ));
        }
        errors
    }
}

// =========================================================================
// RULE: OSP-006
// "At least one document when the service lists required documents"
//
// Only presence is enforced. Labels are not matched against files; staff
// do that during review.
// =========================================================================
pub fn check_document_sufficiency(service: &Service, supplied: usize) -> Option<ValidationError> {
    if !service.required_documents.is_empty() && supplied == 0 {
        Some(ValidationError::new(
            "OSP-006",
            "documents",
            "please upload required documents",
        ))
    } else {
        None
    }
}

// =========================================================================
// RULE: OSP-101
// "Service name is required"
// =========================================================================
pub struct ServiceNameRule;

impl ValidationRule<ServiceDraft> for ServiceNameRule {
    fn rule_id(&self) -> &'static str { "OSP-101" }

    fn check(&self, draft: &ServiceDraft) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if draft.name.trim().is_empty() {
            errors.push(ValidationError::new(self.rule_id(), "name", "service name is required"));
        }
        errors
    }
}

// =========================================================================
// RULE: OSP-102
// "Fee cannot be negative"
// =========================================================================
pub struct FeeRule;

impl ValidationRule<ServiceDraft> for FeeRule {
    fn rule_id(&self) -> &'static str { "OSP-102" }

    fn check(&self, draft: &ServiceDraft) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if draft.fee < 0 {
            errors.push(ValidationError::new(
                self.rule_id(),
                "fee",
                format!("fee {} cannot be negative", draft.fee),
            ));
        }
        errors
    }
}
