pub mod error;
pub mod models;
pub mod request_id;
pub mod validation;

pub use error::{ConflictKind, Error, Result};

use models::{intake::IntakeForm, service::ServiceDraft};
use validation::{rules, ValidationEngine};

/// Field rules applied to every public submission, in reporting order.
pub fn intake_validator() -> ValidationEngine<IntakeForm> {
    ValidationEngine::new()
        .add_rule(rules::FullNameRule)
        .add_rule(rules::PhoneRule)
        .add_rule(rules::EmailRule)
        .add_rule(rules::PaymentReferenceRule)
}

/// Rules applied when staff create or replace a catalog entry.
pub fn service_validator() -> ValidationEngine<ServiceDraft> {
    ValidationEngine::new()
        .add_rule(rules::ServiceNameRule)
        .add_rule(rules::FeeRule)
}
