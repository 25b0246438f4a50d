use serde::Serialize;

use crate::error::{Error, Result};

pub mod rules;

// The structure of a failure
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub code: String,    // e.g., "OSP-002"
    pub field: String,   // wire name of the offending input, e.g. "phone"
    pub message: String, // "phone must be exactly 10 digits"
}

impl ValidationError {
    pub fn new(code: &str, field: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            field: field.to_string(),
            message: message.into(),
        }
    }
}

// The contract every rule must fulfill
pub trait ValidationRule<T: ?Sized> {
    fn check(&self, subject: &T) -> Vec<ValidationError>;
    fn rule_id(&self) -> &'static str;
}

// The Engine that holds the registry of all rules for one kind of subject.
// Every rule runs; failures are collected rather than short-circuited.
pub struct ValidationEngine<T: ?Sized> {
    rules: Vec<Box<dyn ValidationRule<T> + Send + Sync>>,
}

impl<T: ?Sized> ValidationEngine<T> {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn add_rule<R: ValidationRule<T> + Send + Sync + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn run(&self, subject: &T) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for rule in &self.rules {
            let mut rule_errors = rule.check(subject);
            errors.append(&mut rule_errors);
        }
        errors
    }

    /// Runs every rule and folds the outcome into a `Result`.
    pub fn validate(&self, subject: &T) -> Result<()> {
        ensure_valid(self.run(subject))
    }
}

impl<T: ?Sized> Default for ValidationEngine<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub fn ensure_valid(errors: Vec<ValidationError>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(errors))
    }
}
