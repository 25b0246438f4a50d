use rand::distributions::Alphanumeric;
use rand::Rng;

pub const REQUEST_ID_PREFIX: &str = "REQ-";
pub const REQUEST_ID_SUFFIX_LEN: usize = 10;

/// Source of public request identifiers.
///
/// Implementations need not remember what they handed out: the request store
/// rejects duplicates and the intake pipeline asks for another one.
pub trait RequestIdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// `REQ-` followed by ten random upper-case alphanumerics.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomRequestIds;

impl RequestIdGenerator for RandomRequestIds {
    fn generate(&self) -> String {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(REQUEST_ID_SUFFIX_LEN)
            .map(|b| char::from(b).to_ascii_uppercase())
            .collect();
        format!("{}{}", REQUEST_ID_PREFIX, suffix)
    }
}

/// Canonical form of a user-typed identifier.
pub fn normalize(request_id: &str) -> String {
    request_id.trim().to_ascii_uppercase()
}

pub fn is_well_formed(request_id: &str) -> bool {
    request_id
        .strip_prefix(REQUEST_ID_PREFIX)
        .map(|suffix| {
            suffix.len() == REQUEST_ID_SUFFIX_LEN
                && suffix
                    .bytes()
                    .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase())
        })
        .unwrap_or(false)
}
