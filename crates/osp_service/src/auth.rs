use std::time::Duration;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use osp_core::models::staff::StaffSubject;
use osp_core::{Error, Result};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Verifies a staff credential before a privileged operation runs.
pub trait StaffAuthGate: Send + Sync {
    /// `credential` is the raw `Authorization` header value (or a bare token).
    fn authorize(&self, credential: Option<&str>) -> Result<StaffSubject>;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StaffClaims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 bearer tokens signed with the deployment secret.
///
/// Issuance lives here too so operators can mint tokens from the CLI; login
/// and password storage belong to the external credential issuer.
#[derive(Clone)]
pub struct JwtAuthGate {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtAuthGate {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn issue(&self, subject: &StaffSubject, ttl: Duration) -> Result<String> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = StaffClaims {
            sub: subject.subject.clone(),
            email: subject.email.clone(),
            iat: now,
            exp: now.saturating_add(ttl),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| Error::Internal(format!("failed to sign staff token: {}", e)))
    }
}

impl StaffAuthGate for JwtAuthGate {
    fn authorize(&self, credential: Option<&str>) -> Result<StaffSubject> {
        let Some(token) = credential.map(bearer_token).filter(|t| !t.is_empty()) else {
            return Err(Error::Unauthorized);
        };

        let data = decode::<StaffClaims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "rejected staff credential");
            Error::Unauthorized
        })?;

        Ok(StaffSubject {
            subject: data.claims.sub,
            email: data.claims.email,
        })
    }
}

fn bearer_token(credential: &str) -> &str {
    let credential = credential.trim();
    credential
        .strip_prefix("Bearer ")
        .unwrap_or(credential)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff() -> StaffSubject {
        StaffSubject {
            subject: "admin-1".to_string(),
            email: Some("admin@osp.local".to_string()),
        }
    }

    #[test]
    fn issued_token_authorizes_with_or_without_bearer_prefix() {
        let gate = JwtAuthGate::new(b"test-secret");
        let token = gate.issue(&staff(), Duration::from_secs(3600)).unwrap();

        assert_eq!(gate.authorize(Some(&token)).unwrap(), staff());
        assert_eq!(gate.authorize(Some(&format!("Bearer {}", token))).unwrap(), staff());
    }

    #[test]
    fn missing_or_blank_credentials_are_rejected() {
        let gate = JwtAuthGate::new(b"test-secret");
        assert!(matches!(gate.authorize(None), Err(Error::Unauthorized)));
        assert!(matches!(gate.authorize(Some("")), Err(Error::Unauthorized)));
        assert!(matches!(gate.authorize(Some("Bearer ")), Err(Error::Unauthorized)));
        assert!(matches!(gate.authorize(Some("garbage")), Err(Error::Unauthorized)));
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let token = JwtAuthGate::new(b"other-secret")
            .issue(&staff(), Duration::from_secs(3600))
            .unwrap();
        let gate = JwtAuthGate::new(b"test-secret");
        assert!(matches!(gate.authorize(Some(&token)), Err(Error::Unauthorized)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let gate = JwtAuthGate::new(b"test-secret");
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = StaffClaims {
            sub: "admin-1".to_string(),
            email: None,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(matches!(gate.authorize(Some(&token)), Err(Error::Unauthorized)));
    }
}
