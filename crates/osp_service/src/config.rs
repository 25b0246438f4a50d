use std::env;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use dotenvy::dotenv;

use crate::documents::DocumentPolicy;

/// Where requests, services and documents are kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    /// Postgres for records, S3-compatible object storage for documents.
    Postgres,
    /// Process memory; everything is lost on exit.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => bail!("OSP_STORAGE must be 'postgres' or 'memory', got '{}'", other),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub storage: StorageBackend,
    /// Required only for the Postgres backend.
    pub database_url: Option<String>,
    pub s3_endpoint: String,
    pub s3_bucket: String,
    pub s3_region: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub client_origin: Option<String>,
    pub max_upload_files: usize,
    pub max_upload_bytes: usize,
    pub submit_rate_limit: u32,
    pub submit_rate_window_secs: u64,
    /// Key the submission limit on the first `X-Forwarded-For` hop instead
    /// of the peer address. Only safe behind a proxy that sets the header.
    pub trust_proxy: bool,
    /// Install the default catalog at server start.
    pub seed_catalog: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok(); // Load .env if present

        let storage: StorageBackend = env::var("OSP_STORAGE")
            .unwrap_or_else(|_| "postgres".to_string())
            .parse()?;

        let database_url = env::var("DATABASE_URL").ok();
        if storage == StorageBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL must be set when OSP_STORAGE=postgres");
        }

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        if jwt_secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }

        Ok(Config {
            storage,
            database_url,

            s3_endpoint: env::var("S3_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:9000".to_string()),

            s3_bucket: env::var("S3_BUCKET").unwrap_or_else(|_| "osp-documents".to_string()),

            s3_region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),

            jwt_secret,

            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:4000".to_string()),

            client_origin: env::var("CLIENT_ORIGIN").ok().filter(|o| !o.trim().is_empty()),

            max_upload_files: parse_var("MAX_UPLOAD_FILES", 6)?,
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", 5 * 1024 * 1024)?,
            submit_rate_limit: parse_var("SUBMIT_RATE_LIMIT", 60)?,
            submit_rate_window_secs: parse_var("SUBMIT_RATE_WINDOW_SECS", 15 * 60)?,
            trust_proxy: parse_var("TRUST_PROXY", false)?,
            seed_catalog: parse_var("SEED_CATALOG", false)?,
        })
    }

    pub fn document_policy(&self) -> DocumentPolicy {
        DocumentPolicy {
            max_files: self.max_upload_files,
            max_file_bytes: self.max_upload_bytes,
            ..DocumentPolicy::default()
        }
    }

    /// Largest multipart body a submission can legitimately produce, plus
    /// headroom for the text fields.
    pub fn upload_body_limit(&self) -> usize {
        self.max_upload_files
            .saturating_mul(self.max_upload_bytes)
            .saturating_add(64 * 1024)
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{} is not valid: {}", name, e)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_backend_parses_case_insensitively() {
        assert_eq!("Postgres".parse::<StorageBackend>().unwrap(), StorageBackend::Postgres);
        assert_eq!(" memory ".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert!("sqlite".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn body_limit_covers_every_allowed_file() {
        let config = Config {
            storage: StorageBackend::Memory,
            database_url: None,
            s3_endpoint: String::new(),
            s3_bucket: String::new(),
            s3_region: String::new(),
            jwt_secret: "secret".to_string(),
            bind_addr: String::new(),
            client_origin: None,
            max_upload_files: 6,
            max_upload_bytes: 100,
            submit_rate_limit: 60,
            submit_rate_window_secs: 900,
            trust_proxy: false,
            seed_catalog: false,
        };
        assert!(config.upload_body_limit() >= 600);
        assert_eq!(config.document_policy().max_files, 6);
        assert_eq!(config.document_policy().key_prefix, "osp-requests");
    }
}
