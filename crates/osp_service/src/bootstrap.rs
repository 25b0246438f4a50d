use std::sync::Arc;

use anyhow::{Context, Result};
use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{config::Region, Client as S3Client};
use osp_db::schema::rebuild_database;
use osp_db::{MemoryStore, RequestRepository, ServiceRepository};
use sqlx::postgres::PgPoolOptions;

use crate::auth::JwtAuthGate;
use crate::blob::{MemoryBlobStore, S3BlobStore};
use crate::config::{Config, StorageBackend};
use crate::OspService;

/// Wires an [`OspService`] for the configured backend.
pub async fn build_service(config: &Config) -> Result<OspService> {
    let auth = Arc::new(JwtAuthGate::new(config.jwt_secret.as_bytes()));

    let service = match config.storage {
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set")?;
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await
                .context("failed to connect to Postgres")?;
            rebuild_database(&pool).await?;

            let blobs = S3BlobStore::new(
                s3_client(config).await,
                config.s3_bucket.clone(),
                &config.s3_endpoint,
            );
            blobs.ensure_bucket().await?;

            tracing::info!(bucket = %config.s3_bucket, "using postgres + s3 storage");
            OspService::new(
                Arc::new(ServiceRepository::new(pool.clone())),
                Arc::new(RequestRepository::new(pool)),
                Arc::new(blobs),
                auth,
            )
        }
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; nothing survives a restart");
            let store = Arc::new(MemoryStore::new());
            OspService::new(
                store.clone(),
                store,
                Arc::new(MemoryBlobStore::new()),
                auth,
            )
        }
    };

    Ok(service.with_document_policy(config.document_policy()))
}

/// Seeds the default catalog when `SEED_CATALOG` is set. Returns how many
/// services were inserted.
pub async fn seed_if_requested(service: &OspService, config: &Config) -> Result<usize> {
    if !config.seed_catalog {
        return Ok(0);
    }
    let inserted = service.seed_catalog().await?;
    tracing::info!(inserted, "default catalog seeded");
    Ok(inserted)
}

async fn s3_client(config: &Config) -> S3Client {
    let region_provider =
        RegionProviderChain::default_provider().or_else(Region::new(config.s3_region.clone()));
    let shared = aws_config::defaults(BehaviorVersion::latest())
        .region(region_provider)
        .load()
        .await;

    // Path-style addressing for MinIO and other self-hosted endpoints
    let s3_config = aws_sdk_s3::config::Builder::from(&shared)
        .force_path_style(true)
        .endpoint_url(&config.s3_endpoint)
        .build();

    S3Client::from_conf(s3_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config(seed_catalog: bool) -> Config {
        Config {
            storage: StorageBackend::Memory,
            database_url: None,
            s3_endpoint: String::new(),
            s3_bucket: String::new(),
            s3_region: String::new(),
            jwt_secret: "bootstrap-secret".to_string(),
            bind_addr: String::new(),
            client_origin: None,
            max_upload_files: 6,
            max_upload_bytes: 1024,
            submit_rate_limit: 60,
            submit_rate_window_secs: 900,
            trust_proxy: false,
            seed_catalog,
        }
    }

    #[tokio::test]
    async fn memory_backend_is_seeded_at_start_when_asked() {
        let config = memory_config(true);
        let service = build_service(&config).await.unwrap();

        assert_eq!(seed_if_requested(&service, &config).await.unwrap(), 4);
        assert_eq!(service.list_services().await.unwrap().len(), 4);
        assert_eq!(service.document_policy().max_file_bytes, 1024);
    }

    #[tokio::test]
    async fn seeding_is_off_by_default() {
        let config = memory_config(false);
        let service = build_service(&config).await.unwrap();

        assert_eq!(seed_if_requested(&service, &config).await.unwrap(), 0);
        assert!(service.list_services().await.unwrap().is_empty());
    }
}
