use osp_core::{Error, Result};
use rust_embed::RustEmbed;
use sqlx::{Executor, PgPool};
use std::str;

#[derive(RustEmbed)]
#[folder = "schema/"]
struct SchemaAssets;

const BUILD_ORDER: &str = "00_build_order.sql";

/// Reads the build order and applies all SQL files in a single transaction.
pub async fn rebuild_database(pool: &PgPool) -> Result<()> {
    let full_script = assemble_script()?;

    let mut tx = pool.begin().await.map_err(|e| Error::Database(e.to_string()))?;
    (&mut *tx)
        .execute(full_script.as_str())
        .await
        .map_err(|e| Error::Database(e.to_string()))?;
    tx.commit().await.map_err(|e| Error::Database(e.to_string()))?;

    Ok(())
}

/// Drops every table the portal owns. Used by `rebuild --reset`.
pub async fn drop_database(pool: &PgPool) -> Result<()> {
    pool.execute("DROP TABLE IF EXISTS request_documents, requests, services CASCADE;")
        .await
        .map_err(|e| Error::Database(e.to_string()))?;
    Ok(())
}

/// Expands `-- @include` directives from the build order into one script.
pub fn assemble_script() -> Result<String> {
    let manifest = get_file_content(BUILD_ORDER)?;
    let mut full_script = String::new();

    for line in manifest.lines() {
        let trimmed = line.trim();

        // Parse: -- @include folder/file.sql
        if let Some(path) = parse_include_directive(trimmed) {
            tracing::info!(asset = path, "including schema asset");
            let content = get_file_content(path)?;
            full_script.push_str(&content);
            full_script.push('\n');
        } else if !trimmed.starts_with("--") {
            // Keep normal lines (if any), ignore comments
            full_script.push_str(line);
            full_script.push('\n');
        }
    }

    Ok(full_script)
}

fn get_file_content(path: &str) -> Result<String> {
    let file = SchemaAssets::get(path)
        .ok_or_else(|| Error::Database(format!("missing schema asset: {}", path)))?;
    str::from_utf8(file.data.as_ref())
        .map(str::to_string)
        .map_err(|e| Error::Database(format!("schema asset {} is not UTF-8: {}", path, e)))
}

fn parse_include_directive(line: &str) -> Option<&str> {
    if line.starts_with("--") && line.contains("@include") {
        line.split_whitespace().last()
    } else {
        None
    }
}
