use anyhow::Result;
use clap::Args;
use osp_db::schema::{drop_database, rebuild_database};
use sqlx::PgPool;

#[derive(Debug, Args)]
pub struct RebuildArgs {
    /// DANGER: drop the portal's tables (and every request in them) first
    #[arg(long)]
    pub reset: bool,
}

pub async fn execute(pool: PgPool, args: RebuildArgs) -> Result<()> {
    println!("🏗️  Rebuilding database schema...");

    if args.reset {
        println!("🔥 Reset requested. Dropping portal tables...");
        drop_database(&pool).await?;
    }

    rebuild_database(&pool).await?;

    println!("✅ Database schema applied.");
    Ok(())
}
