use anyhow::Result;
use clap::Args;
use osp_service::OspService;

#[derive(Debug, Args)]
pub struct SeedArgs {}

/// Installs the default catalog; names already present are left alone.
pub async fn execute(service: &OspService, _args: SeedArgs) -> Result<usize> {
    println!("🌱 Seeding service catalog...");

    let inserted = service.seed_catalog().await?;
    if inserted == 0 {
        println!("✅ Catalog already seeded.");
    } else {
        println!("✅ Inserted {} service(s).", inserted);
    }
    Ok(inserted)
}
