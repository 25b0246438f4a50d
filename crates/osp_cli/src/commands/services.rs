use anyhow::Result;
use clap::Args;
use osp_service::OspService;

#[derive(Debug, Args)]
pub struct ServicesArgs {}

pub async fn execute(service: &OspService, _args: ServicesArgs) -> Result<()> {
    let catalog = service.list_services().await?;
    if catalog.is_empty() {
        println!("(catalog is empty, run `osp_forge seed`)");
        return Ok(());
    }

    for entry in catalog {
        println!("{}  {}  fee={}", entry.id, entry.name, entry.fee);
        for doc in &entry.required_documents {
            println!("    - {}", doc);
        }
    }
    Ok(())
}
