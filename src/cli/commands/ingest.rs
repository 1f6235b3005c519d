//! One-shot ingestion command handler

use crate::config::Config;
use crate::services::ShowService;
use crate::state::SharedState;

pub async fn cmd_ingest(config: Config) -> anyhow::Result<()> {
    let source_url = config.upstream.api_url.clone();
    let state = SharedState::new(config).await?;

    println!("Fetching shows from {source_url}...");
    let report = state.show_service.run_ingestion().await?;

    println!(
        "Done: {} fetched, {} created, {} already stored",
        report.fetched, report.created, report.skipped
    );
    Ok(())
}
