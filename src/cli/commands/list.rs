//! List shows command handler

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_list_shows(config: &Config) -> anyhow::Result<()> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;
    let shows = store.list_shows().await?;

    if shows.is_empty() {
        println!("No shows stored.");
        println!();
        println!("Pull the catalog with: showsync ingest");
        return Ok(());
    }

    println!("Shows ({} total)", shows.len());
    println!("{:-<70}", "");

    for show in shows {
        let network = show
            .network
            .as_ref()
            .map_or_else(|| "-".to_string(), |n| n.name.clone());
        let rating = show
            .rating
            .as_ref()
            .and_then(|r| r.average)
            .map_or_else(|| "-".to_string(), |avg| format!("{avg:.1}"));
        let genres: Vec<&str> = show.genres.iter().map(|g| g.name.as_str()).collect();

        println!("{} [{}]", show.name, show.id);
        println!(
            "  Network: {} | Language: {} | Rating: {}",
            network,
            show.language.as_deref().unwrap_or("-"),
            rating
        );
        if !genres.is_empty() {
            println!("  Genres: {}", genres.join(", "));
        }
    }

    Ok(())
}
