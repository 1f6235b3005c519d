use std::sync::Arc;
use tokio::sync::RwLock;

use crate::clients::tvmaze::TvMazeClient;
use crate::config::Config;
use crate::db::Store;
use crate::ingest::ShowSource;
use crate::services::{SeaOrmShowService, ShowService};

/// Build a shared HTTP client with reasonable defaults for API calls.
fn build_shared_http_client(
    timeout_seconds: u64,
    user_agent: &str,
) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent(user_agent)
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Arc<Store>,

    pub show_service: Arc<dyn ShowService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let http_client = build_shared_http_client(
            config.upstream.request_timeout_seconds.into(),
            &config.upstream.user_agent,
        )?;
        let source = Arc::new(TvMazeClient::with_shared_client(
            http_client,
            &config.upstream.api_url,
        )?) as Arc<dyn ShowSource>;

        Ok(Self::with_parts(config, Arc::new(store), source))
    }

    /// Wires the services around an existing store and show source.
    #[must_use]
    pub fn with_parts(config: Config, store: Arc<Store>, source: Arc<dyn ShowSource>) -> Self {
        let show_service = Arc::new(SeaOrmShowService::new(store.clone(), source))
            as Arc<dyn ShowService + Send + Sync + 'static>;

        Self {
            config: Arc::new(RwLock::new(config)),
            store,
            show_service,
        }
    }
}
