use crate::entities::{countries, genres, networks};
use crate::ingest::{CatalogGateway, CatalogLookup, UnitOfWork};
use crate::models::show::Show;
use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:").trim_start_matches("//");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn show_repo(&self) -> repositories::show::ShowRepository {
        repositories::show::ShowRepository::new(self.conn.clone())
    }

    fn catalog_repo(&self) -> repositories::catalog::CatalogRepository {
        repositories::catalog::CatalogRepository::new(self.conn.clone())
    }

    pub async fn get_show(&self, id: i32) -> Result<Option<Show>> {
        self.show_repo().get(id).await
    }

    pub async fn list_shows(&self) -> Result<Vec<Show>> {
        self.show_repo().list().await
    }

    pub async fn count_shows(&self) -> Result<u64> {
        self.show_repo().count().await
    }

    pub async fn remove_show(&self, id: i32) -> Result<bool> {
        self.show_repo().remove(id).await
    }

    pub async fn list_genres(&self) -> Result<Vec<genres::Model>> {
        Ok(self.catalog_repo().list_genres().await?)
    }

    pub async fn list_networks(&self) -> Result<Vec<networks::Model>> {
        Ok(self.catalog_repo().list_networks().await?)
    }

    pub async fn list_countries(&self) -> Result<Vec<countries::Model>> {
        Ok(self.catalog_repo().list_countries().await?)
    }
}

#[async_trait::async_trait]
impl CatalogLookup for Store {
    async fn show_exists(&self, id: i32) -> Result<bool, DbErr> {
        self.show_repo().exists(id).await
    }

    async fn find_network(&self, id: i32) -> Result<Option<networks::Model>, DbErr> {
        self.catalog_repo().find_network(id).await
    }

    async fn find_country(&self, code: &str) -> Result<Option<countries::Model>, DbErr> {
        self.catalog_repo().find_country(code).await
    }

    async fn find_genre(&self, name: &str) -> Result<Option<genres::Model>, DbErr> {
        self.catalog_repo().find_genre(name).await
    }
}

/// Commits run in a single SQLite transaction, so a failed commit leaves no
/// partial batch behind.
#[async_trait::async_trait]
impl CatalogGateway for Store {
    async fn commit(&self, work: UnitOfWork) -> Result<usize, DbErr> {
        work.commit(&self.conn).await
    }
}
