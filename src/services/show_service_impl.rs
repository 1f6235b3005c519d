//! `SeaORM` implementation of the `ShowService` trait.

use crate::db::Store;
use crate::domain::ShowId;
use crate::ingest::normalizer::from_input;
use crate::ingest::{
    CatalogGateway, IngestReport, Reconciler, ResolveMode, ShowSource, UnitOfWork,
};
use crate::models::show::{Show, ShowInput};
use crate::services::show_service::{ShowError, ShowService};
use std::sync::Arc;
use tracing::info;

pub struct SeaOrmShowService {
    store: Arc<Store>,
    source: Arc<dyn ShowSource>,
}

impl SeaOrmShowService {
    #[must_use]
    pub fn new(store: Arc<Store>, source: Arc<dyn ShowSource>) -> Self {
        Self { store, source }
    }

    async fn ensure_exists(&self, id: ShowId) -> Result<(), ShowError> {
        let reconciler = Reconciler::new(self.store.as_ref(), ResolveMode::ReuseExisting);
        if reconciler.show_exists(id.value()).await? {
            Ok(())
        } else {
            Err(ShowError::NotFound(id))
        }
    }
}

#[async_trait::async_trait]
impl ShowService for SeaOrmShowService {
    async fn list_shows(&self) -> Result<Vec<Show>, ShowError> {
        self.store
            .list_shows()
            .await
            .map_err(|e| ShowError::Database(e.to_string()))
    }

    async fn get_show(&self, id: ShowId) -> Result<Show, ShowError> {
        self.store
            .get_show(id.value())
            .await
            .map_err(|e| ShowError::Database(e.to_string()))?
            .ok_or(ShowError::NotFound(id))
    }

    async fn create_show(&self, input: ShowInput) -> Result<Show, ShowError> {
        let id = input
            .id
            .map(ShowId::new)
            .ok_or_else(|| ShowError::InvalidData("show id is required".to_string()))?;

        let reconciler = Reconciler::new(self.store.as_ref(), ResolveMode::ReuseExisting);
        if reconciler.show_exists(id.value()).await? {
            return Err(ShowError::Conflict(id));
        }

        let mut work = UnitOfWork::new();
        let staged = reconciler
            .reconcile_show(&mut work, from_input(id.value(), input))
            .await?;
        work.stage_show_insert(staged);
        self.store.commit(work).await?;

        info!("Created show {}", id);
        self.get_show(id).await
    }

    async fn update_show(&self, id: ShowId, input: ShowInput) -> Result<(), ShowError> {
        if let Some(body_id) = input.id
            && body_id != id.value()
        {
            return Err(ShowError::InvalidData(format!(
                "body id {body_id} does not match path id {id}"
            )));
        }

        self.ensure_exists(id).await?;

        let reconciler = Reconciler::new(self.store.as_ref(), ResolveMode::MergeExisting);
        let mut work = UnitOfWork::new();
        let staged = reconciler
            .reconcile_show(&mut work, from_input(id.value(), input))
            .await?;
        work.stage_show_update(staged);
        self.store.commit(work).await?;

        info!("Updated show {}", id);
        Ok(())
    }

    async fn delete_show(&self, id: ShowId) -> Result<(), ShowError> {
        let removed = self
            .store
            .remove_show(id.value())
            .await
            .map_err(|e| ShowError::Database(e.to_string()))?;

        if removed {
            Ok(())
        } else {
            Err(ShowError::NotFound(id))
        }
    }

    async fn run_ingestion(&self) -> Result<IngestReport, ShowError> {
        info!("Starting show ingestion");
        let report =
            crate::ingest::run_ingestion(self.source.as_ref(), self.store.as_ref()).await?;
        Ok(report)
    }
}
