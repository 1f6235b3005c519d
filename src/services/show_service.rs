//! Domain service for the show catalog.
//!
//! Handlers go through [`ShowService`] and never touch the store directly.
//! Writes are staged in a [`crate::ingest::UnitOfWork`] and committed once.

use crate::domain::ShowId;
use crate::ingest::{IngestError, IngestReport};
use crate::models::show::{Show, ShowInput};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShowError {
    #[error("Show not found: {0}")]
    NotFound(ShowId),

    #[error("Show already exists: {0}")]
    Conflict(ShowId),

    #[error("Invalid show data: {0}")]
    InvalidData(String),

    #[error("Ingestion failed: {0}")]
    Ingest(#[from] IngestError),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for ShowError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait ShowService: Send + Sync {
    /// Lists every stored show with its full graph, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`ShowError::Database`] on connection failures.
    async fn list_shows(&self) -> Result<Vec<Show>, ShowError>;

    /// # Errors
    ///
    /// - Returns [`ShowError::NotFound`] if the show does not exist
    /// - Returns [`ShowError::Database`] on connection failures
    async fn get_show(&self, id: ShowId) -> Result<Show, ShowError>;

    /// Creates a show and whatever network, country and genres it refers to
    /// that are not stored yet.
    ///
    /// # Errors
    ///
    /// - Returns [`ShowError::InvalidData`] if the payload carries no id
    /// - Returns [`ShowError::Conflict`] if a show with the id already exists
    /// - Returns [`ShowError::Database`] on storage failures
    async fn create_show(&self, input: ShowInput) -> Result<Show, ShowError>;

    /// Replaces a show's fields and relations. Absent blocks clear the
    /// matching relation.
    ///
    /// # Errors
    ///
    /// - Returns [`ShowError::NotFound`] if the show does not exist
    /// - Returns [`ShowError::InvalidData`] if the body id differs from `id`
    /// - Returns [`ShowError::Database`] on storage failures
    async fn update_show(&self, id: ShowId, input: ShowInput) -> Result<(), ShowError>;

    /// # Errors
    ///
    /// - Returns [`ShowError::NotFound`] if the show does not exist
    /// - Returns [`ShowError::Database`] on storage failures
    async fn delete_show(&self, id: ShowId) -> Result<(), ShowError>;

    /// Pulls the upstream show list and stores every show not seen before.
    ///
    /// # Errors
    ///
    /// Returns [`ShowError::Ingest`] wrapping the cause of the aborted batch.
    async fn run_ingestion(&self) -> Result<IngestReport, ShowError>;
}
