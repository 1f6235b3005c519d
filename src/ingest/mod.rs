//! Show ingestion: fetch the upstream show list, turn each record into an
//! entity graph, reconcile it against what is already stored or staged, and
//! commit the whole batch at once.
//!
//! The pieces are split so each can be exercised on its own:
//!
//! - [`normalizer`] turns a raw record into a [`NormalizedShow`].
//! - [`unit_of_work`] is the batch-scoped identity map and staging area.
//! - [`reconciler`] decides between reusing an entity and staging a new one.
//! - [`orchestrator`] drives fetch, normalize, reconcile, stage and commit.

pub mod normalizer;
pub mod orchestrator;
pub mod reconciler;
pub mod unit_of_work;

use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

use crate::clients::tvmaze::{RawShow, SourceError};
use crate::entities::{countries, genres, networks};

pub use normalizer::{CountryCandidate, NetworkCandidate, NormalizedShow, normalize};
pub use orchestrator::{ingest_records, run_ingestion};
pub use reconciler::{Reconciler, ResolveMode};
pub use unit_of_work::{GenreHandle, NetworkHandle, StagedShow, UnitOfWork};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("record at position {index} has no show id")]
    MalformedRecord { index: usize },

    #[error("could not reach the show source: {0}")]
    Connectivity(String),

    #[error("show source responded with HTTP {status}")]
    Upstream { status: u16 },

    #[error("show source payload is invalid: {0}")]
    Parse(String),

    #[error("storage error: {0}")]
    Storage(#[from] DbErr),
}

impl From<SourceError> for IngestError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Connectivity { url, message } => {
                Self::Connectivity(format!("{url}: {message}"))
            }
            SourceError::Upstream { status, .. } => Self::Upstream { status },
            SourceError::Parse(message) => Self::Parse(message),
        }
    }
}

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub fetched: usize,
    pub created: usize,
    pub skipped: usize,
}

/// Where show records come from.
#[async_trait::async_trait]
pub trait ShowSource: Send + Sync {
    async fn fetch_shows(&self) -> Result<Vec<RawShow>, SourceError>;
}

/// Read side of the persistence gateway: lookups against committed rows only.
/// Staged rows are consulted through the [`UnitOfWork`] itself.
#[async_trait::async_trait]
pub trait CatalogLookup: Send + Sync {
    async fn show_exists(&self, id: i32) -> Result<bool, DbErr>;

    async fn find_network(&self, id: i32) -> Result<Option<networks::Model>, DbErr>;

    async fn find_country(&self, code: &str) -> Result<Option<countries::Model>, DbErr>;

    async fn find_genre(&self, name: &str) -> Result<Option<genres::Model>, DbErr>;
}

/// Full persistence gateway: lookups plus an all-or-nothing commit.
#[async_trait::async_trait]
pub trait CatalogGateway: CatalogLookup {
    /// Applies every staged change in one transaction and returns the number
    /// of shows written. Either all staged rows land or none do.
    async fn commit(&self, work: UnitOfWork) -> Result<usize, DbErr>;
}
