use sea_orm::DbErr;
use tracing::debug;

use super::normalizer::{CountryCandidate, NetworkCandidate, NormalizedShow};
use super::unit_of_work::{GenreHandle, NetworkHandle, StagedNetwork, StagedShow, UnitOfWork};
use super::CatalogLookup;
use crate::entities::{countries, networks};

/// How found rows are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolveMode {
    /// Found rows are reused untouched. Used by ingestion and create.
    #[default]
    ReuseExisting,
    /// Found committed networks and countries get their descriptive fields
    /// refreshed from the payload. Used by update.
    MergeExisting,
}

/// Resolves candidates to canonical rows: staged entries first, then
/// committed storage, and only then a newly staged row.
///
/// Not-found is never an error here; only storage failures propagate.
pub struct Reconciler<'a, L: CatalogLookup + ?Sized> {
    lookup: &'a L,
    mode: ResolveMode,
}

impl<'a, L: CatalogLookup + ?Sized> Reconciler<'a, L> {
    pub fn new(lookup: &'a L, mode: ResolveMode) -> Self {
        Self { lookup, mode }
    }

    /// Whether a show with this id is already committed. Staged shows are not
    /// consulted: a batch never refers back to a show it created itself.
    pub async fn show_exists(&self, id: i32) -> Result<bool, DbErr> {
        self.lookup.show_exists(id).await
    }

    /// Returns the canonical country code for the candidate.
    pub async fn resolve_country(
        &self,
        work: &mut UnitOfWork,
        candidate: &CountryCandidate,
    ) -> Result<String, DbErr> {
        debug_assert!(!candidate.code.is_empty(), "country code must be non-empty");

        if let Some(pending) = work.pending_country(&candidate.code) {
            return Ok(pending.code.clone());
        }

        if let Some(existing) = self.lookup.find_country(&candidate.code).await? {
            if self.mode == ResolveMode::MergeExisting
                && (existing.name != candidate.name || existing.timezone != candidate.timezone)
            {
                work.stage_country_update(countries::Model {
                    code: existing.code.clone(),
                    name: candidate.name.clone(),
                    timezone: candidate.timezone.clone(),
                });
            }
            return Ok(existing.code);
        }

        debug!("Staging new country {}", candidate.code);
        Ok(work.stage_country(countries::Model {
            code: candidate.code.clone(),
            name: candidate.name.clone(),
            timezone: candidate.timezone.clone(),
        }))
    }

    /// Returns a handle on the canonical network for the candidate. When the
    /// id is known, identity wins over payload: a found network is reused as
    /// it is, unless merge mode refreshes it.
    pub async fn resolve_network(
        &self,
        work: &mut UnitOfWork,
        candidate: &NetworkCandidate,
    ) -> Result<NetworkHandle, DbErr> {
        if let Some(id) = candidate.id {
            if let Some(handle) = work.pending_network(id) {
                return Ok(handle);
            }

            if let Some(existing) = self.lookup.find_network(id).await? {
                if self.mode == ResolveMode::MergeExisting {
                    self.merge_network(work, existing, candidate).await?;
                }
                return Ok(NetworkHandle::Stored(id));
            }
        }

        let country_code = match &candidate.country {
            Some(country) => Some(self.resolve_country(work, country).await?),
            None => None,
        };

        debug!(
            "Staging new network {} ({:?})",
            candidate.name, candidate.id
        );
        Ok(work.stage_network(StagedNetwork {
            id: candidate.id,
            name: candidate.name.clone(),
            country_code,
        }))
    }

    /// Refreshes a stored network from the payload. A payload without a
    /// country keeps the stored one.
    async fn merge_network(
        &self,
        work: &mut UnitOfWork,
        existing: networks::Model,
        candidate: &NetworkCandidate,
    ) -> Result<(), DbErr> {
        let country_code = match &candidate.country {
            Some(country) => Some(self.resolve_country(work, country).await?),
            None => existing.country_code.clone(),
        };

        if existing.name != candidate.name || existing.country_code != country_code {
            work.stage_network_update(networks::Model {
                id: existing.id,
                name: candidate.name.clone(),
                country_code,
            });
        }
        Ok(())
    }

    /// Returns `None` for blank names.
    pub async fn resolve_genre(
        &self,
        work: &mut UnitOfWork,
        name: &str,
    ) -> Result<Option<GenreHandle>, DbErr> {
        if name.trim().is_empty() {
            return Ok(None);
        }

        if let Some(handle) = work.pending_genre(name) {
            return Ok(Some(handle));
        }

        if let Some(existing) = self.lookup.find_genre(name).await? {
            return Ok(Some(GenreHandle::Stored(existing.id)));
        }

        debug!("Staging new genre {}", name);
        Ok(Some(work.stage_genre(name)))
    }

    /// Resolves a genre list in input order. Names that resolve to a genre
    /// already in the list are skipped.
    pub async fn resolve_genres(
        &self,
        work: &mut UnitOfWork,
        names: &[String],
    ) -> Result<Vec<GenreHandle>, DbErr> {
        let mut handles = Vec::with_capacity(names.len());
        for name in names {
            if let Some(handle) = self.resolve_genre(work, name).await?
                && !handles.contains(&handle)
            {
                handles.push(handle);
            }
        }
        Ok(handles)
    }

    /// Resolves every relation of a normalized show and returns it ready for
    /// staging. The show itself is not staged here.
    pub async fn reconcile_show(
        &self,
        work: &mut UnitOfWork,
        show: NormalizedShow,
    ) -> Result<StagedShow, DbErr> {
        let genres = self.resolve_genres(work, &show.genre_names).await?;

        let network = match &show.network {
            Some(candidate) => Some(self.resolve_network(work, candidate).await?),
            None => None,
        };

        Ok(StagedShow {
            id: show.id,
            name: show.name,
            language: show.language,
            network,
            genres,
            externals: show.externals,
            rating: show.rating,
        })
    }
}
