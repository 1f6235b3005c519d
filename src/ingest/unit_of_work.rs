use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Unchanged, ColumnTrait,
    DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use tracing::debug;

use crate::entities::{countries, externals, genres, networks, ratings, show_genres, shows};
use crate::models::show::{Externals, Rating};

/// Reference to a network that is either already stored or staged in the
/// current unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkHandle {
    Stored(i32),
    Staged(usize),
}

/// Reference to a genre that is either already stored or staged in the
/// current unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenreHandle {
    Stored(i32),
    Staged(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedNetwork {
    /// `None` lets the database assign one.
    pub id: Option<i32>,
    pub name: String,
    pub country_code: Option<String>,
}

/// A show ready to be written, with every relation already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedShow {
    pub id: i32,
    pub name: String,
    pub language: Option<String>,
    pub network: Option<NetworkHandle>,
    pub genres: Vec<GenreHandle>,
    pub externals: Option<Externals>,
    pub rating: Option<Rating>,
}

/// Batch-scoped staging area and identity map.
///
/// Every natural key (country code, network id, genre name) maps to at most
/// one staged entry, so a batch never tries to insert the same row twice.
/// Owners are always written before dependents on commit: countries, then
/// networks, then genres, then shows with their externals, rating and genre
/// links. A unit of work must not outlive the batch it was created for.
#[derive(Debug, Default)]
pub struct UnitOfWork {
    countries: Vec<countries::Model>,
    country_index: HashMap<String, usize>,
    country_updates: Vec<countries::Model>,

    networks: Vec<StagedNetwork>,
    network_index: HashMap<i32, usize>,
    network_updates: Vec<networks::Model>,

    genres: Vec<String>,
    genre_index: HashMap<String, usize>,

    show_inserts: Vec<StagedShow>,
    show_updates: Vec<StagedShow>,
}

impl UnitOfWork {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_country(&self, code: &str) -> Option<&countries::Model> {
        self.country_index.get(code).map(|&i| &self.countries[i])
    }

    /// Stages a country insert. Returns the code, which doubles as its handle.
    pub fn stage_country(&mut self, country: countries::Model) -> String {
        if let Some(existing) = self.pending_country(&country.code) {
            return existing.code.clone();
        }
        let code = country.code.clone();
        self.country_index.insert(code.clone(), self.countries.len());
        self.countries.push(country);
        code
    }

    pub fn stage_country_update(&mut self, country: countries::Model) {
        self.country_updates.retain(|c| c.code != country.code);
        self.country_updates.push(country);
    }

    pub fn pending_network(&self, id: i32) -> Option<NetworkHandle> {
        self.network_index.get(&id).map(|&i| NetworkHandle::Staged(i))
    }

    pub fn stage_network(&mut self, network: StagedNetwork) -> NetworkHandle {
        if let Some(id) = network.id {
            if let Some(handle) = self.pending_network(id) {
                return handle;
            }
            self.network_index.insert(id, self.networks.len());
        }
        self.networks.push(network);
        NetworkHandle::Staged(self.networks.len() - 1)
    }

    pub fn stage_network_update(&mut self, network: networks::Model) {
        self.network_updates.retain(|n| n.id != network.id);
        self.network_updates.push(network);
    }

    pub fn pending_genre(&self, name: &str) -> Option<GenreHandle> {
        self.genre_index.get(name).map(|&i| GenreHandle::Staged(i))
    }

    pub fn stage_genre(&mut self, name: &str) -> GenreHandle {
        if let Some(handle) = self.pending_genre(name) {
            return handle;
        }
        self.genre_index.insert(name.to_string(), self.genres.len());
        self.genres.push(name.to_string());
        GenreHandle::Staged(self.genres.len() - 1)
    }

    pub fn stage_show_insert(&mut self, show: StagedShow) {
        self.show_inserts.push(show);
    }

    /// Stages a full replacement of an existing show's row, externals,
    /// rating and genre links.
    pub fn stage_show_update(&mut self, show: StagedShow) {
        self.show_updates.push(show);
    }

    #[must_use]
    pub fn has_staged_show(&self, id: i32) -> bool {
        self.show_inserts.iter().any(|s| s.id == id) || self.show_updates.iter().any(|s| s.id == id)
    }

    #[must_use]
    pub fn staged_show_count(&self) -> usize {
        self.show_inserts.len() + self.show_updates.len()
    }

    #[must_use]
    pub fn staged_network_count(&self) -> usize {
        self.networks.len()
    }

    #[must_use]
    pub fn staged_genre_count(&self) -> usize {
        self.genres.len()
    }

    #[must_use]
    pub fn staged_country_count(&self) -> usize {
        self.countries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.staged_show_count() == 0
            && self.countries.is_empty()
            && self.country_updates.is_empty()
            && self.networks.is_empty()
            && self.network_updates.is_empty()
            && self.genres.is_empty()
    }

    #[must_use]
    pub fn show_inserts(&self) -> &[StagedShow] {
        &self.show_inserts
    }

    /// Writes everything inside one transaction. A failure rolls the whole
    /// unit back.
    pub async fn commit(self, conn: &DatabaseConnection) -> Result<usize, DbErr> {
        let txn = conn.begin().await?;
        let written = self.apply(&txn).await?;
        txn.commit().await?;
        Ok(written)
    }

    async fn apply(self, txn: &DatabaseTransaction) -> Result<usize, DbErr> {
        for country in &self.countries {
            countries::ActiveModel {
                code: Set(country.code.clone()),
                name: Set(country.name.clone()),
                timezone: Set(country.timezone.clone()),
            }
            .insert(txn)
            .await?;
        }

        for country in self.country_updates {
            countries::ActiveModel {
                code: Unchanged(country.code),
                name: Set(country.name),
                timezone: Set(country.timezone),
            }
            .update(txn)
            .await?;
        }

        let mut network_ids = Vec::with_capacity(self.networks.len());
        for network in self.networks {
            let model = networks::ActiveModel {
                id: network.id.map_or(NotSet, Set),
                name: Set(network.name),
                country_code: Set(network.country_code),
            }
            .insert(txn)
            .await?;
            network_ids.push(model.id);
        }

        for network in self.network_updates {
            networks::ActiveModel {
                id: Unchanged(network.id),
                name: Set(network.name),
                country_code: Set(network.country_code),
            }
            .update(txn)
            .await?;
        }

        let mut genre_ids = Vec::with_capacity(self.genres.len());
        for name in self.genres {
            let model = genres::ActiveModel {
                id: NotSet,
                name: Set(name),
            }
            .insert(txn)
            .await?;
            genre_ids.push(model.id);
        }

        let resolver = HandleResolver {
            network_ids: &network_ids,
            genre_ids: &genre_ids,
        };

        let written = self.show_updates.len() + self.show_inserts.len();

        for show in self.show_updates {
            shows::ActiveModel {
                id: Unchanged(show.id),
                name: Set(show.name.clone()),
                language: Set(show.language.clone()),
                network_id: Set(show.network.map(|h| resolver.network(h))),
            }
            .update(txn)
            .await?;

            externals::Entity::delete_many()
                .filter(externals::Column::ShowId.eq(show.id))
                .exec(txn)
                .await?;
            ratings::Entity::delete_many()
                .filter(ratings::Column::ShowId.eq(show.id))
                .exec(txn)
                .await?;
            show_genres::Entity::delete_many()
                .filter(show_genres::Column::ShowId.eq(show.id))
                .exec(txn)
                .await?;

            insert_dependents(txn, &show, &resolver).await?;
            debug!("Updated show {}", show.id);
        }

        for show in self.show_inserts {
            shows::ActiveModel {
                id: Set(show.id),
                name: Set(show.name.clone()),
                language: Set(show.language.clone()),
                network_id: Set(show.network.map(|h| resolver.network(h))),
            }
            .insert(txn)
            .await?;

            insert_dependents(txn, &show, &resolver).await?;
            debug!("Inserted show {}", show.id);
        }

        Ok(written)
    }
}

struct HandleResolver<'a> {
    network_ids: &'a [i32],
    genre_ids: &'a [i32],
}

impl HandleResolver<'_> {
    fn network(&self, handle: NetworkHandle) -> i32 {
        match handle {
            NetworkHandle::Stored(id) => id,
            NetworkHandle::Staged(i) => self.network_ids[i],
        }
    }

    fn genre(&self, handle: GenreHandle) -> i32 {
        match handle {
            GenreHandle::Stored(id) => id,
            GenreHandle::Staged(i) => self.genre_ids[i],
        }
    }
}

async fn insert_dependents(
    txn: &DatabaseTransaction,
    show: &StagedShow,
    resolver: &HandleResolver<'_>,
) -> Result<(), DbErr> {
    if let Some(ext) = &show.externals {
        externals::ActiveModel {
            show_id: Set(show.id),
            imdb: Set(ext.imdb.clone()),
            tvrage: Set(ext.tvrage),
            thetvdb: Set(ext.thetvdb),
        }
        .insert(txn)
        .await?;
    }

    if let Some(rating) = &show.rating {
        ratings::ActiveModel {
            show_id: Set(show.id),
            average: Set(rating.average),
        }
        .insert(txn)
        .await?;
    }

    for (position, handle) in show.genres.iter().enumerate() {
        show_genres::ActiveModel {
            show_id: Set(show.id),
            genre_id: Set(resolver.genre(*handle)),
            position: Set(i32::try_from(position).unwrap_or(i32::MAX)),
        }
        .insert(txn)
        .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn country(code: &str) -> countries::Model {
        countries::Model {
            code: code.to_string(),
            name: format!("Country {code}"),
            timezone: None,
        }
    }

    #[test]
    fn staging_same_country_twice_keeps_one() {
        let mut work = UnitOfWork::new();
        work.stage_country(country("US"));
        work.stage_country(country("US"));
        work.stage_country(country("GB"));
        assert_eq!(work.staged_country_count(), 2);
        assert_eq!(work.pending_country("US").unwrap().name, "Country US");
    }

    #[test]
    fn networks_with_ids_are_deduplicated() {
        let mut work = UnitOfWork::new();
        let first = work.stage_network(StagedNetwork {
            id: Some(2),
            name: "CBS".to_string(),
            country_code: None,
        });
        let again = work.stage_network(StagedNetwork {
            id: Some(2),
            name: "CBS (dup)".to_string(),
            country_code: None,
        });
        assert_eq!(first, again);
        assert_eq!(work.pending_network(2), Some(first));
        assert_eq!(work.staged_network_count(), 1);
    }

    #[test]
    fn networks_without_ids_are_always_new() {
        let mut work = UnitOfWork::new();
        let a = work.stage_network(StagedNetwork {
            id: None,
            name: "Indie".to_string(),
            country_code: None,
        });
        let b = work.stage_network(StagedNetwork {
            id: None,
            name: "Indie".to_string(),
            country_code: None,
        });
        assert_ne!(a, b);
        assert_eq!(work.staged_network_count(), 2);
    }

    #[test]
    fn genre_names_are_case_sensitive() {
        let mut work = UnitOfWork::new();
        let drama = work.stage_genre("Drama");
        assert_eq!(work.stage_genre("Drama"), drama);
        assert_ne!(work.stage_genre("drama"), drama);
        assert_eq!(work.staged_genre_count(), 2);
    }

    #[test]
    fn fresh_unit_is_empty() {
        let mut work = UnitOfWork::new();
        assert!(work.is_empty());
        work.stage_genre("Drama");
        assert!(!work.is_empty());
        assert_eq!(work.staged_show_count(), 0);
    }
}
