use std::collections::HashMap;

use crate::entities::{
    countries, externals, genres, networks, prelude::*, ratings, show_genres, shows,
};
use crate::models::show::{Country, Externals, Genre, Network, Rating, Show};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use tracing::info;

pub struct ShowRepository {
    conn: DatabaseConnection,
}

impl ShowRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> anyhow::Result<Option<Show>> {
        let Some(model) = Shows::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        Ok(self.assemble(vec![model]).await?.pop())
    }

    /// Every stored show, ordered by id.
    pub async fn list(&self) -> anyhow::Result<Vec<Show>> {
        let models = Shows::find()
            .order_by_asc(shows::Column::Id)
            .all(&self.conn)
            .await?;

        self.assemble(models).await
    }

    pub async fn exists(&self, id: i32) -> Result<bool, sea_orm::DbErr> {
        let count = Shows::find_by_id(id).count(&self.conn).await?;
        Ok(count > 0)
    }

    pub async fn count(&self) -> anyhow::Result<u64> {
        Ok(Shows::find().count(&self.conn).await?)
    }

    /// Deletes the show with its externals, rating and genre links. Networks,
    /// countries and genres are shared and stay.
    pub async fn remove(&self, id: i32) -> anyhow::Result<bool> {
        let txn = self.conn.begin().await?;

        externals::Entity::delete_many()
            .filter(externals::Column::ShowId.eq(id))
            .exec(&txn)
            .await?;
        ratings::Entity::delete_many()
            .filter(ratings::Column::ShowId.eq(id))
            .exec(&txn)
            .await?;
        show_genres::Entity::delete_many()
            .filter(show_genres::Column::ShowId.eq(id))
            .exec(&txn)
            .await?;

        let result = Shows::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        let removed = result.rows_affected > 0;
        if removed {
            info!("Removed show with ID: {}", id);
        }
        Ok(removed)
    }

    /// Loads the relations of `models` with one query per table and stitches
    /// them into full graphs, keeping the input order.
    async fn assemble(&self, models: Vec<shows::Model>) -> anyhow::Result<Vec<Show>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let show_ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let network_ids: Vec<i32> = models.iter().filter_map(|m| m.network_id).collect();

        let mut externals_by_show: HashMap<i32, externals::Model> = externals::Entity::find()
            .filter(externals::Column::ShowId.is_in(show_ids.clone()))
            .all(&self.conn)
            .await?
            .into_iter()
            .map(|e| (e.show_id, e))
            .collect();

        let mut ratings_by_show: HashMap<i32, ratings::Model> = Ratings::find()
            .filter(ratings::Column::ShowId.is_in(show_ids.clone()))
            .all(&self.conn)
            .await?
            .into_iter()
            .map(|r| (r.show_id, r))
            .collect();

        let links = ShowGenres::find()
            .filter(show_genres::Column::ShowId.is_in(show_ids))
            .order_by_asc(show_genres::Column::ShowId)
            .order_by_asc(show_genres::Column::Position)
            .find_also_related(genres::Entity)
            .all(&self.conn)
            .await?;

        let mut genres_by_show: HashMap<i32, Vec<Genre>> = HashMap::new();
        for (link, genre) in links {
            if let Some(genre) = genre {
                genres_by_show.entry(link.show_id).or_default().push(Genre {
                    id: genre.id,
                    name: genre.name,
                });
            }
        }

        let networks_by_id: HashMap<i32, Network> = if network_ids.is_empty() {
            HashMap::new()
        } else {
            Networks::find()
                .filter(networks::Column::Id.is_in(network_ids))
                .find_also_related(countries::Entity)
                .all(&self.conn)
                .await?
                .into_iter()
                .map(|(network, country)| (network.id, map_network(network, country)))
                .collect()
        };

        Ok(models
            .into_iter()
            .map(|model| Show {
                id: model.id,
                name: model.name,
                language: model.language,
                genres: genres_by_show.remove(&model.id).unwrap_or_default(),
                externals: externals_by_show.remove(&model.id).map(|e| Externals {
                    imdb: e.imdb,
                    tvrage: e.tvrage,
                    thetvdb: e.thetvdb,
                }),
                rating: ratings_by_show
                    .remove(&model.id)
                    .map(|r| Rating { average: r.average }),
                network: model
                    .network_id
                    .and_then(|id| networks_by_id.get(&id).cloned()),
            })
            .collect())
    }
}

fn map_network(network: networks::Model, country: Option<countries::Model>) -> Network {
    Network {
        id: network.id,
        name: network.name,
        country: country.map(|c| Country {
            code: c.code,
            name: c.name,
            timezone: c.timezone,
        }),
    }
}
