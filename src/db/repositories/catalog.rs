use crate::entities::{countries, genres, networks, prelude::*};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};

/// Lookups for the shared reference rows: networks, countries and genres.
pub struct CatalogRepository {
    conn: DatabaseConnection,
}

impl CatalogRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find_network(&self, id: i32) -> Result<Option<networks::Model>, DbErr> {
        Networks::find_by_id(id).one(&self.conn).await
    }

    pub async fn find_country(&self, code: &str) -> Result<Option<countries::Model>, DbErr> {
        Countries::find_by_id(code.to_string()).one(&self.conn).await
    }

    /// Exact, case-sensitive match.
    pub async fn find_genre(&self, name: &str) -> Result<Option<genres::Model>, DbErr> {
        Genres::find()
            .filter(genres::Column::Name.eq(name))
            .one(&self.conn)
            .await
    }

    pub async fn list_genres(&self) -> Result<Vec<genres::Model>, DbErr> {
        Genres::find()
            .order_by_asc(genres::Column::Name)
            .all(&self.conn)
            .await
    }

    pub async fn list_networks(&self) -> Result<Vec<networks::Model>, DbErr> {
        Networks::find()
            .order_by_asc(networks::Column::Id)
            .all(&self.conn)
            .await
    }

    pub async fn list_countries(&self) -> Result<Vec<countries::Model>, DbErr> {
        Countries::find()
            .order_by_asc(countries::Column::Code)
            .all(&self.conn)
            .await
    }
}
