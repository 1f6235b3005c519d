use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "shows")]
pub struct Model {
    /// Supplied by the upstream source, never generated.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub name: String,
    pub language: Option<String>,
    pub network_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::networks::Entity",
        from = "Column::NetworkId",
        to = "super::networks::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Networks,
    #[sea_orm(has_one = "super::externals::Entity")]
    Externals,
    #[sea_orm(has_one = "super::ratings::Entity")]
    Ratings,
    #[sea_orm(has_many = "super::show_genres::Entity")]
    ShowGenres,
}

impl Related<super::networks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Networks.def()
    }
}

impl Related<super::externals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Externals.def()
    }
}

impl Related<super::ratings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ratings.def()
    }
}

impl Related<super::show_genres::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShowGenres.def()
    }
}

impl Related<super::genres::Entity> for Entity {
    fn to() -> RelationDef {
        super::show_genres::Relation::Genres.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::show_genres::Relation::Shows.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
