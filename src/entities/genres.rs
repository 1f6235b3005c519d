use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "genres")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::show_genres::Entity")]
    ShowGenres,
}

impl Related<super::show_genres::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShowGenres.def()
    }
}

impl Related<super::shows::Entity> for Entity {
    fn to() -> RelationDef {
        super::show_genres::Relation::Shows.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::show_genres::Relation::Genres.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
