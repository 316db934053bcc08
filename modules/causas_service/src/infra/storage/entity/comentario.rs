use sea_orm::entity::prelude::*;

/// Case note
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "comentarios")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(indexed)]
    pub causa_id: i32,
    pub autor_id: i32,
    pub texto: String,
    pub fecha_creacion: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::causa::Entity",
        from = "Column::CausaId",
        to = "super::causa::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Causa,

    #[sea_orm(
        belongs_to = "super::usuario::Entity",
        from = "Column::AutorId",
        to = "super::usuario::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Autor,
}

impl Related<super::usuario::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Autor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
