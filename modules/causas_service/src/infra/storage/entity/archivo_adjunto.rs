use sea_orm::entity::prelude::*;

/// Uploaded document
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "archivos_adjuntos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(indexed)]
    pub causa_id: Option<i32>,
    #[sea_orm(indexed)]
    pub etapa_causa_id: Option<i32>,
    /// Path relative to the media root
    pub archivo: String,
    pub nombre_original: String,
    pub descripcion: String,
    pub fecha_subida: DateTimeUtc,
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
        belongs_to = "super::etapa_causa::Entity",
        from = "Column::EtapaCausaId",
        to = "super::etapa_causa::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    EtapaCausa,
}

impl ActiveModelBehavior for ActiveModel {}
