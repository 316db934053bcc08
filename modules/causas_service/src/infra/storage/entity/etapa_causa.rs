use sea_orm::entity::prelude::*;

/// One stage event in a case history
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "etapas_causa")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(indexed)]
    pub causa_id: i32,
    #[sea_orm(indexed)]
    pub etapa_id: i32,
    pub fecha: Date,
    pub descripcion: String,
    /// Whole pesos
    pub costas: i64,
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

    /// History must not lose its stage classification
    #[sea_orm(
        belongs_to = "super::etapa::Entity",
        from = "Column::EtapaId",
        to = "super::etapa::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Etapa,
}

impl Related<super::causa::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Causa.def()
    }
}

impl Related<super::etapa::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Etapa.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
