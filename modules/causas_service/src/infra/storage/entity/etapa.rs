use sea_orm::entity::prelude::*;

/// Procedural stage
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "etapas")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub nombre: String,
    #[sea_orm(indexed)]
    pub tipo_etapa_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Stage category; a category with stages cannot be deleted
    #[sea_orm(
        belongs_to = "super::tipo_etapa::Entity",
        from = "Column::TipoEtapaId",
        to = "super::tipo_etapa::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    TipoEtapa,
}

impl Related<super::tipo_etapa::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TipoEtapa.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
