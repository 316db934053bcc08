use sea_orm::entity::prelude::*;

/// Judicial case
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "causas")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Docket number
    #[sea_orm(unique)]
    pub rol: String,

    pub operacion: String,

    /// One of RECUPERADO, ACTIVO, SUSPENDIDO, ARCHIVADO
    #[sea_orm(indexed)]
    pub estado: String,

    /// Whole pesos
    pub total_costas: i64,

    pub arbitro: String,
    pub fecha_asignacion: Option<Date>,
    pub observaciones: String,

    #[sea_orm(indexed)]
    pub deudor_id: i32,
    pub tribunal_id: Option<i32>,
    #[sea_orm(indexed)]
    pub cartera_id: Option<i32>,
    pub abogado_encargado_id: Option<i32>,

    pub fecha_creacion: DateTimeUtc,
    pub fecha_actualizacion: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Debtor outlives the case; a debtor with cases cannot be deleted
    #[sea_orm(
        belongs_to = "super::deudor::Entity",
        from = "Column::DeudorId",
        to = "super::deudor::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Deudor,

    #[sea_orm(
        belongs_to = "super::tribunal::Entity",
        from = "Column::TribunalId",
        to = "super::tribunal::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Tribunal,

    #[sea_orm(
        belongs_to = "super::cartera::Entity",
        from = "Column::CarteraId",
        to = "super::cartera::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Cartera,

    #[sea_orm(
        belongs_to = "super::usuario::Entity",
        from = "Column::AbogadoEncargadoId",
        to = "super::usuario::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    AbogadoEncargado,
}

impl Related<super::deudor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Deudor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
