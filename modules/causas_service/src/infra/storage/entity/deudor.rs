use sea_orm::entity::prelude::*;

/// Debtor
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "deudores")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub nombres: String,
    pub apellidos: String,
    /// Normalised `<body>-<dv>`
    #[sea_orm(unique)]
    pub rut: String,
    pub direccion: String,
    pub comuna: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
