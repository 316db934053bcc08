use sea_orm::entity::prelude::*;

/// Property registry addendum; the case id is the primary key
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "antecedentes_cbr")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub causa_id: i32,
    pub conservador: String,
    pub fojas: String,
    pub numero: String,
    pub anio: Option<i32>,
    pub comuna: String,
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
}

impl ActiveModelBehavior for ActiveModel {}
