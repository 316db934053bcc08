//! SeaORM repository implementations

use crate::contract::*;
use crate::domain::repository::{
    CatalogRepository, CausaRepository, DeudorRepository, HistorialRepository, StorageError,
    StorageResult,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    prelude::Expr, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, SqlErr, TransactionTrait,
};
use sea_orm::ActiveValue::{NotSet, Set};
use std::collections::HashMap;
use std::sync::Arc;

use super::entity;
use super::mapper::{apply_causa_fields, comentario_from, etapa_causa_from};

impl From<DbErr> for StorageError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => StorageError::Duplicate(detail),
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => StorageError::Referenced(detail),
            _ => StorageError::Other(err.into()),
        }
    }
}

// ===== Catalog Repository =====

pub struct SeaOrmCatalogRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmCatalogRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogRepository for SeaOrmCatalogRepository {
    async fn create_usuario(&self, username: &str, nombre: &str) -> StorageResult<Usuario> {
        let active = entity::usuario::ActiveModel {
            id: NotSet,
            username: Set(username.to_string()),
            nombre: Set(nombre.to_string()),
        };
        Ok(active.insert(&*self.db).await?.into())
    }

    async fn find_usuario(&self, id: Id) -> StorageResult<Option<Usuario>> {
        let result = entity::usuario::Entity::find_by_id(id)
            .one(&*self.db)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list_usuarios(&self) -> StorageResult<Vec<Usuario>> {
        let results = entity::usuario::Entity::find()
            .order_by_asc(entity::usuario::Column::Username)
            .all(&*self.db)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn delete_usuario(&self, id: Id) -> StorageResult<bool> {
        let txn = self.db.begin().await?;

        if entity::usuario::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Ok(false);
        }

        entity::causa::Entity::update_many()
            .col_expr(
                entity::causa::Column::AbogadoEncargadoId,
                Expr::value(Option::<i32>::None),
            )
            .filter(entity::causa::Column::AbogadoEncargadoId.eq(id))
            .exec(&txn)
            .await?;

        entity::comentario::Entity::delete_many()
            .filter(entity::comentario::Column::AutorId.eq(id))
            .exec(&txn)
            .await?;

        entity::usuario::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(true)
    }

    async fn create_tribunal(&self, nombre: &str) -> StorageResult<Tribunal> {
        let active = entity::tribunal::ActiveModel {
            id: NotSet,
            nombre: Set(nombre.to_string()),
        };
        Ok(active.insert(&*self.db).await?.into())
    }

    async fn find_tribunal(&self, id: Id) -> StorageResult<Option<Tribunal>> {
        let result = entity::tribunal::Entity::find_by_id(id)
            .one(&*self.db)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list_tribunales(&self) -> StorageResult<Vec<Tribunal>> {
        let results = entity::tribunal::Entity::find()
            .order_by_asc(entity::tribunal::Column::Nombre)
            .all(&*self.db)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn delete_tribunal(&self, id: Id) -> StorageResult<bool> {
        let txn = self.db.begin().await?;

        if entity::tribunal::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Ok(false);
        }

        entity::causa::Entity::update_many()
            .col_expr(entity::causa::Column::TribunalId, Expr::value(Option::<i32>::None))
            .filter(entity::causa::Column::TribunalId.eq(id))
            .exec(&txn)
            .await?;

        entity::tribunal::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(true)
    }

    async fn create_cartera(&self, nombre: &str) -> StorageResult<Cartera> {
        let active = entity::cartera::ActiveModel {
            id: NotSet,
            nombre: Set(nombre.to_string()),
        };
        Ok(active.insert(&*self.db).await?.into())
    }

    async fn find_cartera(&self, id: Id) -> StorageResult<Option<Cartera>> {
        let result = entity::cartera::Entity::find_by_id(id)
            .one(&*self.db)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list_carteras(&self) -> StorageResult<Vec<Cartera>> {
        let results = entity::cartera::Entity::find()
            .order_by_asc(entity::cartera::Column::Nombre)
            .all(&*self.db)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn delete_cartera(&self, id: Id) -> StorageResult<bool> {
        let txn = self.db.begin().await?;

        if entity::cartera::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Ok(false);
        }

        entity::causa::Entity::update_many()
            .col_expr(entity::causa::Column::CarteraId, Expr::value(Option::<i32>::None))
            .filter(entity::causa::Column::CarteraId.eq(id))
            .exec(&txn)
            .await?;

        entity::cartera::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(true)
    }

    async fn create_tipo_etapa(&self, nombre: &str) -> StorageResult<TipoEtapa> {
        let active = entity::tipo_etapa::ActiveModel {
            id: NotSet,
            nombre: Set(nombre.to_string()),
        };
        Ok(active.insert(&*self.db).await?.into())
    }

    async fn find_tipo_etapa(&self, id: Id) -> StorageResult<Option<TipoEtapa>> {
        let result = entity::tipo_etapa::Entity::find_by_id(id)
            .one(&*self.db)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list_tipos_etapa(&self) -> StorageResult<Vec<TipoEtapa>> {
        let results = entity::tipo_etapa::Entity::find()
            .order_by_asc(entity::tipo_etapa::Column::Nombre)
            .all(&*self.db)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn delete_tipo_etapa(&self, id: Id) -> StorageResult<bool> {
        let txn = self.db.begin().await?;

        if entity::tipo_etapa::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Ok(false);
        }

        let etapas = entity::etapa::Entity::find()
            .filter(entity::etapa::Column::TipoEtapaId.eq(id))
            .count(&txn)
            .await?;
        if etapas > 0 {
            return Err(StorageError::Referenced(format!(
                "tipo_etapa {} is used by {} etapas",
                id, etapas
            )));
        }

        entity::tipo_etapa::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(true)
    }

    async fn create_etapa(&self, nombre: &str, tipo_etapa_id: Id) -> StorageResult<Etapa> {
        let active = entity::etapa::ActiveModel {
            id: NotSet,
            nombre: Set(nombre.to_string()),
            tipo_etapa_id: Set(tipo_etapa_id),
        };
        Ok(active.insert(&*self.db).await?.into())
    }

    async fn find_etapa(&self, id: Id) -> StorageResult<Option<Etapa>> {
        let result = entity::etapa::Entity::find_by_id(id).one(&*self.db).await?;
        Ok(result.map(Into::into))
    }

    async fn list_etapas(&self) -> StorageResult<Vec<Etapa>> {
        let results = entity::etapa::Entity::find()
            .order_by_asc(entity::etapa::Column::Nombre)
            .all(&*self.db)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn delete_etapa(&self, id: Id) -> StorageResult<bool> {
        let txn = self.db.begin().await?;

        if entity::etapa::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Ok(false);
        }

        let eventos = entity::etapa_causa::Entity::find()
            .filter(entity::etapa_causa::Column::EtapaId.eq(id))
            .count(&txn)
            .await?;
        if eventos > 0 {
            return Err(StorageError::Referenced(format!(
                "etapa {} is used by {} history events",
                id, eventos
            )));
        }

        entity::etapa::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(true)
    }
}

// ===== Deudor Repository =====

pub struct SeaOrmDeudorRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmDeudorRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DeudorRepository for SeaOrmDeudorRepository {
    async fn create(&self, deudor: &NewDeudor) -> StorageResult<Deudor> {
        let active = entity::deudor::ActiveModel {
            id: NotSet,
            nombres: Set(deudor.nombres.clone()),
            apellidos: Set(deudor.apellidos.clone()),
            rut: Set(deudor.rut.clone()),
            direccion: Set(deudor.direccion.clone()),
            comuna: Set(deudor.comuna.clone()),
        };
        Ok(active.insert(&*self.db).await?.into())
    }

    async fn find(&self, id: Id) -> StorageResult<Option<Deudor>> {
        let result = entity::deudor::Entity::find_by_id(id).one(&*self.db).await?;
        Ok(result.map(Into::into))
    }

    async fn find_by_rut(&self, rut: &str) -> StorageResult<Option<Deudor>> {
        let result = entity::deudor::Entity::find()
            .filter(entity::deudor::Column::Rut.eq(rut))
            .one(&*self.db)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn list(&self) -> StorageResult<Vec<Deudor>> {
        let results = entity::deudor::Entity::find()
            .order_by_asc(entity::deudor::Column::Apellidos)
            .order_by_asc(entity::deudor::Column::Nombres)
            .all(&*self.db)
            .await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, id: Id) -> StorageResult<bool> {
        let txn = self.db.begin().await?;

        if entity::deudor::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Ok(false);
        }

        let causas = entity::causa::Entity::find()
            .filter(entity::causa::Column::DeudorId.eq(id))
            .count(&txn)
            .await?;
        if causas > 0 {
            return Err(StorageError::Referenced(format!(
                "deudor {} is used by {} causas",
                id, causas
            )));
        }

        entity::deudor::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(true)
    }
}

// ===== Causa Repository =====

pub struct SeaOrmCausaRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmCausaRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

/// Ids of every history event of a case
async fn evento_ids(txn: &DatabaseTransaction, causa_id: Id) -> Result<Vec<Id>, DbErr> {
    entity::etapa_causa::Entity::find()
        .select_only()
        .column(entity::etapa_causa::Column::Id)
        .filter(entity::etapa_causa::Column::CausaId.eq(causa_id))
        .into_tuple::<i32>()
        .all(txn)
        .await
}

/// Attachments held directly by the case or by one of its events
fn adjuntos_of(causa_id: Id, eventos: Vec<Id>) -> Condition {
    let mut condition =
        Condition::any().add(entity::archivo_adjunto::Column::CausaId.eq(causa_id));
    if !eventos.is_empty() {
        condition = condition.add(entity::archivo_adjunto::Column::EtapaCausaId.is_in(eventos));
    }
    condition
}

/// One count per estado, in declaration order, from `GROUP BY estado` rows
fn tally_por_estado(grouped: Vec<(String, i64)>) -> anyhow::Result<Vec<(EstadoCausa, u64)>> {
    let mut por_estado: Vec<(EstadoCausa, u64)> =
        EstadoCausa::ALL.iter().map(|estado| (*estado, 0)).collect();
    for (estado, n) in grouped {
        let estado: EstadoCausa = estado.parse()?;
        let n = u64::try_from(n)
            .map_err(|_| anyhow::anyhow!("negative count {} for estado {}", n, estado))?;
        if let Some(slot) = por_estado.iter_mut().find(|(e, _)| *e == estado) {
            slot.1 = n;
        }
    }
    Ok(por_estado)
}

#[async_trait]
impl CausaRepository for SeaOrmCausaRepository {
    async fn create(&self, fields: &CausaFields, now: DateTime<Utc>) -> StorageResult<Causa> {
        let mut active = entity::causa::ActiveModel {
            id: NotSet,
            fecha_creacion: Set(now),
            fecha_actualizacion: Set(now),
            ..Default::default()
        };
        apply_causa_fields(&mut active, fields);

        let result = active.insert(&*self.db).await?;
        Ok(result.try_into()?)
    }

    async fn update(
        &self,
        id: Id,
        fields: &CausaFields,
        now: DateTime<Utc>,
    ) -> StorageResult<Option<Causa>> {
        let Some(existing) = entity::causa::Entity::find_by_id(id).one(&*self.db).await? else {
            return Ok(None);
        };

        let mut active = existing.into_active_model();
        apply_causa_fields(&mut active, fields);
        active.fecha_actualizacion = Set(now);

        let result = active.update(&*self.db).await?;
        Ok(Some(result.try_into()?))
    }

    async fn find(&self, id: Id) -> StorageResult<Option<Causa>> {
        match entity::causa::Entity::find_by_id(id).one(&*self.db).await? {
            Some(model) => Ok(Some(model.try_into()?)),
            None => Ok(None),
        }
    }

    async fn rol_taken(&self, rol: &str, excluding: Option<Id>) -> StorageResult<bool> {
        let mut query = entity::causa::Entity::find().filter(entity::causa::Column::Rol.eq(rol));
        if let Some(id) = excluding {
            query = query.filter(entity::causa::Column::Id.ne(id));
        }
        Ok(query.count(&*self.db).await? > 0)
    }

    async fn list(&self, filter: CausaFilter) -> StorageResult<Vec<(Causa, Deudor)>> {
        let mut query = entity::causa::Entity::find().find_also_related(entity::deudor::Entity);

        if let Some(estado) = filter.estado {
            query = query.filter(entity::causa::Column::Estado.eq(estado.as_str()));
        }
        if let Some(cartera_id) = filter.cartera_id {
            query = query.filter(entity::causa::Column::CarteraId.eq(cartera_id));
        }

        let rows = query
            .order_by_desc(entity::causa::Column::Id)
            .all(&*self.db)
            .await?;

        rows.into_iter()
            .map(|(causa, deudor)| -> StorageResult<(Causa, Deudor)> {
                let deudor = deudor.ok_or_else(|| {
                    anyhow::anyhow!("causa {} references missing deudor {}", causa.id, causa.deudor_id)
                })?;
                Ok((causa.try_into()?, deudor.into()))
            })
            .collect()
    }

    async fn delete_cascade(&self, id: Id) -> StorageResult<Option<Vec<String>>> {
        let txn = self.db.begin().await?;

        if entity::causa::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Ok(None);
        }

        let eventos = evento_ids(&txn, id).await?;

        let paths = entity::archivo_adjunto::Entity::find()
            .select_only()
            .column(entity::archivo_adjunto::Column::Archivo)
            .filter(adjuntos_of(id, eventos.clone()))
            .into_tuple::<String>()
            .all(&txn)
            .await?;

        entity::archivo_adjunto::Entity::delete_many()
            .filter(adjuntos_of(id, eventos))
            .exec(&txn)
            .await?;
        entity::etapa_causa::Entity::delete_many()
            .filter(entity::etapa_causa::Column::CausaId.eq(id))
            .exec(&txn)
            .await?;
        entity::comentario::Entity::delete_many()
            .filter(entity::comentario::Column::CausaId.eq(id))
            .exec(&txn)
            .await?;
        entity::antecedentes_leasing::Entity::delete_by_id(id)
            .exec(&txn)
            .await?;
        entity::antecedentes_cbr::Entity::delete_by_id(id)
            .exec(&txn)
            .await?;
        entity::causa::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(Some(paths))
    }

    async fn dashboard(&self) -> StorageResult<Dashboard> {
        let txn = self.db.begin().await?;

        let total = entity::causa::Entity::find().count(&txn).await?;
        let grouped = entity::causa::Entity::find()
            .select_only()
            .column(entity::causa::Column::Estado)
            .column_as(Expr::col(entity::causa::Column::Id).count(), "n")
            .group_by(entity::causa::Column::Estado)
            .into_tuple::<(String, i64)>()
            .all(&txn)
            .await?;

        txn.commit().await?;

        let por_estado = tally_por_estado(grouped)?;

        Ok(Dashboard { total, por_estado })
    }

    async fn upsert_leasing(
        &self,
        leasing: &AntecedentesLeasing,
    ) -> StorageResult<AntecedentesLeasing> {
        let txn = self.db.begin().await?;
        let exists = entity::antecedentes_leasing::Entity::find_by_id(leasing.causa_id)
            .one(&txn)
            .await?
            .is_some();

        let active: entity::antecedentes_leasing::ActiveModel = leasing.into();
        let stored = if exists {
            active.update(&txn).await?
        } else {
            active.insert(&txn).await?
        };

        txn.commit().await?;
        Ok(stored.into())
    }

    async fn find_leasing(&self, causa_id: Id) -> StorageResult<Option<AntecedentesLeasing>> {
        let result = entity::antecedentes_leasing::Entity::find_by_id(causa_id)
            .one(&*self.db)
            .await?;
        Ok(result.map(Into::into))
    }

    async fn upsert_cbr(&self, cbr: &AntecedentesCbr) -> StorageResult<AntecedentesCbr> {
        let txn = self.db.begin().await?;
        let exists = entity::antecedentes_cbr::Entity::find_by_id(cbr.causa_id)
            .one(&txn)
            .await?
            .is_some();

        let active: entity::antecedentes_cbr::ActiveModel = cbr.into();
        let stored = if exists {
            active.update(&txn).await?
        } else {
            active.insert(&txn).await?
        };

        txn.commit().await?;
        Ok(stored.into())
    }

    async fn find_cbr(&self, causa_id: Id) -> StorageResult<Option<AntecedentesCbr>> {
        let result = entity::antecedentes_cbr::Entity::find_by_id(causa_id)
            .one(&*self.db)
            .await?;
        Ok(result.map(Into::into))
    }
}

// ===== Historial Repository =====

pub struct SeaOrmHistorialRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmHistorialRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl HistorialRepository for SeaOrmHistorialRepository {
    async fn create_etapa_causa(
        &self,
        causa_id: Id,
        etapa_id: Id,
        fecha: NaiveDate,
        descripcion: &str,
        costas: i64,
    ) -> StorageResult<EtapaCausa> {
        let active = entity::etapa_causa::ActiveModel {
            id: NotSet,
            causa_id: Set(causa_id),
            etapa_id: Set(etapa_id),
            fecha: Set(fecha),
            descripcion: Set(descripcion.to_string()),
            costas: Set(costas),
        };
        let txn = self.db.begin().await?;
        let created = active.insert(&txn).await?;
        let etapa = entity::etapa::Entity::find_by_id(etapa_id).one(&txn).await?;
        txn.commit().await?;

        Ok(etapa_causa_from(created, etapa)?)
    }

    async fn find_etapa_causa(&self, id: Id) -> StorageResult<Option<EtapaCausa>> {
        let result = entity::etapa_causa::Entity::find_by_id(id)
            .find_also_related(entity::etapa::Entity)
            .one(&*self.db)
            .await?;

        match result {
            Some((evento, etapa)) => Ok(Some(etapa_causa_from(evento, etapa)?)),
            None => Ok(None),
        }
    }

    async fn list_for_causa(&self, causa_id: Id) -> StorageResult<Vec<EtapaCausa>> {
        let rows = entity::etapa_causa::Entity::find()
            .find_also_related(entity::etapa::Entity)
            .filter(entity::etapa_causa::Column::CausaId.eq(causa_id))
            .order_by_desc(entity::etapa_causa::Column::Fecha)
            .order_by_desc(entity::etapa_causa::Column::Id)
            .all(&*self.db)
            .await?;

        let historial = rows
            .into_iter()
            .map(|(evento, etapa)| etapa_causa_from(evento, etapa))
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(historial)
    }

    async fn latest_for_causa(&self, causa_id: Id) -> StorageResult<Option<EtapaCausa>> {
        let result = entity::etapa_causa::Entity::find()
            .find_also_related(entity::etapa::Entity)
            .filter(entity::etapa_causa::Column::CausaId.eq(causa_id))
            .order_by_desc(entity::etapa_causa::Column::Fecha)
            .order_by_desc(entity::etapa_causa::Column::Id)
            .one(&*self.db)
            .await?;

        match result {
            Some((evento, etapa)) => Ok(Some(etapa_causa_from(evento, etapa)?)),
            None => Ok(None),
        }
    }

    async fn latest_for_causas(&self, causa_ids: &[Id]) -> StorageResult<HashMap<Id, EtapaCausa>> {
        if causa_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = entity::etapa_causa::Entity::find()
            .find_also_related(entity::etapa::Entity)
            .filter(entity::etapa_causa::Column::CausaId.is_in(causa_ids.iter().copied()))
            .order_by_asc(entity::etapa_causa::Column::CausaId)
            .order_by_desc(entity::etapa_causa::Column::Fecha)
            .order_by_desc(entity::etapa_causa::Column::Id)
            .all(&*self.db)
            .await?;

        let mut latest = HashMap::with_capacity(causa_ids.len());
        for (evento, etapa) in rows {
            if latest.contains_key(&evento.causa_id) {
                continue;
            }
            latest.insert(evento.causa_id, etapa_causa_from(evento, etapa)?);
        }
        Ok(latest)
    }

    async fn create_adjunto(&self, adjunto: &ArchivoAdjunto) -> StorageResult<ArchivoAdjunto> {
        let active: entity::archivo_adjunto::ActiveModel = adjunto.into();
        Ok(active.insert(&*self.db).await?.into())
    }

    async fn list_adjuntos(&self, causa_id: Id) -> StorageResult<Vec<ArchivoAdjunto>> {
        let txn = self.db.begin().await?;
        let eventos = evento_ids(&txn, causa_id).await?;
        let results = entity::archivo_adjunto::Entity::find()
            .filter(adjuntos_of(causa_id, eventos))
            .order_by_desc(entity::archivo_adjunto::Column::FechaSubida)
            .order_by_desc(entity::archivo_adjunto::Column::Id)
            .all(&txn)
            .await?;
        txn.commit().await?;

        Ok(results.into_iter().map(Into::into).collect())
    }

    async fn create_comentario(
        &self,
        causa_id: Id,
        autor_id: Id,
        texto: &str,
        now: DateTime<Utc>,
    ) -> StorageResult<Comentario> {
        let active = entity::comentario::ActiveModel {
            id: NotSet,
            causa_id: Set(causa_id),
            autor_id: Set(autor_id),
            texto: Set(texto.to_string()),
            fecha_creacion: Set(now),
        };
        let txn = self.db.begin().await?;
        let created = active.insert(&txn).await?;
        let autor = entity::usuario::Entity::find_by_id(autor_id).one(&txn).await?;
        txn.commit().await?;

        Ok(comentario_from(created, autor)?)
    }

    async fn list_comentarios(&self, causa_id: Id) -> StorageResult<Vec<Comentario>> {
        let rows = entity::comentario::Entity::find()
            .find_also_related(entity::usuario::Entity)
            .filter(entity::comentario::Column::CausaId.eq(causa_id))
            .order_by_desc(entity::comentario::Column::FechaCreacion)
            .order_by_desc(entity::comentario::Column::Id)
            .all(&*self.db)
            .await?;

        let comentarios = rows
            .into_iter()
            .map(|(comentario, autor)| comentario_from(comentario, autor))
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(comentarios)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_tally_por_estado_fills_missing_estados() {
        let tally = tally_por_estado(vec![("ACTIVO".into(), 2), ("ARCHIVADO".into(), 1)]).unwrap();
        assert_eq!(tally.len(), EstadoCausa::ALL.len());
        assert_eq!(tally[0], (EstadoCausa::ALL[0], 2));
        assert!(tally.contains(&(EstadoCausa::Archivado, 1)));
        assert!(tally.contains(&(EstadoCausa::Recuperado, 0)));
    }

    #[test]
    fn test_tally_por_estado_rejects_bad_rows() {
        assert!(tally_por_estado(vec![("ACTIVO".into(), -1)]).is_err());
        assert!(tally_por_estado(vec![("CERRADO".into(), 1)]).is_err());
    }
}
