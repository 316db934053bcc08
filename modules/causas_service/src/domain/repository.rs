//! Repository traits for data access
//!
//! These traits define the interface for data access operations.
//! Implementations are in infra/storage/repositories.rs

use crate::contract::*;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Storage failures the domain distinguishes
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A unique index rejected the write
    #[error("unique constraint violated: {0}")]
    Duplicate(String),

    /// A foreign key rejected the write or delete
    #[error("foreign key constraint violated: {0}")]
    Referenced(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Lookup tables and users
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn create_usuario(&self, username: &str, nombre: &str) -> StorageResult<Usuario>;
    async fn find_usuario(&self, id: Id) -> StorageResult<Option<Usuario>>;
    async fn list_usuarios(&self) -> StorageResult<Vec<Usuario>>;
    /// Nulls case assignments and removes authored comments in the same transaction
    async fn delete_usuario(&self, id: Id) -> StorageResult<bool>;

    async fn create_tribunal(&self, nombre: &str) -> StorageResult<Tribunal>;
    async fn find_tribunal(&self, id: Id) -> StorageResult<Option<Tribunal>>;
    async fn list_tribunales(&self) -> StorageResult<Vec<Tribunal>>;
    /// Nulls the tribunal reference on cases in the same transaction
    async fn delete_tribunal(&self, id: Id) -> StorageResult<bool>;

    async fn create_cartera(&self, nombre: &str) -> StorageResult<Cartera>;
    async fn find_cartera(&self, id: Id) -> StorageResult<Option<Cartera>>;
    async fn list_carteras(&self) -> StorageResult<Vec<Cartera>>;
    /// Nulls the cartera reference on cases in the same transaction
    async fn delete_cartera(&self, id: Id) -> StorageResult<bool>;

    async fn create_tipo_etapa(&self, nombre: &str) -> StorageResult<TipoEtapa>;
    async fn find_tipo_etapa(&self, id: Id) -> StorageResult<Option<TipoEtapa>>;
    async fn list_tipos_etapa(&self) -> StorageResult<Vec<TipoEtapa>>;
    /// Refuses with [`StorageError::Referenced`] while stages belong to the type
    async fn delete_tipo_etapa(&self, id: Id) -> StorageResult<bool>;

    async fn create_etapa(&self, nombre: &str, tipo_etapa_id: Id) -> StorageResult<Etapa>;
    async fn find_etapa(&self, id: Id) -> StorageResult<Option<Etapa>>;
    async fn list_etapas(&self) -> StorageResult<Vec<Etapa>>;
    /// Refuses with [`StorageError::Referenced`] while history events use the stage
    async fn delete_etapa(&self, id: Id) -> StorageResult<bool>;
}

/// Debtors
#[async_trait]
pub trait DeudorRepository: Send + Sync {
    async fn create(&self, deudor: &NewDeudor) -> StorageResult<Deudor>;
    async fn find(&self, id: Id) -> StorageResult<Option<Deudor>>;
    async fn find_by_rut(&self, rut: &str) -> StorageResult<Option<Deudor>>;
    async fn list(&self) -> StorageResult<Vec<Deudor>>;
    /// Refuses with [`StorageError::Referenced`] while cases point at the debtor
    async fn delete(&self, id: Id) -> StorageResult<bool>;
}

/// Cases and their one-to-one addenda
#[async_trait]
pub trait CausaRepository: Send + Sync {
    async fn create(&self, fields: &CausaFields, now: DateTime<Utc>) -> StorageResult<Causa>;
    /// `None` when the case does not exist
    async fn update(
        &self,
        id: Id,
        fields: &CausaFields,
        now: DateTime<Utc>,
    ) -> StorageResult<Option<Causa>>;
    async fn find(&self, id: Id) -> StorageResult<Option<Causa>>;
    /// Whether another case already uses the rol
    async fn rol_taken(&self, rol: &str, excluding: Option<Id>) -> StorageResult<bool>;
    /// Cases with their debtor, newest id first
    async fn list(&self, filter: CausaFilter) -> StorageResult<Vec<(Causa, Deudor)>>;
    /// Deletes the case with its history, attachments, comments and addenda in one
    /// transaction. Returns the media paths of the removed attachments, or `None`
    /// when the case does not exist.
    async fn delete_cascade(&self, id: Id) -> StorageResult<Option<Vec<String>>>;
    async fn dashboard(&self) -> StorageResult<Dashboard>;

    async fn upsert_leasing(&self, leasing: &AntecedentesLeasing)
        -> StorageResult<AntecedentesLeasing>;
    async fn find_leasing(&self, causa_id: Id) -> StorageResult<Option<AntecedentesLeasing>>;
    async fn upsert_cbr(&self, cbr: &AntecedentesCbr) -> StorageResult<AntecedentesCbr>;
    async fn find_cbr(&self, causa_id: Id) -> StorageResult<Option<AntecedentesCbr>>;
}

/// Stage history, attachments and comments
#[async_trait]
pub trait HistorialRepository: Send + Sync {
    async fn create_etapa_causa(
        &self,
        causa_id: Id,
        etapa_id: Id,
        fecha: chrono::NaiveDate,
        descripcion: &str,
        costas: i64,
    ) -> StorageResult<EtapaCausa>;
    async fn find_etapa_causa(&self, id: Id) -> StorageResult<Option<EtapaCausa>>;
    /// Newest date first, ties broken by id descending
    async fn list_for_causa(&self, causa_id: Id) -> StorageResult<Vec<EtapaCausa>>;
    /// First row of [`HistorialRepository::list_for_causa`]
    async fn latest_for_causa(&self, causa_id: Id) -> StorageResult<Option<EtapaCausa>>;
    /// Latest event of each listed case in one round trip; cases without history are absent
    async fn latest_for_causas(&self, causa_ids: &[Id]) -> StorageResult<HashMap<Id, EtapaCausa>>;

    async fn create_adjunto(&self, adjunto: &ArchivoAdjunto) -> StorageResult<ArchivoAdjunto>;
    /// Case-level and event-level attachments, newest first
    async fn list_adjuntos(&self, causa_id: Id) -> StorageResult<Vec<ArchivoAdjunto>>;

    async fn create_comentario(
        &self,
        causa_id: Id,
        autor_id: Id,
        texto: &str,
        now: DateTime<Utc>,
    ) -> StorageResult<Comentario>;
    /// Newest first
    async fn list_comentarios(&self, causa_id: Id) -> StorageResult<Vec<Comentario>>;
}

/// Storage for uploaded files
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Persist the upload and return its path relative to the media root
    async fn save(&self, upload: &Upload, now: DateTime<Utc>) -> anyhow::Result<String>;

    /// Remove a stored file; missing files are not an error
    async fn remove(&self, path: &str) -> anyhow::Result<()>;
}
