//! Domain service - business logic orchestration

use super::repository::{
    CatalogRepository, CausaRepository, DeudorRepository, HistorialRepository, MediaStore,
    StorageError,
};
use super::validation;
use crate::contract::error::FieldErrors;
use crate::contract::*;
use std::sync::Arc;

const INVALID_CHOICE: &str = "Escoja una opción válida. Esa opción no está entre las disponibles.";

/// Default upload ceiling when none is configured
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Domain service for case management
pub struct Service {
    catalog: Arc<dyn CatalogRepository>,
    deudores: Arc<dyn DeudorRepository>,
    causas: Arc<dyn CausaRepository>,
    historial: Arc<dyn HistorialRepository>,
    media: Arc<dyn MediaStore>,
    max_upload_bytes: usize,
}

/// Map storage failures that the call site did not handle itself
fn storage_error(err: StorageError) -> CausasError {
    match err {
        StorageError::Duplicate(reason) | StorageError::Referenced(reason) => {
            CausasError::Conflict { reason }
        }
        StorageError::Other(err) => {
            tracing::error!(error = ?err, "storage failure");
            CausasError::Internal
        }
    }
}

fn invalid(errors: FieldErrors) -> CausasError {
    CausasError::Validation { errors }
}

impl Service {
    /// Create a new service instance
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        deudores: Arc<dyn DeudorRepository>,
        causas: Arc<dyn CausaRepository>,
        historial: Arc<dyn HistorialRepository>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            catalog,
            deudores,
            causas,
            historial,
            media,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    // ===== Catalog Operations =====

    pub async fn create_usuario(&self, username: &str, nombre: &str) -> Result<Usuario, CausasError> {
        let mut errors = FieldErrors::new();
        validation::check_text(&mut errors, "username", username, true, 150);
        validation::check_text(&mut errors, "nombre", nombre, false, validation::NOMBRE_MAX);
        errors.into_result()?;

        match self.catalog.create_usuario(username.trim(), nombre.trim()).await {
            Ok(usuario) => Ok(usuario),
            Err(StorageError::Duplicate(_)) => Err(CausasError::field(
                "username",
                "Ya existe un usuario con este nombre.",
            )),
            Err(err) => Err(storage_error(err)),
        }
    }

    pub async fn list_usuarios(&self) -> Result<Vec<Usuario>, CausasError> {
        self.catalog.list_usuarios().await.map_err(storage_error)
    }

    /// Delete a user; their case assignments are cleared and their comments removed
    pub async fn delete_usuario(&self, id: Id) -> Result<(), CausasError> {
        if !self.catalog.delete_usuario(id).await.map_err(storage_error)? {
            return Err(CausasError::not_found("usuario", id));
        }
        tracing::info!(usuario_id = id, "usuario deleted");
        Ok(())
    }

    pub async fn create_tribunal(&self, nombre: &str) -> Result<Tribunal, CausasError> {
        let nombre = Self::validate_nombre(nombre)?;
        self.catalog
            .create_tribunal(&nombre)
            .await
            .map_err(|err| Self::duplicate_nombre(err, "Tribunal"))
    }

    pub async fn list_tribunales(&self) -> Result<Vec<Tribunal>, CausasError> {
        self.catalog.list_tribunales().await.map_err(storage_error)
    }

    /// Delete a court; cases that pointed to it keep existing without a court
    pub async fn delete_tribunal(&self, id: Id) -> Result<(), CausasError> {
        if !self.catalog.delete_tribunal(id).await.map_err(storage_error)? {
            return Err(CausasError::not_found("tribunal", id));
        }
        tracing::info!(tribunal_id = id, "tribunal deleted");
        Ok(())
    }

    pub async fn create_cartera(&self, nombre: &str) -> Result<Cartera, CausasError> {
        let nombre = Self::validate_nombre(nombre)?;
        self.catalog
            .create_cartera(&nombre)
            .await
            .map_err(|err| Self::duplicate_nombre(err, "Cartera"))
    }

    pub async fn get_cartera(&self, id: Id) -> Result<Cartera, CausasError> {
        self.catalog
            .find_cartera(id)
            .await
            .map_err(storage_error)?
            .ok_or_else(|| CausasError::not_found("cartera", id))
    }

    pub async fn list_carteras(&self) -> Result<Vec<Cartera>, CausasError> {
        self.catalog.list_carteras().await.map_err(storage_error)
    }

    /// Delete a portfolio; cases that pointed to it keep existing without one
    pub async fn delete_cartera(&self, id: Id) -> Result<(), CausasError> {
        if !self.catalog.delete_cartera(id).await.map_err(storage_error)? {
            return Err(CausasError::not_found("cartera", id));
        }
        tracing::info!(cartera_id = id, "cartera deleted");
        Ok(())
    }

    pub async fn create_tipo_etapa(&self, nombre: &str) -> Result<TipoEtapa, CausasError> {
        let nombre = Self::validate_nombre(nombre)?;
        self.catalog
            .create_tipo_etapa(&nombre)
            .await
            .map_err(|err| Self::duplicate_nombre(err, "Tipo de etapa"))
    }

    pub async fn list_tipos_etapa(&self) -> Result<Vec<TipoEtapa>, CausasError> {
        self.catalog.list_tipos_etapa().await.map_err(storage_error)
    }

    pub async fn delete_tipo_etapa(&self, id: Id) -> Result<(), CausasError> {
        match self.catalog.delete_tipo_etapa(id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(CausasError::not_found("tipo_etapa", id)),
            Err(StorageError::Referenced(_)) => {
                Err(CausasError::protected("tipo_etapa", id, "etapa"))
            }
            Err(err) => Err(storage_error(err)),
        }
    }

    pub async fn create_etapa(&self, nombre: &str, tipo_etapa_id: Id) -> Result<Etapa, CausasError> {
        let nombre = Self::validate_nombre(nombre)?;
        if self
            .catalog
            .find_tipo_etapa(tipo_etapa_id)
            .await
            .map_err(storage_error)?
            .is_none()
        {
            return Err(CausasError::field("tipo_etapa", INVALID_CHOICE));
        }
        self.catalog
            .create_etapa(&nombre, tipo_etapa_id)
            .await
            .map_err(|err| Self::duplicate_nombre(err, "Etapa"))
    }

    pub async fn list_etapas(&self) -> Result<Vec<Etapa>, CausasError> {
        self.catalog.list_etapas().await.map_err(storage_error)
    }

    /// Delete a stage; rejected while any history event is classified under it
    pub async fn delete_etapa(&self, id: Id) -> Result<(), CausasError> {
        match self.catalog.delete_etapa(id).await {
            Ok(true) => {
                tracing::info!(etapa_id = id, "etapa deleted");
                Ok(())
            }
            Ok(false) => Err(CausasError::not_found("etapa", id)),
            Err(StorageError::Referenced(_)) => {
                tracing::warn!(etapa_id = id, "refusing to delete etapa referenced by history");
                Err(CausasError::protected("etapa", id, "etapa_causa"))
            }
            Err(err) => Err(storage_error(err)),
        }
    }

    // ===== Debtor Operations =====

    pub async fn create_deudor(&self, deudor: NewDeudor) -> Result<Deudor, CausasError> {
        let deudor = validation::validate_deudor(&deudor).map_err(invalid)?;

        if self
            .deudores
            .find_by_rut(&deudor.rut)
            .await
            .map_err(storage_error)?
            .is_some()
        {
            return Err(Self::duplicate_rut());
        }

        match self.deudores.create(&deudor).await {
            Ok(created) => Ok(created),
            Err(StorageError::Duplicate(_)) => Err(Self::duplicate_rut()),
            Err(err) => Err(storage_error(err)),
        }
    }

    pub async fn get_deudor(&self, id: Id) -> Result<Deudor, CausasError> {
        self.deudores
            .find(id)
            .await
            .map_err(storage_error)?
            .ok_or_else(|| CausasError::not_found("deudor", id))
    }

    pub async fn list_deudores(&self) -> Result<Vec<Deudor>, CausasError> {
        self.deudores.list().await.map_err(storage_error)
    }

    /// Delete a debtor; rejected while cases reference it
    pub async fn delete_deudor(&self, id: Id) -> Result<(), CausasError> {
        match self.deudores.delete(id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(CausasError::not_found("deudor", id)),
            Err(StorageError::Referenced(_)) => Err(CausasError::protected("deudor", id, "causa")),
            Err(err) => Err(storage_error(err)),
        }
    }

    // ===== Case Operations =====

    /// Create a case after validating its fields and associations
    pub async fn create_causa(&self, fields: CausaFields) -> Result<Causa, CausasError> {
        let fields = validation::validate_causa(&fields).map_err(invalid)?;
        self.validate_causa_refs(&fields, None).await?;

        let causa = match self.causas.create(&fields, chrono::Utc::now()).await {
            Ok(causa) => causa,
            Err(StorageError::Duplicate(_)) => return Err(Self::duplicate_rol()),
            Err(err) => return Err(storage_error(err)),
        };

        tracing::info!(causa_id = causa.id, rol = %causa.rol, "causa created");
        Ok(causa)
    }

    /// Replace the editable fields of a case, refreshing its modification time
    pub async fn update_causa(&self, id: Id, fields: CausaFields) -> Result<Causa, CausasError> {
        self.get_causa(id).await?;
        let fields = validation::validate_causa(&fields).map_err(invalid)?;
        self.validate_causa_refs(&fields, Some(id)).await?;

        let updated = match self.causas.update(id, &fields, chrono::Utc::now()).await {
            Ok(updated) => updated,
            Err(StorageError::Duplicate(_)) => return Err(Self::duplicate_rol()),
            Err(err) => return Err(storage_error(err)),
        };

        let causa = updated.ok_or_else(|| CausasError::not_found("causa", id))?;
        tracing::info!(causa_id = id, "causa updated");
        Ok(causa)
    }

    pub async fn get_causa(&self, id: Id) -> Result<Causa, CausasError> {
        self.causas
            .find(id)
            .await
            .map_err(storage_error)?
            .ok_or_else(|| CausasError::not_found("causa", id))
    }

    /// Delete a case with its history, attachments, comments and addenda; the debtor stays
    pub async fn delete_causa(&self, id: Id) -> Result<(), CausasError> {
        let removed = self
            .causas
            .delete_cascade(id)
            .await
            .map_err(storage_error)?
            .ok_or_else(|| CausasError::not_found("causa", id))?;

        for path in &removed {
            if let Err(err) = self.media.remove(path).await {
                tracing::warn!(causa_id = id, path = %path, error = ?err, "failed to remove attachment file");
            }
        }

        tracing::info!(causa_id = id, adjuntos = removed.len(), "causa deleted");
        Ok(())
    }

    /// List cases, newest id first, each with its current stage
    pub async fn list_causas(&self, filter: CausaFilter) -> Result<Vec<CausaResumen>, CausasError> {
        if let Some(cartera_id) = filter.cartera_id {
            self.get_cartera(cartera_id).await?;
        }

        let rows = self.causas.list(filter).await.map_err(storage_error)?;
        let ids: Vec<Id> = rows.iter().map(|(causa, _)| causa.id).collect();
        let mut latest = self
            .historial
            .latest_for_causas(&ids)
            .await
            .map_err(storage_error)?;

        Ok(rows
            .into_iter()
            .map(|(causa, deudor)| {
                let etapa_actual = latest.remove(&causa.id).into();
                CausaResumen {
                    causa,
                    deudor,
                    etapa_actual,
                }
            })
            .collect())
    }

    /// Stage name of the most recent history event, or the "no stage" sentinel
    pub async fn etapa_actual(&self, causa_id: Id) -> Result<EtapaActual, CausasError> {
        self.get_causa(causa_id).await?;
        let latest = self
            .historial
            .latest_for_causa(causa_id)
            .await
            .map_err(storage_error)?;
        Ok(latest.into())
    }

    /// Everything shown on the case detail page
    pub async fn detalle_causa(&self, id: Id) -> Result<CausaDetalle, CausasError> {
        let causa = self.get_causa(id).await?;
        let deudor = self.get_deudor(causa.deudor_id).await?;

        let tribunal = match causa.tribunal_id {
            Some(tid) => self.catalog.find_tribunal(tid).await.map_err(storage_error)?,
            None => None,
        };
        let cartera = match causa.cartera_id {
            Some(cid) => self.catalog.find_cartera(cid).await.map_err(storage_error)?,
            None => None,
        };
        let abogado_encargado = match causa.abogado_encargado_id {
            Some(uid) => self.catalog.find_usuario(uid).await.map_err(storage_error)?,
            None => None,
        };

        let historial = self.historial.list_for_causa(id).await.map_err(storage_error)?;
        let etapa_actual: EtapaActual = historial.first().cloned().into();
        let comentarios = self.historial.list_comentarios(id).await.map_err(storage_error)?;
        let adjuntos = self.historial.list_adjuntos(id).await.map_err(storage_error)?;
        let antecedentes_leasing = self.causas.find_leasing(id).await.map_err(storage_error)?;
        let antecedentes_cbr = self.causas.find_cbr(id).await.map_err(storage_error)?;

        Ok(CausaDetalle {
            causa,
            deudor,
            tribunal,
            cartera,
            abogado_encargado,
            etapa_actual,
            historial,
            comentarios,
            adjuntos,
            antecedentes_leasing,
            antecedentes_cbr,
        })
    }

    pub async fn save_antecedentes_leasing(
        &self,
        leasing: AntecedentesLeasing,
    ) -> Result<AntecedentesLeasing, CausasError> {
        self.get_causa(leasing.causa_id).await?;
        validation::validate_leasing(&leasing).map_err(invalid)?;
        self.causas.upsert_leasing(&leasing).await.map_err(storage_error)
    }

    pub async fn get_antecedentes_leasing(
        &self,
        causa_id: Id,
    ) -> Result<Option<AntecedentesLeasing>, CausasError> {
        self.get_causa(causa_id).await?;
        self.causas.find_leasing(causa_id).await.map_err(storage_error)
    }

    pub async fn save_antecedentes_cbr(
        &self,
        cbr: AntecedentesCbr,
    ) -> Result<AntecedentesCbr, CausasError> {
        self.get_causa(cbr.causa_id).await?;
        validation::validate_cbr(&cbr).map_err(invalid)?;
        self.causas.upsert_cbr(&cbr).await.map_err(storage_error)
    }

    pub async fn get_antecedentes_cbr(
        &self,
        causa_id: Id,
    ) -> Result<Option<AntecedentesCbr>, CausasError> {
        self.get_causa(causa_id).await?;
        self.causas.find_cbr(causa_id).await.map_err(storage_error)
    }

    // ===== History Operations =====

    /// Append a stage event; the stage must exist
    pub async fn create_etapa_causa(
        &self,
        causa_id: Id,
        evento: NewEtapaCausa,
    ) -> Result<EtapaCausa, CausasError> {
        self.get_causa(causa_id).await?;
        let (etapa_id, fecha) = validation::validate_etapa_causa(&evento).map_err(invalid)?;

        if self
            .catalog
            .find_etapa(etapa_id)
            .await
            .map_err(storage_error)?
            .is_none()
        {
            return Err(CausasError::field("etapa", INVALID_CHOICE));
        }

        let created = self
            .historial
            .create_etapa_causa(causa_id, etapa_id, fecha, evento.descripcion.trim(), evento.costas)
            .await
            .map_err(storage_error)?;

        tracing::info!(causa_id, etapa_id, evento_id = created.id, "etapa registered");
        Ok(created)
    }

    pub async fn list_historial(&self, causa_id: Id) -> Result<Vec<EtapaCausa>, CausasError> {
        self.get_causa(causa_id).await?;
        self.historial
            .list_for_causa(causa_id)
            .await
            .map_err(storage_error)
    }

    /// Add a comment authored by the principal
    pub async fn create_comentario(
        &self,
        principal: &Principal,
        causa_id: Id,
        texto: &str,
    ) -> Result<Comentario, CausasError> {
        self.get_causa(causa_id).await?;
        let texto = validation::validate_comentario(texto).map_err(invalid)?;

        if self
            .catalog
            .find_usuario(principal.usuario_id)
            .await
            .map_err(storage_error)?
            .is_none()
        {
            return Err(CausasError::Unauthenticated);
        }

        self.historial
            .create_comentario(causa_id, principal.usuario_id, &texto, chrono::Utc::now())
            .await
            .map_err(storage_error)
    }

    pub async fn list_comentarios(&self, causa_id: Id) -> Result<Vec<Comentario>, CausasError> {
        self.get_causa(causa_id).await?;
        self.historial
            .list_comentarios(causa_id)
            .await
            .map_err(storage_error)
    }

    /// Store an uploaded file and record it against the case (and optionally one event)
    pub async fn create_adjunto(
        &self,
        causa_id: Id,
        adjunto: NewAdjunto,
    ) -> Result<ArchivoAdjunto, CausasError> {
        self.get_causa(causa_id).await?;
        validation::validate_adjunto(&adjunto, self.max_upload_bytes).map_err(invalid)?;

        if let Some(evento_id) = adjunto.etapa_causa_id {
            let evento = self
                .historial
                .find_etapa_causa(evento_id)
                .await
                .map_err(storage_error)?;
            if evento.map(|e| e.causa_id) != Some(causa_id) {
                return Err(CausasError::field("etapa_causa", INVALID_CHOICE));
            }
        }

        let NewAdjunto {
            etapa_causa_id,
            descripcion,
            archivo,
        } = adjunto;
        let upload = archivo.ok_or_else(|| CausasError::field("archivo", crate::contract::error::REQUIRED))?;

        let now = chrono::Utc::now();
        let path = self.media.save(&upload, now).await.map_err(|err| {
            tracing::error!(causa_id, error = ?err, "failed to store attachment");
            CausasError::Internal
        })?;

        let record = ArchivoAdjunto {
            id: 0,
            causa_id: Some(causa_id),
            etapa_causa_id,
            archivo: path.clone(),
            nombre_original: upload.nombre.clone(),
            descripcion: descripcion.trim().to_string(),
            fecha_subida: now,
        };

        match self.historial.create_adjunto(&record).await {
            Ok(stored) => {
                tracing::info!(causa_id, adjunto_id = stored.id, path = %stored.archivo, "adjunto stored");
                Ok(stored)
            }
            Err(err) => {
                if let Err(cleanup) = self.media.remove(&path).await {
                    tracing::warn!(path = %path, error = ?cleanup, "failed to remove orphaned upload");
                }
                Err(storage_error(err))
            }
        }
    }

    pub async fn list_adjuntos(&self, causa_id: Id) -> Result<Vec<ArchivoAdjunto>, CausasError> {
        self.get_causa(causa_id).await?;
        self.historial
            .list_adjuntos(causa_id)
            .await
            .map_err(storage_error)
    }

    // ===== Read Projections =====

    /// Total and per-status case counts from one read transaction
    pub async fn dashboard(&self) -> Result<Dashboard, CausasError> {
        self.causas.dashboard().await.map_err(storage_error)
    }

    // ===== Helper Methods =====

    fn validate_nombre(nombre: &str) -> Result<String, CausasError> {
        let mut errors = FieldErrors::new();
        validation::check_text(&mut errors, "nombre", nombre, true, validation::NOMBRE_MAX);
        errors.into_result()?;
        Ok(nombre.trim().to_string())
    }

    fn duplicate_nombre(err: StorageError, what: &str) -> CausasError {
        match err {
            StorageError::Duplicate(_) => {
                CausasError::field("nombre", format!("{} con este Nombre ya existe.", what))
            }
            other => storage_error(other),
        }
    }

    fn duplicate_rol() -> CausasError {
        CausasError::field("rol", "Causa con este Rol ya existe.")
    }

    fn duplicate_rut() -> CausasError {
        CausasError::field("rut", "Deudor con este Rut ya existe.")
    }

    /// Rol uniqueness and existence of every referenced record
    async fn validate_causa_refs(
        &self,
        fields: &CausaFields,
        excluding: Option<Id>,
    ) -> Result<(), CausasError> {
        let mut errors = FieldErrors::new();

        if self
            .causas
            .rol_taken(&fields.rol, excluding)
            .await
            .map_err(storage_error)?
        {
            errors.add("rol", "Causa con este Rol ya existe.");
        }

        if self
            .deudores
            .find(fields.deudor_id)
            .await
            .map_err(storage_error)?
            .is_none()
        {
            errors.add("deudor", INVALID_CHOICE);
        }

        if let Some(tid) = fields.tribunal_id {
            if self.catalog.find_tribunal(tid).await.map_err(storage_error)?.is_none() {
                errors.add("tribunal", INVALID_CHOICE);
            }
        }

        if let Some(cid) = fields.cartera_id {
            if self.catalog.find_cartera(cid).await.map_err(storage_error)?.is_none() {
                errors.add("cartera", INVALID_CHOICE);
            }
        }

        if let Some(uid) = fields.abogado_encargado_id {
            if self.catalog.find_usuario(uid).await.map_err(storage_error)?.is_none() {
                errors.add("abogado_encargado", INVALID_CHOICE);
            }
        }

        errors.into_result()
    }
}
