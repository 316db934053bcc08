//! Native client trait for inter-module communication
//!
//! This trait defines the API that other modules use to interact with the causas service.
//! NO HTTP - direct function calls for performance.

use super::error::CausasError;
use super::model::*;
use async_trait::async_trait;

/// Causas service API for inter-module communication
#[async_trait]
pub trait CausasApi: Send + Sync {
    // ===== Case Operations =====

    /// Create a case
    async fn create_causa(&self, fields: CausaFields) -> Result<Causa, CausasError>;

    /// Replace the editable fields of a case
    async fn update_causa(&self, id: Id, fields: CausaFields) -> Result<Causa, CausasError>;

    /// Get a case by id
    async fn get_causa(&self, id: Id) -> Result<Causa, CausasError>;

    /// Delete a case and everything it owns
    async fn delete_causa(&self, id: Id) -> Result<(), CausasError>;

    /// List cases, newest id first
    async fn list_causas(&self, filter: CausaFilter) -> Result<Vec<CausaResumen>, CausasError>;

    /// Current stage of a case
    async fn etapa_actual(&self, causa_id: Id) -> Result<EtapaActual, CausasError>;

    // ===== History Operations =====

    /// Append a stage event to a case history
    async fn create_etapa_causa(
        &self,
        causa_id: Id,
        evento: NewEtapaCausa,
    ) -> Result<EtapaCausa, CausasError>;

    /// Case history, newest date first
    async fn list_historial(&self, causa_id: Id) -> Result<Vec<EtapaCausa>, CausasError>;

    /// Add a comment authored by the principal
    async fn create_comentario(
        &self,
        principal: &Principal,
        causa_id: Id,
        texto: &str,
    ) -> Result<Comentario, CausasError>;

    /// Store an uploaded file for a case
    async fn create_adjunto(
        &self,
        causa_id: Id,
        adjunto: NewAdjunto,
    ) -> Result<ArchivoAdjunto, CausasError>;

    // ===== Read Projections =====

    /// Status counts over every case
    async fn dashboard(&self) -> Result<Dashboard, CausasError>;
}
