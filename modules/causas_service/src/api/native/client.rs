//! Native client implementation - wraps domain service for in-process calls

use crate::contract::*;
use crate::domain::Service;
use async_trait::async_trait;
use std::sync::Arc;

/// Native client implementation that directly calls the domain service
///
/// Used by the CLI and by other in-process callers; no HTTP involved.
#[derive(Clone)]
pub struct NativeClient {
    service: Arc<Service>,
}

impl NativeClient {
    /// Create a new native client
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl CausasApi for NativeClient {
    async fn create_causa(&self, fields: CausaFields) -> Result<Causa, CausasError> {
        self.service.create_causa(fields).await
    }

    async fn update_causa(&self, id: Id, fields: CausaFields) -> Result<Causa, CausasError> {
        self.service.update_causa(id, fields).await
    }

    async fn get_causa(&self, id: Id) -> Result<Causa, CausasError> {
        self.service.get_causa(id).await
    }

    async fn delete_causa(&self, id: Id) -> Result<(), CausasError> {
        self.service.delete_causa(id).await
    }

    async fn list_causas(&self, filter: CausaFilter) -> Result<Vec<CausaResumen>, CausasError> {
        self.service.list_causas(filter).await
    }

    async fn etapa_actual(&self, causa_id: Id) -> Result<EtapaActual, CausasError> {
        self.service.etapa_actual(causa_id).await
    }

    async fn create_etapa_causa(
        &self,
        causa_id: Id,
        evento: NewEtapaCausa,
    ) -> Result<EtapaCausa, CausasError> {
        self.service.create_etapa_causa(causa_id, evento).await
    }

    async fn list_historial(&self, causa_id: Id) -> Result<Vec<EtapaCausa>, CausasError> {
        self.service.list_historial(causa_id).await
    }

    async fn create_comentario(
        &self,
        principal: &Principal,
        causa_id: Id,
        texto: &str,
    ) -> Result<Comentario, CausasError> {
        self.service.create_comentario(principal, causa_id, texto).await
    }

    async fn create_adjunto(
        &self,
        causa_id: Id,
        adjunto: NewAdjunto,
    ) -> Result<ArchivoAdjunto, CausasError> {
        self.service.create_adjunto(causa_id, adjunto).await
    }

    async fn dashboard(&self) -> Result<Dashboard, CausasError> {
        self.service.dashboard().await
    }
}
