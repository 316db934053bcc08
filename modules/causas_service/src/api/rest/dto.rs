//! REST DTOs with serde derives for HTTP API
//!
//! Page handlers answer with these page models as JSON.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

// ===== Catalog DTOs =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UsuarioDto {
    pub id: i32,
    #[schema(example = "mlopez")]
    pub username: String,
    pub nombre: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TribunalDto {
    pub id: i32,
    #[schema(example = "1° Juzgado Civil de Santiago")]
    pub nombre: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CarteraDto {
    pub id: i32,
    pub nombre: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EtapaDto {
    pub id: i32,
    #[schema(example = "Notificación")]
    pub nombre: String,
    pub tipo_etapa_id: i32,
}

/// Selectable case status
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EstadoOptionDto {
    #[schema(example = "ACTIVO")]
    pub value: String,
    #[schema(example = "Activo")]
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeudorDto {
    pub id: i32,
    pub nombres: String,
    pub apellidos: String,
    pub nombre_completo: String,
    #[schema(example = "12345678-5")]
    pub rut: String,
    pub direccion: String,
    pub comuna: String,
}

// ===== Case DTOs =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CausaDto {
    pub id: i32,
    #[schema(example = "C-1234-2024")]
    pub rol: String,
    pub operacion: String,
    #[schema(example = "ACTIVO")]
    pub estado: String,
    #[schema(example = "Activo")]
    pub estado_label: String,
    /// Whole pesos
    pub total_costas: i64,
    pub arbitro: String,
    pub fecha_asignacion: Option<NaiveDate>,
    pub observaciones: String,
    pub deudor_id: i32,
    pub tribunal_id: Option<i32>,
    pub cartera_id: Option<i32>,
    pub abogado_encargado_id: Option<i32>,
    pub fecha_creacion: DateTime<Utc>,
    pub fecha_actualizacion: DateTime<Utc>,
}

/// Case list row
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CausaListItemDto {
    pub causa: CausaDto,
    pub deudor: DeudorDto,
    #[schema(example = "Sin etapa registrada")]
    pub etapa_actual: String,
}

/// `GET /causas/`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CausaListPage {
    pub items: Vec<CausaListItemDto>,
    pub total: usize,
    /// Active status filter
    pub estado: Option<String>,
    /// Active portfolio filter
    pub cartera: Option<CarteraDto>,
    pub estados: Vec<EstadoOptionDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EtapaCausaDto {
    pub id: i32,
    pub causa_id: i32,
    pub etapa_id: i32,
    pub etapa: String,
    pub fecha: NaiveDate,
    pub descripcion: String,
    pub costas: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArchivoAdjuntoDto {
    pub id: i32,
    pub causa_id: Option<i32>,
    pub etapa_causa_id: Option<i32>,
    /// Path relative to the media root
    pub archivo: String,
    pub nombre_original: String,
    pub descripcion: String,
    pub fecha_subida: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ComentarioDto {
    pub id: i32,
    pub causa_id: i32,
    pub autor_id: i32,
    pub autor: String,
    pub texto: String,
    pub fecha_creacion: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AntecedentesLeasingDto {
    pub numero_contrato: String,
    pub notaria: String,
    pub fecha_escritura: Option<NaiveDate>,
    pub repertorio: String,
    pub monto_contrato: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AntecedentesCbrDto {
    pub conservador: String,
    pub fojas: String,
    pub numero: String,
    pub anio: Option<i32>,
    pub comuna: String,
}

/// `GET /causas/{id}/`; also the body of a rejected detail-page form
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CausaDetallePage {
    pub causa: CausaDto,
    pub deudor: DeudorDto,
    pub tribunal: Option<TribunalDto>,
    pub cartera: Option<CarteraDto>,
    pub abogado_encargado: Option<UsuarioDto>,
    pub etapa_actual: String,
    pub historial: Vec<EtapaCausaDto>,
    pub comentarios: Vec<ComentarioDto>,
    pub adjuntos: Vec<ArchivoAdjuntoDto>,
    pub antecedentes_leasing: Option<AntecedentesLeasingDto>,
    pub antecedentes_cbr: Option<AntecedentesCbrDto>,
    /// Stages offered by the history form
    pub etapas: Vec<EtapaDto>,
    /// Marker of the form that failed validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<String>,
    /// Submitted values echoed back on failure
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, String>,
    #[serde(default)]
    /// Field name to messages
    pub errors: BTreeMap<String, Vec<String>>,
}

/// `GET /causas/nueva/` and `GET /causas/{id}/editar/`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CausaFormPage {
    /// The case being edited; absent on creation
    pub causa: Option<CausaDto>,
    /// Current field values keyed by form field name
    pub values: BTreeMap<String, String>,
    /// Fields rendered as hidden inputs
    pub hidden: Vec<String>,
    #[serde(default)]
    /// Field name to messages
    pub errors: BTreeMap<String, Vec<String>>,
    pub deudores: Vec<DeudorDto>,
    pub tribunales: Vec<TribunalDto>,
    pub carteras: Vec<CarteraDto>,
    pub usuarios: Vec<UsuarioDto>,
    pub estados: Vec<EstadoOptionDto>,
    /// Attachments listed on the edit page
    pub adjuntos: Vec<ArchivoAdjuntoDto>,
}

/// `GET /causas/{id}/eliminar/`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EliminarPage {
    pub causa: CausaDto,
    pub deudor: DeudorDto,
    pub historial: usize,
    pub comentarios: usize,
    pub adjuntos: usize,
}

// ===== Dashboard DTOs =====

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardDto {
    pub total: u64,
    pub activas: u64,
    pub recuperadas: u64,
    pub suspendidas: u64,
    pub archivadas: u64,
    /// Chart labels, one per status
    pub labels: Vec<String>,
    /// Chart values, aligned with `labels`
    pub counts: Vec<u64>,
}

/// `GET /`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardPage {
    pub usuario: String,
    pub dashboard: DashboardDto,
}
