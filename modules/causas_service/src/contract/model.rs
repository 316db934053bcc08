//! Contract models for the causas service
//!
//! These models are transport-agnostic and used for inter-module communication.
//! NO serde derives - these are pure domain models.

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;

/// Primary key type shared by every table
pub type Id = i32;

/// Label reported by [`EtapaActual`] when a case has no history yet
pub const SIN_ETAPA: &str = "Sin etapa registrada";

/// Application user (lawyer or staff member)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Usuario {
    pub id: Id,
    pub username: String,
    pub nombre: String,
}

/// Court
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tribunal {
    pub id: Id,
    pub nombre: String,
}

/// Client portfolio grouping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cartera {
    pub id: Id,
    pub nombre: String,
}

/// Category of procedural stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipoEtapa {
    pub id: Id,
    pub nombre: String,
}

/// Procedural stage, always classified under one [`TipoEtapa`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Etapa {
    pub id: Id,
    pub nombre: String,
    pub tipo_etapa_id: Id,
}

/// Debtor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deudor {
    pub id: Id,
    pub nombres: String,
    pub apellidos: String,
    /// Normalised RUT, e.g. `12345678-5`
    pub rut: String,
    pub direccion: String,
    pub comuna: String,
}

impl Deudor {
    pub fn nombre_completo(&self) -> String {
        format!("{} {}", self.nombres, self.apellidos)
    }
}

/// Debtor fields submitted for creation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewDeudor {
    pub nombres: String,
    pub apellidos: String,
    pub rut: String,
    pub direccion: String,
    pub comuna: String,
}

/// Case status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EstadoCausa {
    Recuperado,
    Activo,
    Suspendido,
    Archivado,
}

impl EstadoCausa {
    /// Every status, in dashboard order
    pub const ALL: [EstadoCausa; 4] = [
        EstadoCausa::Activo,
        EstadoCausa::Recuperado,
        EstadoCausa::Suspendido,
        EstadoCausa::Archivado,
    ];

    /// Stored and wire representation
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Recuperado => "RECUPERADO",
            Self::Activo => "ACTIVO",
            Self::Suspendido => "SUSPENDIDO",
            Self::Archivado => "ARCHIVADO",
        }
    }

    /// Human readable label
    pub fn label(self) -> &'static str {
        match self {
            Self::Recuperado => "Recuperado",
            Self::Activo => "Activo",
            Self::Suspendido => "Suspendido",
            Self::Archivado => "Archivado",
        }
    }
}

impl fmt::Display for EstadoCausa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the four statuses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEstado(pub String);

impl fmt::Display for UnknownEstado {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown case status '{}'", self.0)
    }
}

impl std::error::Error for UnknownEstado {}

impl FromStr for EstadoCausa {
    type Err = UnknownEstado;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RECUPERADO" => Ok(Self::Recuperado),
            "ACTIVO" => Ok(Self::Activo),
            "SUSPENDIDO" => Ok(Self::Suspendido),
            "ARCHIVADO" => Ok(Self::Archivado),
            _ => Err(UnknownEstado(s.to_string())),
        }
    }
}

/// Judicial case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Causa {
    pub id: Id,
    /// Docket number, unique across the store
    pub rol: String,
    pub operacion: String,
    pub estado: EstadoCausa,
    /// Whole pesos
    pub total_costas: i64,
    pub arbitro: String,
    pub fecha_asignacion: Option<NaiveDate>,
    pub observaciones: String,
    pub deudor_id: Id,
    pub tribunal_id: Option<Id>,
    pub cartera_id: Option<Id>,
    pub abogado_encargado_id: Option<Id>,
    pub fecha_creacion: DateTime<Utc>,
    pub fecha_actualizacion: DateTime<Utc>,
}

/// Editable case fields, used for both creation and update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CausaFields {
    pub rol: String,
    pub operacion: String,
    pub estado: EstadoCausa,
    pub total_costas: i64,
    pub arbitro: String,
    pub fecha_asignacion: Option<NaiveDate>,
    pub observaciones: String,
    pub deudor_id: Id,
    pub tribunal_id: Option<Id>,
    pub cartera_id: Option<Id>,
    pub abogado_encargado_id: Option<Id>,
}

impl CausaFields {
    /// Minimal field set: an active case for the given debtor
    pub fn new(rol: impl Into<String>, deudor_id: Id) -> Self {
        Self {
            rol: rol.into(),
            operacion: String::new(),
            estado: EstadoCausa::Activo,
            total_costas: 0,
            arbitro: String::new(),
            fecha_asignacion: None,
            observaciones: String::new(),
            deudor_id,
            tribunal_id: None,
            cartera_id: None,
            abogado_encargado_id: None,
        }
    }
}

impl From<&Causa> for CausaFields {
    fn from(causa: &Causa) -> Self {
        Self {
            rol: causa.rol.clone(),
            operacion: causa.operacion.clone(),
            estado: causa.estado,
            total_costas: causa.total_costas,
            arbitro: causa.arbitro.clone(),
            fecha_asignacion: causa.fecha_asignacion,
            observaciones: causa.observaciones.clone(),
            deudor_id: causa.deudor_id,
            tribunal_id: causa.tribunal_id,
            cartera_id: causa.cartera_id,
            abogado_encargado_id: causa.abogado_encargado_id,
        }
    }
}

/// List filter; unset fields do not restrict, set fields are AND-ed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CausaFilter {
    pub estado: Option<EstadoCausa>,
    pub cartera_id: Option<Id>,
}

/// Current stage of a case, derived from its history
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EtapaActual {
    Registrada {
        etapa_id: Id,
        nombre: String,
        fecha: NaiveDate,
    },
    SinRegistro,
}

impl EtapaActual {
    pub fn nombre(&self) -> &str {
        match self {
            Self::Registrada { nombre, .. } => nombre,
            Self::SinRegistro => SIN_ETAPA,
        }
    }
}

impl From<Option<EtapaCausa>> for EtapaActual {
    fn from(latest: Option<EtapaCausa>) -> Self {
        match latest {
            Some(evento) => Self::Registrada {
                etapa_id: evento.etapa_id,
                nombre: evento.etapa_nombre,
                fecha: evento.fecha,
            },
            None => Self::SinRegistro,
        }
    }
}

impl fmt::Display for EtapaActual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.nombre())
    }
}

/// Case list row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CausaResumen {
    pub causa: Causa,
    pub deudor: Deudor,
    pub etapa_actual: EtapaActual,
}

/// One stage event in a case history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtapaCausa {
    pub id: Id,
    pub causa_id: Id,
    pub etapa_id: Id,
    pub etapa_nombre: String,
    pub fecha: NaiveDate,
    pub descripcion: String,
    /// Whole pesos
    pub costas: i64,
}

/// Submitted stage event; required fields stay optional until validated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewEtapaCausa {
    pub etapa_id: Option<Id>,
    pub fecha: Option<NaiveDate>,
    pub descripcion: String,
    pub costas: i64,
}

/// Uploaded file as received from the client
#[derive(Clone, PartialEq, Eq)]
pub struct Upload {
    pub nombre: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upload")
            .field("nombre", &self.nombre)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Submitted attachment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewAdjunto {
    pub etapa_causa_id: Option<Id>,
    pub descripcion: String,
    pub archivo: Option<Upload>,
}

/// Stored attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivoAdjunto {
    pub id: Id,
    pub causa_id: Option<Id>,
    pub etapa_causa_id: Option<Id>,
    /// Path relative to the media root
    pub archivo: String,
    pub nombre_original: String,
    pub descripcion: String,
    pub fecha_subida: DateTime<Utc>,
}

/// Case note; immutable once written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comentario {
    pub id: Id,
    pub causa_id: Id,
    pub autor_id: Id,
    pub autor_username: String,
    pub texto: String,
    pub fecha_creacion: DateTime<Utc>,
}

/// Leasing contract addendum, at most one per case
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AntecedentesLeasing {
    pub causa_id: Id,
    pub numero_contrato: String,
    pub notaria: String,
    pub fecha_escritura: Option<NaiveDate>,
    pub repertorio: String,
    /// Whole pesos
    pub monto_contrato: i64,
}

/// Property registry (Conservador de Bienes Raíces) addendum, at most one per case
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AntecedentesCbr {
    pub causa_id: Id,
    pub conservador: String,
    pub fojas: String,
    pub numero: String,
    pub anio: Option<i32>,
    pub comuna: String,
}

/// Everything the case detail page shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CausaDetalle {
    pub causa: Causa,
    pub deudor: Deudor,
    pub tribunal: Option<Tribunal>,
    pub cartera: Option<Cartera>,
    pub abogado_encargado: Option<Usuario>,
    pub etapa_actual: EtapaActual,
    pub historial: Vec<EtapaCausa>,
    pub comentarios: Vec<Comentario>,
    pub adjuntos: Vec<ArchivoAdjunto>,
    pub antecedentes_leasing: Option<AntecedentesLeasing>,
    pub antecedentes_cbr: Option<AntecedentesCbr>,
}

/// Case counts per status
///
/// Counts come from one read transaction. On stores without snapshot reads the
/// numbers are best-effort under concurrent writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub total: u64,
    pub por_estado: Vec<(EstadoCausa, u64)>,
}

impl Dashboard {
    pub fn count(&self, estado: EstadoCausa) -> u64 {
        self.por_estado
            .iter()
            .find(|(e, _)| *e == estado)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    pub fn activas(&self) -> u64 {
        self.count(EstadoCausa::Activo)
    }

    pub fn recuperadas(&self) -> u64 {
        self.count(EstadoCausa::Recuperado)
    }

    pub fn suspendidas(&self) -> u64 {
        self.count(EstadoCausa::Suspendido)
    }

    pub fn archivadas(&self) -> u64 {
        self.count(EstadoCausa::Archivado)
    }
}

/// Authenticated caller, passed explicitly into operations that need one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub usuario_id: Id,
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estado_round_trips_through_str() {
        for estado in EstadoCausa::ALL {
            assert_eq!(estado.as_str().parse::<EstadoCausa>(), Ok(estado));
        }
        assert_eq!("activo".parse::<EstadoCausa>(), Ok(EstadoCausa::Activo));
        assert!("CERRADO".parse::<EstadoCausa>().is_err());
    }

    #[test]
    fn test_etapa_actual_sentinel() {
        let actual = EtapaActual::from(None::<EtapaCausa>);
        assert_eq!(actual, EtapaActual::SinRegistro);
        assert_eq!(actual.nombre(), SIN_ETAPA);
        assert_eq!(actual.to_string(), "Sin etapa registrada");
    }

    #[test]
    fn test_dashboard_missing_estado_counts_zero() {
        let dashboard = Dashboard {
            total: 3,
            por_estado: vec![(EstadoCausa::Activo, 3)],
        };
        assert_eq!(dashboard.activas(), 3);
        assert_eq!(dashboard.archivadas(), 0);
    }
}
