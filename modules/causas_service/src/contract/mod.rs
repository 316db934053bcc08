//! Contract layer - public API for inter-module communication
//!
//! This layer contains transport-agnostic models and the native client trait.
//! NO serde derives on models - these are pure domain types.

pub mod client;
pub mod error;
pub mod model;

pub use client::CausasApi;
pub use error::{CausasError, FieldErrors};
pub use model::{
    AntecedentesCbr, AntecedentesLeasing, ArchivoAdjunto, Cartera, Causa, CausaDetalle,
    CausaFields, CausaFilter, CausaResumen, Comentario, Dashboard, Deudor, EstadoCausa, Etapa,
    EtapaActual, EtapaCausa, Id, NewAdjunto, NewDeudor, NewEtapaCausa, Principal, TipoEtapa,
    Tribunal, Upload, Usuario, SIN_ETAPA,
};
