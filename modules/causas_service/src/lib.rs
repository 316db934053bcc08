//! Causas Service Module
//!
//! Judicial case records for a collections law office: cases, debtors,
//! procedural stage history, attachments, comments and a status dashboard.

// Public exports
pub mod contract;
pub use contract::{
    client::CausasApi, error::CausasError, error::FieldErrors, Causa, CausaFields, CausaFilter,
    Deudor, EstadoCausa, EtapaActual, EtapaCausa, Principal,
};

pub mod module;
pub use module::CausasServiceModule;

pub mod config;
pub use config::Config;

// Internal modules (hidden from public API)
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
