//! Domain layer - business logic and services

pub mod repository;
pub mod service;
pub mod validation;

pub use repository::{
    CatalogRepository, CausaRepository, DeudorRepository, HistorialRepository, MediaStore,
    StorageError, StorageResult,
};
pub use service::Service;
