//! SeaORM entities for database tables

pub mod antecedentes_cbr;
pub mod antecedentes_leasing;
pub mod archivo_adjunto;
pub mod cartera;
pub mod causa;
pub mod comentario;
pub mod deudor;
pub mod etapa;
pub mod etapa_causa;
pub mod tipo_etapa;
pub mod tribunal;
pub mod usuario;
