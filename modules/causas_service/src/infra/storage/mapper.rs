//! Entity to model mappers
//!
//! Conversions between SeaORM entities and contract models

use super::entity;
use crate::contract::{
    AntecedentesCbr, AntecedentesLeasing, ArchivoAdjunto, Cartera, Causa, CausaFields,
    Comentario, Deudor, Etapa, EtapaCausa, TipoEtapa, Tribunal, Usuario,
};
use anyhow::anyhow;
use sea_orm::ActiveValue::{NotSet, Set};

// ===== Catalog Conversions =====

impl From<entity::usuario::Model> for Usuario {
    fn from(entity: entity::usuario::Model) -> Self {
        Self {
            id: entity.id,
            username: entity.username,
            nombre: entity.nombre,
        }
    }
}

impl From<entity::tribunal::Model> for Tribunal {
    fn from(entity: entity::tribunal::Model) -> Self {
        Self {
            id: entity.id,
            nombre: entity.nombre,
        }
    }
}

impl From<entity::cartera::Model> for Cartera {
    fn from(entity: entity::cartera::Model) -> Self {
        Self {
            id: entity.id,
            nombre: entity.nombre,
        }
    }
}

impl From<entity::tipo_etapa::Model> for TipoEtapa {
    fn from(entity: entity::tipo_etapa::Model) -> Self {
        Self {
            id: entity.id,
            nombre: entity.nombre,
        }
    }
}

impl From<entity::etapa::Model> for Etapa {
    fn from(entity: entity::etapa::Model) -> Self {
        Self {
            id: entity.id,
            nombre: entity.nombre,
            tipo_etapa_id: entity.tipo_etapa_id,
        }
    }
}

impl From<entity::deudor::Model> for Deudor {
    fn from(entity: entity::deudor::Model) -> Self {
        Self {
            id: entity.id,
            nombres: entity.nombres,
            apellidos: entity.apellidos,
            rut: entity.rut,
            direccion: entity.direccion,
            comuna: entity.comuna,
        }
    }
}

// ===== Case Conversions =====

impl TryFrom<entity::causa::Model> for Causa {
    type Error = anyhow::Error;

    fn try_from(entity: entity::causa::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entity.id,
            rol: entity.rol,
            operacion: entity.operacion,
            estado: entity.estado.parse()?,
            total_costas: entity.total_costas,
            arbitro: entity.arbitro,
            fecha_asignacion: entity.fecha_asignacion,
            observaciones: entity.observaciones,
            deudor_id: entity.deudor_id,
            tribunal_id: entity.tribunal_id,
            cartera_id: entity.cartera_id,
            abogado_encargado_id: entity.abogado_encargado_id,
            fecha_creacion: entity.fecha_creacion,
            fecha_actualizacion: entity.fecha_actualizacion,
        })
    }
}

/// Copy the editable fields onto an active model; timestamps and id are left to the caller
pub fn apply_causa_fields(active: &mut entity::causa::ActiveModel, fields: &CausaFields) {
    active.rol = Set(fields.rol.clone());
    active.operacion = Set(fields.operacion.clone());
    active.estado = Set(fields.estado.as_str().to_string());
    active.total_costas = Set(fields.total_costas);
    active.arbitro = Set(fields.arbitro.clone());
    active.fecha_asignacion = Set(fields.fecha_asignacion);
    active.observaciones = Set(fields.observaciones.clone());
    active.deudor_id = Set(fields.deudor_id);
    active.tribunal_id = Set(fields.tribunal_id);
    active.cartera_id = Set(fields.cartera_id);
    active.abogado_encargado_id = Set(fields.abogado_encargado_id);
}

// ===== History Conversions =====

/// Join a history row with its stage to get the stage name
pub fn etapa_causa_from(
    entity: entity::etapa_causa::Model,
    etapa: Option<entity::etapa::Model>,
) -> anyhow::Result<EtapaCausa> {
    let etapa = etapa.ok_or_else(|| {
        anyhow!("etapa_causa {} references missing etapa {}", entity.id, entity.etapa_id)
    })?;
    Ok(EtapaCausa {
        id: entity.id,
        causa_id: entity.causa_id,
        etapa_id: entity.etapa_id,
        etapa_nombre: etapa.nombre,
        fecha: entity.fecha,
        descripcion: entity.descripcion,
        costas: entity.costas,
    })
}

/// Join a comment with its author
pub fn comentario_from(
    entity: entity::comentario::Model,
    autor: Option<entity::usuario::Model>,
) -> anyhow::Result<Comentario> {
    let autor = autor.ok_or_else(|| {
        anyhow!("comentario {} references missing usuario {}", entity.id, entity.autor_id)
    })?;
    Ok(Comentario {
        id: entity.id,
        causa_id: entity.causa_id,
        autor_id: entity.autor_id,
        autor_username: autor.username,
        texto: entity.texto,
        fecha_creacion: entity.fecha_creacion,
    })
}

impl From<entity::archivo_adjunto::Model> for ArchivoAdjunto {
    fn from(entity: entity::archivo_adjunto::Model) -> Self {
        Self {
            id: entity.id,
            causa_id: entity.causa_id,
            etapa_causa_id: entity.etapa_causa_id,
            archivo: entity.archivo,
            nombre_original: entity.nombre_original,
            descripcion: entity.descripcion,
            fecha_subida: entity.fecha_subida,
        }
    }
}

impl From<&ArchivoAdjunto> for entity::archivo_adjunto::ActiveModel {
    fn from(model: &ArchivoAdjunto) -> Self {
        Self {
            id: NotSet,
            causa_id: Set(model.causa_id),
            etapa_causa_id: Set(model.etapa_causa_id),
            archivo: Set(model.archivo.clone()),
            nombre_original: Set(model.nombre_original.clone()),
            descripcion: Set(model.descripcion.clone()),
            fecha_subida: Set(model.fecha_subida),
        }
    }
}

// ===== Addenda Conversions =====

impl From<entity::antecedentes_leasing::Model> for AntecedentesLeasing {
    fn from(entity: entity::antecedentes_leasing::Model) -> Self {
        Self {
            causa_id: entity.causa_id,
            numero_contrato: entity.numero_contrato,
            notaria: entity.notaria,
            fecha_escritura: entity.fecha_escritura,
            repertorio: entity.repertorio,
            monto_contrato: entity.monto_contrato,
        }
    }
}

impl From<&AntecedentesLeasing> for entity::antecedentes_leasing::ActiveModel {
    fn from(model: &AntecedentesLeasing) -> Self {
        Self {
            causa_id: Set(model.causa_id),
            numero_contrato: Set(model.numero_contrato.trim().to_string()),
            notaria: Set(model.notaria.trim().to_string()),
            fecha_escritura: Set(model.fecha_escritura),
            repertorio: Set(model.repertorio.trim().to_string()),
            monto_contrato: Set(model.monto_contrato),
        }
    }
}

impl From<entity::antecedentes_cbr::Model> for AntecedentesCbr {
    fn from(entity: entity::antecedentes_cbr::Model) -> Self {
        Self {
            causa_id: entity.causa_id,
            conservador: entity.conservador,
            fojas: entity.fojas,
            numero: entity.numero,
            anio: entity.anio,
            comuna: entity.comuna,
        }
    }
}

impl From<&AntecedentesCbr> for entity::antecedentes_cbr::ActiveModel {
    fn from(model: &AntecedentesCbr) -> Self {
        Self {
            causa_id: Set(model.causa_id),
            conservador: Set(model.conservador.trim().to_string()),
            fojas: Set(model.fojas.trim().to_string()),
            numero: Set(model.numero.trim().to_string()),
            anio: Set(model.anio),
            comuna: Set(model.comuna.trim().to_string()),
        }
    }
}
