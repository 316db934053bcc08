//! Mapper implementations for converting between DTOs and contract models

use super::dto::*;
use crate::contract::{self, CausaFields, EstadoCausa};
use std::collections::BTreeMap;

// ===== Catalog conversions =====

impl From<contract::Usuario> for UsuarioDto {
    fn from(usuario: contract::Usuario) -> Self {
        Self {
            id: usuario.id,
            username: usuario.username,
            nombre: usuario.nombre,
        }
    }
}

impl From<contract::Tribunal> for TribunalDto {
    fn from(tribunal: contract::Tribunal) -> Self {
        Self {
            id: tribunal.id,
            nombre: tribunal.nombre,
        }
    }
}

impl From<contract::Cartera> for CarteraDto {
    fn from(cartera: contract::Cartera) -> Self {
        Self {
            id: cartera.id,
            nombre: cartera.nombre,
        }
    }
}

impl From<contract::Etapa> for EtapaDto {
    fn from(etapa: contract::Etapa) -> Self {
        Self {
            id: etapa.id,
            nombre: etapa.nombre,
            tipo_etapa_id: etapa.tipo_etapa_id,
        }
    }
}

impl From<EstadoCausa> for EstadoOptionDto {
    fn from(estado: EstadoCausa) -> Self {
        Self {
            value: estado.as_str().to_string(),
            label: estado.label().to_string(),
        }
    }
}

/// Every status, in display order
pub fn estados() -> Vec<EstadoOptionDto> {
    EstadoCausa::ALL.into_iter().map(Into::into).collect()
}

impl From<contract::Deudor> for DeudorDto {
    fn from(deudor: contract::Deudor) -> Self {
        Self {
            nombre_completo: deudor.nombre_completo(),
            id: deudor.id,
            nombres: deudor.nombres,
            apellidos: deudor.apellidos,
            rut: deudor.rut,
            direccion: deudor.direccion,
            comuna: deudor.comuna,
        }
    }
}

// ===== Case conversions =====

impl From<contract::Causa> for CausaDto {
    fn from(causa: contract::Causa) -> Self {
        Self {
            id: causa.id,
            rol: causa.rol,
            operacion: causa.operacion,
            estado: causa.estado.as_str().to_string(),
            estado_label: causa.estado.label().to_string(),
            total_costas: causa.total_costas,
            arbitro: causa.arbitro,
            fecha_asignacion: causa.fecha_asignacion,
            observaciones: causa.observaciones,
            deudor_id: causa.deudor_id,
            tribunal_id: causa.tribunal_id,
            cartera_id: causa.cartera_id,
            abogado_encargado_id: causa.abogado_encargado_id,
            fecha_creacion: causa.fecha_creacion,
            fecha_actualizacion: causa.fecha_actualizacion,
        }
    }
}

impl From<contract::CausaResumen> for CausaListItemDto {
    fn from(resumen: contract::CausaResumen) -> Self {
        Self {
            etapa_actual: resumen.etapa_actual.to_string(),
            causa: resumen.causa.into(),
            deudor: resumen.deudor.into(),
        }
    }
}

impl From<contract::EtapaCausa> for EtapaCausaDto {
    fn from(evento: contract::EtapaCausa) -> Self {
        Self {
            id: evento.id,
            causa_id: evento.causa_id,
            etapa_id: evento.etapa_id,
            etapa: evento.etapa_nombre,
            fecha: evento.fecha,
            descripcion: evento.descripcion,
            costas: evento.costas,
        }
    }
}

impl From<contract::ArchivoAdjunto> for ArchivoAdjuntoDto {
    fn from(adjunto: contract::ArchivoAdjunto) -> Self {
        Self {
            id: adjunto.id,
            causa_id: adjunto.causa_id,
            etapa_causa_id: adjunto.etapa_causa_id,
            archivo: adjunto.archivo,
            nombre_original: adjunto.nombre_original,
            descripcion: adjunto.descripcion,
            fecha_subida: adjunto.fecha_subida,
        }
    }
}

impl From<contract::Comentario> for ComentarioDto {
    fn from(comentario: contract::Comentario) -> Self {
        Self {
            id: comentario.id,
            causa_id: comentario.causa_id,
            autor_id: comentario.autor_id,
            autor: comentario.autor_username,
            texto: comentario.texto,
            fecha_creacion: comentario.fecha_creacion,
        }
    }
}

impl From<contract::AntecedentesLeasing> for AntecedentesLeasingDto {
    fn from(leasing: contract::AntecedentesLeasing) -> Self {
        Self {
            numero_contrato: leasing.numero_contrato,
            notaria: leasing.notaria,
            fecha_escritura: leasing.fecha_escritura,
            repertorio: leasing.repertorio,
            monto_contrato: leasing.monto_contrato,
        }
    }
}

impl From<contract::AntecedentesCbr> for AntecedentesCbrDto {
    fn from(cbr: contract::AntecedentesCbr) -> Self {
        Self {
            conservador: cbr.conservador,
            fojas: cbr.fojas,
            numero: cbr.numero,
            anio: cbr.anio,
            comuna: cbr.comuna,
        }
    }
}

impl CausaDetallePage {
    /// Page for a case with the stages offered by the history form
    pub fn new(detalle: contract::CausaDetalle, etapas: Vec<contract::Etapa>) -> Self {
        Self {
            etapa_actual: detalle.etapa_actual.to_string(),
            causa: detalle.causa.into(),
            deudor: detalle.deudor.into(),
            tribunal: detalle.tribunal.map(Into::into),
            cartera: detalle.cartera.map(Into::into),
            abogado_encargado: detalle.abogado_encargado.map(Into::into),
            historial: detalle.historial.into_iter().map(Into::into).collect(),
            comentarios: detalle.comentarios.into_iter().map(Into::into).collect(),
            adjuntos: detalle.adjuntos.into_iter().map(Into::into).collect(),
            antecedentes_leasing: detalle.antecedentes_leasing.map(Into::into),
            antecedentes_cbr: detalle.antecedentes_cbr.map(Into::into),
            etapas: etapas.into_iter().map(Into::into).collect(),
            form: None,
            values: BTreeMap::new(),
            errors: BTreeMap::new(),
        }
    }
}

/// Case fields as form values, keyed by form field name
pub fn causa_form_values(fields: &CausaFields) -> BTreeMap<String, String> {
    let optional = |id: Option<i32>| id.map(|id| id.to_string()).unwrap_or_default();
    BTreeMap::from([
        ("rol".to_string(), fields.rol.clone()),
        ("operacion".to_string(), fields.operacion.clone()),
        ("estado".to_string(), fields.estado.as_str().to_string()),
        ("total_costas".to_string(), fields.total_costas.to_string()),
        ("arbitro".to_string(), fields.arbitro.clone()),
        (
            "fecha_asignacion".to_string(),
            fields
                .fecha_asignacion
                .map(|fecha| fecha.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        ),
        ("observaciones".to_string(), fields.observaciones.clone()),
        ("deudor".to_string(), fields.deudor_id.to_string()),
        ("tribunal".to_string(), optional(fields.tribunal_id)),
        ("cartera".to_string(), optional(fields.cartera_id)),
        ("abogado_encargado".to_string(), optional(fields.abogado_encargado_id)),
    ])
}

/// Defaults shown on an empty creation form
pub fn nueva_form_values() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("estado".to_string(), EstadoCausa::Activo.as_str().to_string()),
        ("total_costas".to_string(), "0".to_string()),
    ])
}

// ===== Dashboard conversions =====

impl From<contract::Dashboard> for DashboardDto {
    fn from(dashboard: contract::Dashboard) -> Self {
        Self {
            total: dashboard.total,
            activas: dashboard.activas(),
            recuperadas: dashboard.recuperadas(),
            suspendidas: dashboard.suspendidas(),
            archivadas: dashboard.archivadas(),
            labels: dashboard
                .por_estado
                .iter()
                .map(|(estado, _)| estado.label().to_string())
                .collect(),
            counts: dashboard.por_estado.iter().map(|(_, n)| *n).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_dto_flattens_counts() {
        let dto = DashboardDto::from(contract::Dashboard {
            total: 5,
            por_estado: vec![
                (EstadoCausa::Activo, 2),
                (EstadoCausa::Recuperado, 1),
                (EstadoCausa::Suspendido, 1),
                (EstadoCausa::Archivado, 1),
            ],
        });
        assert_eq!(dto.activas, 2);
        assert_eq!(dto.archivadas, 1);
        assert_eq!(dto.labels, ["Activo", "Recuperado", "Suspendido", "Archivado"]);
        assert_eq!(dto.counts, [2, 1, 1, 1]);
    }

    #[test]
    fn test_causa_form_values_round_trip_through_decoder() {
        let mut fields = CausaFields::new("C-77-2023", 3);
        fields.cartera_id = Some(9);
        fields.total_costas = 4500;
        let form = super::super::forms::SubmittedForm::from_pairs(causa_form_values(&fields));
        assert_eq!(super::super::forms::decode_causa_fields(&form), Ok(fields));
    }
}
