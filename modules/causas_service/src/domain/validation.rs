//! Field validation for submitted records

use crate::contract::error::{FieldErrors, REQUIRED};
use crate::contract::{AntecedentesCbr, AntecedentesLeasing, CausaFields, NewAdjunto, NewDeudor, NewEtapaCausa};

pub const ROL_MAX: usize = 50;
pub const NOMBRE_MAX: usize = 200;
pub const PERSONA_MAX: usize = 150;
pub const RUT_MAX: usize = 12;
pub const DESCRIPCION_ADJUNTO_MAX: usize = 255;
pub const NOMBRE_ARCHIVO_MAX: usize = 255;

fn too_long(max: usize) -> String {
    format!("Asegúrese de que este valor tenga a lo más {} caracteres.", max)
}

/// Record errors for a required, length-bounded text field
pub fn check_text(errors: &mut FieldErrors, field: &str, value: &str, required: bool, max: usize) {
    let value = value.trim();
    if required && value.is_empty() {
        errors.add(field, REQUIRED);
    } else if value.chars().count() > max {
        errors.add(field, too_long(max));
    }
}

fn check_amount(errors: &mut FieldErrors, field: &str, value: i64) {
    if value < 0 {
        errors.add(field, "Asegúrese de que este valor sea mayor o igual a 0.");
    }
}

/// Check digit for a RUT body (modulo 11, weights 2..=7 from the right)
pub fn rut_check_digit(body: u32) -> char {
    let mut sum = 0;
    let mut weight = 2;
    let mut rest = body;
    while rest > 0 {
        sum += (rest % 10) * weight;
        rest /= 10;
        weight = if weight == 7 { 2 } else { weight + 1 };
    }
    match 11 - (sum % 11) {
        11 => '0',
        10 => 'K',
        d => char::from_digit(d, 10).unwrap_or('0'),
    }
}

/// Normalise a RUT to `<body>-<dv>` and verify its check digit
///
/// Accepts dots, spaces and an optional dash (`12.345.678-5`, `123456785`).
pub fn normalize_rut(raw: &str) -> Result<String, String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '.' | ' ' | '-'))
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if cleaned.len() < 2 {
        return Err("Introduzca un RUT válido.".to_string());
    }

    let (body, dv) = cleaned.split_at(cleaned.len() - 1);
    if body.len() > 9 || !body.chars().all(|c| c.is_ascii_digit()) {
        return Err("Introduzca un RUT válido.".to_string());
    }
    let number: u32 = body
        .parse()
        .map_err(|_| "Introduzca un RUT válido.".to_string())?;
    if number == 0 {
        return Err("Introduzca un RUT válido.".to_string());
    }

    let expected = rut_check_digit(number);
    let given = dv.chars().next().unwrap_or(' ');
    if given != expected {
        return Err("El dígito verificador del RUT no es válido.".to_string());
    }

    Ok(format!("{}-{}", number, expected))
}

/// Validate a debtor and return it with its RUT normalised
pub fn validate_deudor(deudor: &NewDeudor) -> Result<NewDeudor, FieldErrors> {
    let mut errors = FieldErrors::new();
    check_text(&mut errors, "nombres", &deudor.nombres, true, PERSONA_MAX);
    check_text(&mut errors, "apellidos", &deudor.apellidos, true, PERSONA_MAX);
    check_text(&mut errors, "direccion", &deudor.direccion, false, NOMBRE_MAX);
    check_text(&mut errors, "comuna", &deudor.comuna, false, 100);

    let rut = if deudor.rut.trim().is_empty() {
        errors.add("rut", REQUIRED);
        None
    } else {
        match normalize_rut(&deudor.rut) {
            Ok(rut) if rut.len() <= RUT_MAX => Some(rut),
            Ok(_) => {
                errors.add("rut", too_long(RUT_MAX));
                None
            }
            Err(message) => {
                errors.add("rut", message);
                None
            }
        }
    };

    match rut {
        Some(rut) if errors.is_empty() => Ok(NewDeudor {
            nombres: deudor.nombres.trim().to_string(),
            apellidos: deudor.apellidos.trim().to_string(),
            rut,
            direccion: deudor.direccion.trim().to_string(),
            comuna: deudor.comuna.trim().to_string(),
        }),
        _ => Err(errors),
    }
}

/// Validate case fields and return them trimmed
pub fn validate_causa(fields: &CausaFields) -> Result<CausaFields, FieldErrors> {
    let mut errors = FieldErrors::new();
    check_text(&mut errors, "rol", &fields.rol, true, ROL_MAX);
    check_text(&mut errors, "operacion", &fields.operacion, false, 100);
    check_text(&mut errors, "arbitro", &fields.arbitro, false, NOMBRE_MAX);
    check_amount(&mut errors, "total_costas", fields.total_costas);

    if errors.is_empty() {
        Ok(CausaFields {
            rol: fields.rol.trim().to_string(),
            operacion: fields.operacion.trim().to_string(),
            arbitro: fields.arbitro.trim().to_string(),
            observaciones: fields.observaciones.trim().to_string(),
            ..fields.clone()
        })
    } else {
        Err(errors)
    }
}

/// Validate a stage event; returns the required stage id and date
pub fn validate_etapa_causa(
    evento: &NewEtapaCausa,
) -> Result<(crate::contract::Id, chrono::NaiveDate), FieldErrors> {
    let mut errors = FieldErrors::new();
    if evento.etapa_id.is_none() {
        errors.add("etapa", REQUIRED);
    }
    if evento.fecha.is_none() {
        errors.add("fecha", REQUIRED);
    }
    check_amount(&mut errors, "costas", evento.costas);

    match (evento.etapa_id, evento.fecha) {
        (Some(etapa_id), Some(fecha)) if errors.is_empty() => Ok((etapa_id, fecha)),
        _ => Err(errors),
    }
}

pub fn validate_comentario(texto: &str) -> Result<String, FieldErrors> {
    let texto = texto.trim();
    if texto.is_empty() {
        return Err(FieldErrors::single("texto", REQUIRED));
    }
    Ok(texto.to_string())
}

/// An attachment needs a non-empty file within the size limit
pub fn validate_adjunto(adjunto: &NewAdjunto, max_bytes: usize) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    match &adjunto.archivo {
        None => errors.add("archivo", "No se ha enviado ningún fichero."),
        Some(upload) if upload.bytes.is_empty() => {
            errors.add("archivo", "El fichero enviado está vacío.")
        }
        Some(upload) if upload.bytes.len() > max_bytes => errors.add(
            "archivo",
            format!("El fichero supera el tamaño máximo de {} bytes.", max_bytes),
        ),
        Some(upload) if upload.nombre.chars().count() > NOMBRE_ARCHIVO_MAX => errors.add(
            "archivo",
            format!(
                "Asegúrese de que este nombre de fichero tenga como máximo {} caracteres.",
                NOMBRE_ARCHIVO_MAX
            ),
        ),
        Some(_) => {}
    }
    check_text(
        &mut errors,
        "descripcion",
        &adjunto.descripcion,
        false,
        DESCRIPCION_ADJUNTO_MAX,
    );
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub fn validate_leasing(leasing: &AntecedentesLeasing) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    check_text(&mut errors, "numero_contrato", &leasing.numero_contrato, true, 50);
    check_text(&mut errors, "notaria", &leasing.notaria, false, NOMBRE_MAX);
    check_text(&mut errors, "repertorio", &leasing.repertorio, false, 50);
    check_amount(&mut errors, "monto_contrato", leasing.monto_contrato);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub fn validate_cbr(cbr: &AntecedentesCbr) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    check_text(&mut errors, "conservador", &cbr.conservador, true, NOMBRE_MAX);
    check_text(&mut errors, "fojas", &cbr.fojas, true, 20);
    check_text(&mut errors, "numero", &cbr.numero, true, 20);
    check_text(&mut errors, "comuna", &cbr.comuna, false, 100);
    if let Some(anio) = cbr.anio {
        if !(1850..=2200).contains(&anio) {
            errors.add("anio", "Introduzca un año válido.");
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::contract::Upload;
    use chrono::NaiveDate;

    #[test]
    fn test_rut_check_digit() {
        assert_eq!(rut_check_digit(12_345_678), '5');
        assert_eq!(rut_check_digit(11_111_111), '1');
        assert_eq!(rut_check_digit(9_876_543), '3');
    }

    #[test]
    fn test_normalize_rut_accepts_common_formats() {
        assert_eq!(normalize_rut("12.345.678-5"), Ok("12345678-5".to_string()));
        assert_eq!(normalize_rut("123456785"), Ok("12345678-5".to_string()));
        assert_eq!(normalize_rut(" 9876543-3 "), Ok("9876543-3".to_string()));
    }

    #[test]
    fn test_normalize_rut_rejects_bad_input() {
        assert!(normalize_rut("12.345.678-9").is_err());
        assert!(normalize_rut("abc").is_err());
        assert!(normalize_rut("5").is_err());
        assert!(normalize_rut("0-0").is_err());
    }

    #[test]
    fn test_validate_deudor_normalises_rut() {
        let deudor = NewDeudor {
            nombres: " Ana ".into(),
            apellidos: "Pérez".into(),
            rut: "11.111.111-1".into(),
            ..Default::default()
        };
        let valid = validate_deudor(&deudor).unwrap();
        assert_eq!(valid.rut, "11111111-1");
        assert_eq!(valid.nombres, "Ana");
    }

    #[test]
    fn test_validate_deudor_reports_every_field() {
        let errors = validate_deudor(&NewDeudor::default()).unwrap_err();
        assert!(errors.contains("nombres"));
        assert!(errors.contains("apellidos"));
        assert!(errors.contains("rut"));
    }

    #[test]
    fn test_validate_causa_requires_rol() {
        let errors = validate_causa(&CausaFields::new("   ", 1)).unwrap_err();
        assert_eq!(errors.get("rol"), Some(&[REQUIRED.to_string()][..]));
    }

    #[test]
    fn test_validate_causa_rejects_long_rol_and_negative_costs() {
        let mut fields = CausaFields::new("C".repeat(ROL_MAX + 1), 1);
        fields.total_costas = -1;
        let errors = validate_causa(&fields).unwrap_err();
        assert!(errors.contains("rol"));
        assert!(errors.contains("total_costas"));
    }

    #[test]
    fn test_validate_etapa_causa_requires_date() {
        let evento = NewEtapaCausa {
            etapa_id: Some(1),
            fecha: None,
            ..Default::default()
        };
        let errors = validate_etapa_causa(&evento).unwrap_err();
        assert!(errors.contains("fecha"));
        assert!(!errors.contains("etapa"));

        let evento = NewEtapaCausa {
            etapa_id: Some(1),
            fecha: NaiveDate::from_ymd_opt(2024, 3, 1),
            ..Default::default()
        };
        assert!(validate_etapa_causa(&evento).is_ok());
    }

    #[test]
    fn test_validate_adjunto_requires_file() {
        let errors = validate_adjunto(&NewAdjunto::default(), 1024).unwrap_err();
        assert!(errors.contains("archivo"));

        let adjunto = NewAdjunto {
            archivo: Some(Upload {
                nombre: "demanda.pdf".into(),
                content_type: None,
                bytes: vec![0; 2048],
            }),
            ..Default::default()
        };
        assert!(validate_adjunto(&adjunto, 1024).is_err());
        assert!(validate_adjunto(&adjunto, 4096).is_ok());
    }

    #[test]
    fn test_validate_adjunto_rejects_long_file_name() {
        let con_nombre = |nombre: String| NewAdjunto {
            archivo: Some(Upload {
                nombre,
                content_type: None,
                bytes: b"x".to_vec(),
            }),
            ..Default::default()
        };

        let largo = format!("{}.pdf", "a".repeat(NOMBRE_ARCHIVO_MAX));
        let errors = validate_adjunto(&con_nombre(largo), 1024).unwrap_err();
        assert!(errors.contains("archivo"));

        let justo = format!("{}.pdf", "ñ".repeat(NOMBRE_ARCHIVO_MAX - 4));
        assert!(validate_adjunto(&con_nombre(justo), 1024).is_ok());
    }

    #[test]
    fn test_validate_comentario_trims() {
        assert_eq!(validate_comentario("  hola ").unwrap(), "hola");
        assert!(validate_comentario(" \n ").is_err());
    }
}
