//! Submitted forms: body decoding and action dispatch
//!
//! Page forms post either `application/x-www-form-urlencoded` or
//! `multipart/form-data`. Which action a POST performs is decided by the
//! submit button's name; the body is decoded once into an action value here.

use super::error::Problem;
use crate::contract::error::REQUIRED;
use crate::contract::{
    CausaFields, EstadoCausa, FieldErrors, Id, NewAdjunto, NewEtapaCausa, Upload,
};
use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Form,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;

const INVALID_CHOICE: &str = "Escoja una opción válida.";
const INVALID_DATE: &str = "Introduzca una fecha válida.";
const INVALID_NUMBER: &str = "Introduzca un número entero.";

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y"];

/// Decoded request body: text fields and uploaded files by field name
#[derive(Debug, Clone, Default)]
pub struct SubmittedForm {
    fields: BTreeMap<String, String>,
    files: BTreeMap<String, Upload>,
}

impl SubmittedForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from name/value pairs; the first value of a repeated name wins
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut form = Self::new();
        for (name, value) in pairs {
            form.fields.entry(name.into()).or_insert_with(|| value.into());
        }
        form
    }

    pub fn with_file(mut self, name: impl Into<String>, upload: Upload) -> Self {
        self.files.insert(name.into(), upload);
        self
    }

    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name) || self.files.contains_key(name)
    }

    /// Trimmed text value; empty when absent
    pub fn text(&self, name: &str) -> &str {
        self.fields.get(name).map(|v| v.trim()).unwrap_or_default()
    }

    pub fn take_file(&mut self, name: &str) -> Option<Upload> {
        self.files.remove(name)
    }

    /// Text values for re-rendering the form
    pub fn values(&self) -> BTreeMap<String, String> {
        self.fields.clone()
    }

    async fn from_multipart(mut multipart: Multipart) -> Result<Self, Problem> {
        let mut form = Self::new();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|err| Problem::bad_request(err.body_text()))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(nombre) => {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|err| Problem::bad_request(err.body_text()))?;
                    // Browsers send an empty part when no file was chosen
                    if nombre.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    form.files.entry(name).or_insert(Upload {
                        nombre,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
                None => {
                    let value = field
                        .text()
                        .await
                        .map_err(|err| Problem::bad_request(err.body_text()))?;
                    form.fields.entry(name).or_insert(value);
                }
            }
        }
        Ok(form)
    }
}

impl<S> FromRequest<S> for SubmittedForm
where
    S: Send + Sync,
{
    type Rejection = Problem;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|err| Problem::bad_request(err.body_text()))?;
            Self::from_multipart(multipart).await
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|err| Problem::bad_request(err.body_text()))?;
            Ok(Self::from_pairs(pairs))
        } else {
            // Bodiless POST: no action marker, the page is re-rendered
            Ok(Self::new())
        }
    }
}

// ===== Field parsing =====

fn parse_id(
    form: &SubmittedForm,
    field: &str,
    required: bool,
    errors: &mut FieldErrors,
) -> Option<Id> {
    let raw = form.text(field);
    if raw.is_empty() {
        if required {
            errors.add(field, REQUIRED);
        }
        return None;
    }
    match raw.parse::<Id>() {
        Ok(id) if id > 0 => Some(id),
        _ => {
            errors.add(field, INVALID_CHOICE);
            None
        }
    }
}

/// ISO dates from date inputs, or day-first Chilean notation
pub fn parse_fecha(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw.trim(), format).ok())
}

fn parse_optional_fecha(
    form: &SubmittedForm,
    field: &str,
    errors: &mut FieldErrors,
) -> Option<NaiveDate> {
    let raw = form.text(field);
    if raw.is_empty() {
        return None;
    }
    let fecha = parse_fecha(raw);
    if fecha.is_none() {
        errors.add(field, INVALID_DATE);
    }
    fecha
}

/// Whole pesos; a leading `$` and `.` thousands grouping are accepted.
/// Decimals are rejected rather than rescaled.
pub fn parse_monto(raw: &str) -> Option<i64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ' ')
        .collect();
    if cleaned.is_empty() {
        return Some(0);
    }

    let (sign, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", cleaned.as_str()),
    };
    let mut groups = digits.split('.');
    let first = groups.next().unwrap_or_default();
    let grouped = digits.contains('.');
    if first.is_empty() || (grouped && first.len() > 3) {
        return None;
    }
    let mut plain = String::with_capacity(digits.len() + 1);
    plain.push_str(sign);
    plain.push_str(first);
    for group in groups {
        if group.len() != 3 {
            return None;
        }
        plain.push_str(group);
    }
    if !plain.trim_start_matches('-').bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    plain.parse().ok()
}

fn parse_monto_field(form: &SubmittedForm, field: &str, errors: &mut FieldErrors) -> i64 {
    match parse_monto(form.text(field)) {
        Some(value) => value,
        None => {
            errors.add(field, INVALID_NUMBER);
            0
        }
    }
}

fn adjunto_from(form: &mut SubmittedForm, errors: &mut FieldErrors) -> NewAdjunto {
    NewAdjunto {
        etapa_causa_id: parse_id(form, "etapa_causa", false, errors),
        descripcion: form.text("descripcion").to_string(),
        archivo: form.take_file("archivo"),
    }
}

fn finish<T>(value: T, errors: FieldErrors) -> Result<T, FieldErrors> {
    if errors.is_empty() {
        Ok(value)
    } else {
        Err(errors)
    }
}

/// Case form fields
pub fn decode_causa_fields(form: &SubmittedForm) -> Result<CausaFields, FieldErrors> {
    let mut errors = FieldErrors::new();

    let estado = match form.text("estado") {
        "" => {
            errors.add("estado", REQUIRED);
            EstadoCausa::Activo
        }
        raw => raw.parse().unwrap_or_else(|_| {
            errors.add("estado", INVALID_CHOICE);
            EstadoCausa::Activo
        }),
    };

    let deudor_id = parse_id(form, "deudor", true, &mut errors);
    let fields = CausaFields {
        rol: form.text("rol").to_string(),
        operacion: form.text("operacion").to_string(),
        estado,
        total_costas: parse_monto_field(form, "total_costas", &mut errors),
        arbitro: form.text("arbitro").to_string(),
        fecha_asignacion: parse_optional_fecha(form, "fecha_asignacion", &mut errors),
        observaciones: form.text("observaciones").to_string(),
        deudor_id: deudor_id.unwrap_or_default(),
        tribunal_id: parse_id(form, "tribunal", false, &mut errors),
        cartera_id: parse_id(form, "cartera", false, &mut errors),
        abogado_encargado_id: parse_id(form, "abogado_encargado", false, &mut errors),
    };

    finish(fields, errors)
}

// ===== Detail page actions =====

/// What a POST to the case detail page asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetalleAction {
    Etapa(NewEtapaCausa),
    Comentario(String),
    Adjunto(NewAdjunto),
}

impl DetalleAction {
    pub const MARKERS: [&'static str; 3] = ["submit_etapa", "submit_comentario", "submit_adjunto"];

    /// Marker of the submitted form, if any
    pub fn submitted(form: &SubmittedForm) -> Option<&'static str> {
        Self::MARKERS.into_iter().find(|marker| form.has(marker))
    }

    /// `Ok(None)` when no known submit marker is present
    pub fn decode(form: &mut SubmittedForm) -> Result<Option<Self>, FieldErrors> {
        let mut errors = FieldErrors::new();
        let action = match Self::submitted(form) {
            Some("submit_etapa") => {
                let evento = NewEtapaCausa {
                    etapa_id: parse_id(form, "etapa", false, &mut errors),
                    fecha: parse_optional_fecha(form, "fecha", &mut errors),
                    descripcion: form.text("descripcion").to_string(),
                    costas: parse_monto_field(form, "costas", &mut errors),
                };
                Self::Etapa(evento)
            }
            Some("submit_comentario") => Self::Comentario(form.text("texto").to_string()),
            Some(_) => Self::Adjunto(adjunto_from(form, &mut errors)),
            None => return Ok(None),
        };
        finish(Some(action), errors)
    }
}

// ===== Edit page actions =====

/// What a POST to the case edit page asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdicionAction {
    UpdateCausa(CausaFields),
    UploadAttachment(NewAdjunto),
}

impl EdicionAction {
    pub const MARKERS: [&'static str; 2] = ["update_causa", "upload_attachment"];

    pub fn submitted(form: &SubmittedForm) -> Option<&'static str> {
        Self::MARKERS.into_iter().find(|marker| form.has(marker))
    }

    /// `Ok(None)` when no known submit marker is present
    pub fn decode(form: &mut SubmittedForm) -> Result<Option<Self>, FieldErrors> {
        match Self::submitted(form) {
            Some("update_causa") => decode_causa_fields(form).map(|f| Some(Self::UpdateCausa(f))),
            Some(_) => {
                let mut errors = FieldErrors::new();
                let adjunto = adjunto_from(form, &mut errors);
                finish(Some(Self::UploadAttachment(adjunto)), errors)
            }
            None => Ok(None),
        }
    }
}
