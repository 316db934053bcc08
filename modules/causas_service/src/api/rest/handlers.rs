//! HTTP request handlers - thin layer that delegates to domain service
//!
//! Page handlers answer with the page model a template would render. Form posts
//! redirect with `303 See Other` on success and re-render with `422` on
//! validation failure.

use super::auth::Authenticated;
use super::dto::*;
use super::error::{ApiError, Problem};
use super::forms::{decode_causa_fields, DetalleAction, EdicionAction, SubmittedForm};
use super::mapper::{causa_form_values, estados, nueva_form_values};
use crate::contract::{Causa, CausaFields, CausaFilter, CausasError, EstadoCausa, FieldErrors, Id};
use crate::domain::Service;
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;

fn detalle_url(id: Id) -> String {
    format!("/causas/{}/", id)
}

fn editar_url(id: Id) -> String {
    format!("/causas/{}/editar/", id)
}

const LISTADO_URL: &str = "/causas/";

fn see_other(location: &str) -> Response {
    Redirect::to(location).into_response()
}

fn unprocessable<T: serde::Serialize>(page: T) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, Json(page)).into_response()
}

/// Blank query values count as absent
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_cartera_id(raw: Option<String>) -> Result<Option<Id>, ApiError> {
    match non_blank(raw) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<Id>()
            .map(Some)
            .map_err(|_| Problem::bad_request(format!("invalid cartera_id '{}'", raw)).into()),
    }
}

// ===== Dashboard =====

pub async fn dashboard(
    service: Arc<Service>,
    auth: Authenticated,
) -> Result<Json<DashboardPage>, ApiError> {
    let dashboard = service.dashboard().await.map_err(|e| auth.reject(e))?;
    Ok(Json(DashboardPage {
        usuario: auth.principal.username.clone(),
        dashboard: dashboard.into(),
    }))
}

// ===== Case list =====

/// Query parameters for the case list
#[derive(Debug, Default, Deserialize)]
pub struct ListCausasQuery {
    pub estado: Option<String>,
    pub cartera_id: Option<String>,
}

pub async fn list_causas(
    service: Arc<Service>,
    auth: Authenticated,
    Query(query): Query<ListCausasQuery>,
) -> Result<Json<CausaListPage>, ApiError> {
    let estado = match non_blank(query.estado) {
        None => None,
        Some(raw) => Some(raw.parse::<EstadoCausa>().map_err(|err| {
            ApiError::from(Problem::bad_request(err.to_string()))
        })?),
    };
    let cartera_id = parse_cartera_id(query.cartera_id)?;

    let cartera = match cartera_id {
        Some(id) => Some(service.get_cartera(id).await.map_err(|e| auth.reject(e))?),
        None => None,
    };

    let items: Vec<CausaListItemDto> = service
        .list_causas(CausaFilter { estado, cartera_id })
        .await
        .map_err(|e| auth.reject(e))?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(CausaListPage {
        total: items.len(),
        items,
        estado: estado.map(|e| e.as_str().to_string()),
        cartera: cartera.map(Into::into),
        estados: estados(),
    }))
}

// ===== Case detail =====

async fn detalle_page(service: &Service, id: Id) -> Result<CausaDetallePage, CausasError> {
    let detalle = service.detalle_causa(id).await?;
    let etapas = service.list_etapas().await?;
    Ok(CausaDetallePage::new(detalle, etapas))
}

pub async fn detalle(
    service: Arc<Service>,
    auth: Authenticated,
    Path(id): Path<Id>,
) -> Result<Json<CausaDetallePage>, ApiError> {
    let page = detalle_page(&service, id).await.map_err(|e| auth.reject(e))?;
    Ok(Json(page))
}

/// Re-render the detail page with the failed form's values and errors
async fn rejected_detalle(
    service: &Service,
    auth: &Authenticated,
    id: Id,
    form: Option<&str>,
    values: BTreeMap<String, String>,
    errors: FieldErrors,
) -> Result<Response, ApiError> {
    let mut page = detalle_page(service, id).await.map_err(|e| auth.reject(e))?;
    page.form = form.map(str::to_string);
    page.values = values;
    page.errors = errors.as_map().clone();
    Ok(unprocessable(page))
}

/// One of: register a stage, add a comment, upload an attachment
pub async fn detalle_submit(
    service: Arc<Service>,
    auth: Authenticated,
    Path(id): Path<Id>,
    mut form: SubmittedForm,
) -> Result<Response, ApiError> {
    let marker = DetalleAction::submitted(&form);
    let values = form.values();

    let action = match DetalleAction::decode(&mut form) {
        Ok(Some(action)) => action,
        Ok(None) => {
            let page = detalle_page(&service, id).await.map_err(|e| auth.reject(e))?;
            return Ok(Json(page).into_response());
        }
        Err(errors) => {
            return rejected_detalle(&service, &auth, id, marker, values, errors).await;
        }
    };

    let result = match action {
        DetalleAction::Etapa(evento) => service.create_etapa_causa(id, evento).await.map(drop),
        DetalleAction::Comentario(texto) => service
            .create_comentario(&auth.principal, id, &texto)
            .await
            .map(drop),
        DetalleAction::Adjunto(adjunto) => service.create_adjunto(id, adjunto).await.map(drop),
    };

    match result {
        Ok(()) => Ok(see_other(&detalle_url(id))),
        Err(CausasError::Validation { errors }) => {
            tracing::debug!(causa_id = id, form = ?marker, "detail form rejected");
            rejected_detalle(&service, &auth, id, marker, values, errors).await
        }
        Err(err) => Err(auth.reject(err)),
    }
}

// ===== Case create / edit =====

async fn form_page(
    service: &Service,
    causa: Option<Causa>,
    values: BTreeMap<String, String>,
    hidden: Vec<String>,
    errors: FieldErrors,
) -> Result<CausaFormPage, CausasError> {
    let adjuntos = match &causa {
        Some(causa) => service.list_adjuntos(causa.id).await?,
        None => Vec::new(),
    };

    Ok(CausaFormPage {
        causa: causa.map(Into::into),
        values,
        hidden,
        errors: errors.as_map().clone(),
        deudores: service.list_deudores().await?.into_iter().map(Into::into).collect(),
        tribunales: service.list_tribunales().await?.into_iter().map(Into::into).collect(),
        carteras: service.list_carteras().await?.into_iter().map(Into::into).collect(),
        usuarios: service.list_usuarios().await?.into_iter().map(Into::into).collect(),
        estados: estados(),
        adjuntos: adjuntos.into_iter().map(Into::into).collect(),
    })
}

/// Query parameters of the creation page
#[derive(Debug, Default, Deserialize)]
pub struct NuevaQuery {
    pub cartera_id: Option<String>,
}

/// Pre-filled cartera from the query, rendered as a hidden field
async fn preset_cartera(
    service: &Service,
    auth: &Authenticated,
    query: NuevaQuery,
) -> Result<Option<Id>, ApiError> {
    let Some(cartera_id) = parse_cartera_id(query.cartera_id)? else {
        return Ok(None);
    };
    let cartera = service.get_cartera(cartera_id).await.map_err(|e| auth.reject(e))?;
    Ok(Some(cartera.id))
}

fn hidden_cartera(cartera_id: Option<Id>) -> Vec<String> {
    cartera_id.map(|_| vec!["cartera".to_string()]).unwrap_or_default()
}

pub async fn nueva(
    service: Arc<Service>,
    auth: Authenticated,
    Query(query): Query<NuevaQuery>,
) -> Result<Json<CausaFormPage>, ApiError> {
    let cartera_id = preset_cartera(&service, &auth, query).await?;

    let mut values = nueva_form_values();
    if let Some(id) = cartera_id {
        values.insert("cartera".to_string(), id.to_string());
    }

    let page = form_page(&service, None, values, hidden_cartera(cartera_id), FieldErrors::new())
        .await
        .map_err(|e| auth.reject(e))?;
    Ok(Json(page))
}

pub async fn nueva_submit(
    service: Arc<Service>,
    auth: Authenticated,
    Query(query): Query<NuevaQuery>,
    form: SubmittedForm,
) -> Result<Response, ApiError> {
    let cartera_id = preset_cartera(&service, &auth, query).await?;
    let hidden = hidden_cartera(cartera_id);

    let outcome = match decode_causa_fields(&form) {
        Ok(fields) => service.create_causa(fields).await,
        Err(errors) => Err(CausasError::Validation { errors }),
    };

    match outcome {
        Ok(causa) => Ok(see_other(&detalle_url(causa.id))),
        Err(CausasError::Validation { errors }) => {
            let page = form_page(&service, None, form.values(), hidden, errors)
                .await
                .map_err(|e| auth.reject(e))?;
            Ok(unprocessable(page))
        }
        Err(err) => Err(auth.reject(err)),
    }
}

pub async fn editar(
    service: Arc<Service>,
    auth: Authenticated,
    Path(id): Path<Id>,
) -> Result<Json<CausaFormPage>, ApiError> {
    let causa = service.get_causa(id).await.map_err(|e| auth.reject(e))?;
    let values = causa_form_values(&CausaFields::from(&causa));
    let page = form_page(&service, Some(causa), values, Vec::new(), FieldErrors::new())
        .await
        .map_err(|e| auth.reject(e))?;
    Ok(Json(page))
}

/// Either update the case fields or upload an attachment from the edit page
pub async fn editar_submit(
    service: Arc<Service>,
    auth: Authenticated,
    Path(id): Path<Id>,
    mut form: SubmittedForm,
) -> Result<Response, ApiError> {
    let causa = service.get_causa(id).await.map_err(|e| auth.reject(e))?;
    let submitted = form.values();

    let (outcome, values) = match EdicionAction::decode(&mut form) {
        Ok(None) => {
            let values = causa_form_values(&CausaFields::from(&causa));
            let page = form_page(&service, Some(causa), values, Vec::new(), FieldErrors::new())
                .await
                .map_err(|e| auth.reject(e))?;
            return Ok(Json(page).into_response());
        }
        Ok(Some(EdicionAction::UpdateCausa(fields))) => {
            let outcome = service.update_causa(id, fields).await.map(|_| detalle_url(id));
            (outcome, submitted)
        }
        Ok(Some(EdicionAction::UploadAttachment(adjunto))) => {
            let outcome = service.create_adjunto(id, adjunto).await.map(|_| editar_url(id));
            (outcome, causa_form_values(&CausaFields::from(&causa)))
        }
        Err(errors) => {
            let values = match EdicionAction::submitted(&form) {
                Some("update_causa") => submitted,
                _ => causa_form_values(&CausaFields::from(&causa)),
            };
            (Err(CausasError::Validation { errors }), values)
        }
    };

    match outcome {
        Ok(location) => Ok(see_other(&location)),
        Err(CausasError::Validation { errors }) => {
            let page = form_page(&service, Some(causa), values, Vec::new(), errors)
                .await
                .map_err(|e| auth.reject(e))?;
            Ok(unprocessable(page))
        }
        Err(err) => Err(auth.reject(err)),
    }
}

// ===== Case delete =====

pub async fn eliminar(
    service: Arc<Service>,
    auth: Authenticated,
    Path(id): Path<Id>,
) -> Result<Json<EliminarPage>, ApiError> {
    let page = async {
        let causa = service.get_causa(id).await?;
        let deudor = service.get_deudor(causa.deudor_id).await?;
        Ok::<_, CausasError>(EliminarPage {
            historial: service.list_historial(id).await?.len(),
            comentarios: service.list_comentarios(id).await?.len(),
            adjuntos: service.list_adjuntos(id).await?.len(),
            causa: causa.into(),
            deudor: deudor.into(),
        })
    }
    .await
    .map_err(|e| auth.reject(e))?;
    Ok(Json(page))
}

pub async fn eliminar_submit(
    service: Arc<Service>,
    auth: Authenticated,
    Path(id): Path<Id>,
) -> Result<Response, ApiError> {
    service.delete_causa(id).await.map_err(|e| auth.reject(e))?;
    Ok(see_other(LISTADO_URL))
}

// ===== OpenAPI =====

pub async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    use utoipa::OpenApi;
    Json(super::routes::ApiDoc::openapi())
}
