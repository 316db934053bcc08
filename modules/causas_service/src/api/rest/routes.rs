//! Route registration and the OpenAPI document

use super::auth::{AuthSettings, Authenticated};
use super::error::ApiError;
use super::forms::SubmittedForm;
use super::{dto::*, handlers};
use crate::config::Config;
use crate::contract::Id;
use crate::domain::Service;
use axum::{
    extract::{DefaultBodyLimit, Path, Query},
    response::Response,
    routing::get,
    Extension, Json, Router,
};
use std::sync::Arc;
use tower_http::timeout::TimeoutLayer;
use utoipa::OpenApi;

/// Room for form fields and multipart framing on top of the file itself
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Schemas of every page model
#[derive(OpenApi)]
#[openapi(
    info(title = "Causas", description = "Judicial case records"),
    components(schemas(
        UsuarioDto,
        TribunalDto,
        CarteraDto,
        EtapaDto,
        EstadoOptionDto,
        DeudorDto,
        CausaDto,
        CausaListItemDto,
        CausaListPage,
        EtapaCausaDto,
        ArchivoAdjuntoDto,
        ComentarioDto,
        AntecedentesLeasingDto,
        AntecedentesCbrDto,
        CausaDetallePage,
        CausaFormPage,
        EliminarPage,
        DashboardDto,
        DashboardPage,
    ))
)]
pub struct ApiDoc;

/// Register all REST routes
pub fn register_routes(
    router: Router,
    service: Arc<Service>,
    auth: Arc<AuthSettings>,
    cfg: &Config,
) -> anyhow::Result<Router> {
    let body_limit = cfg.max_upload_bytes.saturating_add(FORM_OVERHEAD_BYTES);

    let router = router
        .route("/", get(dashboard_handler))
        .route("/causas/", get(list_causas_handler))
        .route("/causas/nueva/", get(nueva_handler).post(nueva_submit_handler))
        .route("/causas/{id}/", get(detalle_handler).post(detalle_submit_handler))
        .route("/causas/{id}/editar/", get(editar_handler).post(editar_submit_handler))
        .route(
            "/causas/{id}/eliminar/",
            get(eliminar_handler).post(eliminar_submit_handler),
        )
        .route("/api-docs/openapi.json", get(handlers::openapi))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::new(cfg.request_timeout))
        .layer(Extension(auth))
        // Add service as extension for handlers
        .layer(Extension(service));

    Ok(router)
}

// ===== Handler wrappers that extract service from Extension =====

async fn dashboard_handler(
    Extension(service): Extension<Arc<Service>>,
    auth: Authenticated,
) -> Result<Json<DashboardPage>, ApiError> {
    handlers::dashboard(service, auth).await
}

async fn list_causas_handler(
    Extension(service): Extension<Arc<Service>>,
    auth: Authenticated,
    query: Query<handlers::ListCausasQuery>,
) -> Result<Json<CausaListPage>, ApiError> {
    handlers::list_causas(service, auth, query).await
}

async fn detalle_handler(
    Extension(service): Extension<Arc<Service>>,
    auth: Authenticated,
    path: Path<Id>,
) -> Result<Json<CausaDetallePage>, ApiError> {
    handlers::detalle(service, auth, path).await
}

async fn detalle_submit_handler(
    Extension(service): Extension<Arc<Service>>,
    auth: Authenticated,
    path: Path<Id>,
    form: SubmittedForm,
) -> Result<Response, ApiError> {
    handlers::detalle_submit(service, auth, path, form).await
}

async fn nueva_handler(
    Extension(service): Extension<Arc<Service>>,
    auth: Authenticated,
    query: Query<handlers::NuevaQuery>,
) -> Result<Json<CausaFormPage>, ApiError> {
    handlers::nueva(service, auth, query).await
}

async fn nueva_submit_handler(
    Extension(service): Extension<Arc<Service>>,
    auth: Authenticated,
    query: Query<handlers::NuevaQuery>,
    form: SubmittedForm,
) -> Result<Response, ApiError> {
    handlers::nueva_submit(service, auth, query, form).await
}

async fn editar_handler(
    Extension(service): Extension<Arc<Service>>,
    auth: Authenticated,
    path: Path<Id>,
) -> Result<Json<CausaFormPage>, ApiError> {
    handlers::editar(service, auth, path).await
}

async fn editar_submit_handler(
    Extension(service): Extension<Arc<Service>>,
    auth: Authenticated,
    path: Path<Id>,
    form: SubmittedForm,
) -> Result<Response, ApiError> {
    handlers::editar_submit(service, auth, path, form).await
}

async fn eliminar_handler(
    Extension(service): Extension<Arc<Service>>,
    auth: Authenticated,
    path: Path<Id>,
) -> Result<Json<EliminarPage>, ApiError> {
    handlers::eliminar(service, auth, path).await
}

async fn eliminar_submit_handler(
    Extension(service): Extension<Arc<Service>>,
    auth: Authenticated,
    path: Path<Id>,
) -> Result<Response, ApiError> {
    handlers::eliminar_submit(service, auth, path).await
}
