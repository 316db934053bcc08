//! Router tests: page models, form posts and redirects over HTTP
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use causas_service::contract::*;
use chrono::NaiveDate;
use common::{print_test_header, TestApp, RUT_A};
use serde_json::Value;
use tower::ServiceExt;

const FORM: &str = "application/x-www-form-urlencoded";

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

fn get(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

fn post_form(uri: &str, cookie: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, FORM)
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// App with one user session, one debtor and one stage
struct Fixture {
    app: TestApp,
    cookie: String,
    usuario: Usuario,
    deudor: Deudor,
    etapa: Etapa,
}

async fn fixture() -> Fixture {
    let app = TestApp::new().await;
    let usuario = app.usuario("abogada").await;
    let cookie = app.session_cookie(&usuario);
    let deudor = app.deudor(RUT_A).await;
    let etapa = app.etapa("Notificación").await;
    Fixture {
        app,
        cookie,
        usuario,
        deudor,
        etapa,
    }
}

// ===== Authentication =====

#[tokio::test]
async fn test_unauthenticated_requests_redirect_to_login() {
    print_test_header(
        "test_unauthenticated_requests_redirect_to_login",
        &["Verify protected pages answer 303 to the login URL with the original path."],
    );

    let f = fixture().await;
    let router = f.app.router();

    let response = router
        .clone()
        .oneshot(Request::builder().uri("/causas/?estado=ACTIVO").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/cuentas/login/?next=%2Fcausas%2F%3Festado%3DACTIVO"
    );

    let response = router
        .oneshot(get("/", "session=not-a-token"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/cuentas/login/?next=%2F");
    println!("✅ Login redirects issued");
}

#[tokio::test]
async fn test_dashboard_page_accepts_bearer_token() {
    let f = fixture().await;
    f.app.causa("C-1-2024", &f.deudor, EstadoCausa::Activo).await;
    f.app.causa("C-2-2024", &f.deudor, EstadoCausa::Archivado).await;

    let request = Request::builder()
        .uri("/")
        .header(
            header::AUTHORIZATION,
            format!("Bearer {}", f.app.token(&f.usuario)),
        )
        .body(Body::empty())
        .unwrap();
    let response = f.app.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let page = json_body(response).await;
    assert_eq!(page["usuario"], "abogada");
    assert_eq!(page["dashboard"]["total"], 2);
    assert_eq!(page["dashboard"]["activas"], 1);
    assert_eq!(page["dashboard"]["archivadas"], 1);
    assert_eq!(page["dashboard"]["labels"][0], "Activo");
}

// ===== Case list =====

#[tokio::test]
async fn test_list_page_filters_by_estado() {
    let f = fixture().await;
    let a = f.app.causa("C-1-2024", &f.deudor, EstadoCausa::Activo).await;
    let b = f.app.causa("C-2-2024", &f.deudor, EstadoCausa::Activo).await;
    f.app.causa("C-3-2024", &f.deudor, EstadoCausa::Recuperado).await;

    let response = f
        .app
        .router()
        .oneshot(get("/causas/?estado=ACTIVO", &f.cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let page = json_body(response).await;
    assert_eq!(page["total"], 2);
    assert_eq!(page["estado"], "ACTIVO");
    assert_eq!(page["items"][0]["causa"]["id"], b.id);
    assert_eq!(page["items"][1]["causa"]["id"], a.id);
    assert_eq!(page["items"][0]["etapa_actual"], SIN_ETAPA);
    assert_eq!(page["items"][0]["deudor"]["nombre_completo"], "Juan Pérez Soto");
}

#[tokio::test]
async fn test_list_page_rejects_bad_filters() {
    let f = fixture().await;
    let router = f.app.router();

    let response = router
        .clone()
        .oneshot(get("/causas/?estado=CERRADO", &f.cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = router
        .oneshot(get("/causas/?cartera_id=999", &f.cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ===== Case detail =====

#[tokio::test]
async fn test_stage_form_without_date_is_rejected() {
    print_test_header(
        "test_stage_form_without_date_is_rejected",
        &["Verify posting the stage form with no date answers 422 and stores nothing."],
    );

    let f = fixture().await;
    let causa = f.app.causa("C-9-2024", &f.deudor, EstadoCausa::Activo).await;
    let uri = format!("/causas/{}/", causa.id);

    let body = format!("submit_etapa=1&etapa={}&fecha=&descripcion=Receptor", f.etapa.id);
    let response = f
        .app
        .router()
        .oneshot(post_form(&uri, &f.cookie, &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let page = json_body(response).await;
    println!("   Errors: {}", page["errors"]);
    assert_eq!(page["form"], "submit_etapa");
    assert_eq!(page["errors"]["fecha"][0], "Este campo es obligatorio.");
    assert_eq!(page["values"]["descripcion"], "Receptor");
    assert_eq!(page["causa"]["id"], causa.id);

    assert!(f.app.service.list_historial(causa.id).await.unwrap().is_empty());
    println!("✅ Nothing persisted");
}

#[tokio::test]
async fn test_detail_post_without_marker_renders_page() {
    let f = fixture().await;
    let causa = f.app.causa("C-9-2024", &f.deudor, EstadoCausa::Activo).await;
    let uri = format!("/causas/{}/", causa.id);

    let response = f
        .app
        .router()
        .oneshot(post_form(&uri, &f.cookie, "texto=hola"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let page = json_body(response).await;
    assert_eq!(page["etapa_actual"], SIN_ETAPA);
    assert_eq!(page["etapas"][0]["nombre"], "Notificación");
    assert!(f.app.service.list_comentarios(causa.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_detail_forms_redirect_on_success() {
    print_test_header(
        "test_detail_forms_redirect_on_success",
        &["Verify stage and comment forms store their record and redirect to the detail page."],
    );

    let f = fixture().await;
    let causa = f.app.causa("C-9-2024", &f.deudor, EstadoCausa::Activo).await;
    let uri = format!("/causas/{}/", causa.id);
    let router = f.app.router();

    println!("\n📝 Stage 1: Register a stage");
    let body = format!(
        "submit_etapa=1&etapa={}&fecha=05-03-2024&costas=%2415.000",
        f.etapa.id
    );
    let response = router
        .clone()
        .oneshot(post_form(&uri, &f.cookie, &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), uri);

    let historial = f.app.service.list_historial(causa.id).await.unwrap();
    assert_eq!(historial.len(), 1);
    assert_eq!(historial[0].fecha, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    assert_eq!(historial[0].costas, 15_000);

    println!("\n📝 Stage 2: Add a comment");
    let response = router
        .clone()
        .oneshot(post_form(&uri, &f.cookie, "submit_comentario=1&texto=Notificado+por+c%C3%A9dula"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let comentarios = f.app.service.list_comentarios(causa.id).await.unwrap();
    assert_eq!(comentarios.len(), 1);
    assert_eq!(comentarios[0].texto, "Notificado por cédula");
    assert_eq!(comentarios[0].autor_id, f.usuario.id);

    println!("\n📝 Stage 3: Detail page reflects both");
    let page = json_body(router.oneshot(get(&uri, &f.cookie)).await.unwrap()).await;
    assert_eq!(page["etapa_actual"], "Notificación");
    assert_eq!(page["comentarios"][0]["autor"], "abogada");
    println!("✅ Detail forms stored and redirected");
}

#[tokio::test]
async fn test_detail_of_missing_causa_is_not_found() {
    let f = fixture().await;
    let response = f
        .app
        .router()
        .oneshot(get("/causas/404/", &f.cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ===== Create / edit =====

#[tokio::test]
async fn test_nueva_page_prefills_cartera() {
    let f = fixture().await;
    let cartera = f.app.service.create_cartera("Banco Andino").await.unwrap();
    let router = f.app.router();

    let uri = format!("/causas/nueva/?cartera_id={}", cartera.id);
    let response = router.clone().oneshot(get(&uri, &f.cookie)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let page = json_body(response).await;
    assert_eq!(page["values"]["cartera"], cartera.id.to_string());
    assert_eq!(page["values"]["estado"], "ACTIVO");
    assert_eq!(page["hidden"][0], "cartera");
    assert_eq!(page["deudores"][0]["id"], f.deudor.id);
    assert_eq!(page["estados"].as_array().unwrap().len(), 4);

    let response = router
        .oneshot(get("/causas/nueva/?cartera_id=999", &f.cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_nueva_post_creates_or_reports_errors() {
    let f = fixture().await;
    let router = f.app.router();

    let response = router
        .clone()
        .oneshot(post_form("/causas/nueva/", &f.cookie, "rol=&estado=ACTIVO"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let page = json_body(response).await;
    assert!(page["errors"]["deudor"].is_array());
    assert!(f.app.service.list_causas(CausaFilter::default()).await.unwrap().is_empty());

    let body = format!(
        "rol=C-77-2024&estado=ACTIVO&deudor={}&total_costas=1.250.000",
        f.deudor.id
    );
    let response = router
        .oneshot(post_form("/causas/nueva/", &f.cookie, &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let causas = f.app.service.list_causas(CausaFilter::default()).await.unwrap();
    assert_eq!(causas.len(), 1);
    assert_eq!(causas[0].causa.total_costas, 1_250_000);
    assert_eq!(location(&response), format!("/causas/{}/", causas[0].causa.id));
}

#[tokio::test]
async fn test_editar_branches_on_marker() {
    print_test_header(
        "test_editar_branches_on_marker",
        &["Verify the edit page updates fields or uploads a file depending on the submit button."],
    );

    let f = fixture().await;
    let causa = f.app.causa("C-5-2024", &f.deudor, EstadoCausa::Activo).await;
    let uri = format!("/causas/{}/editar/", causa.id);
    let router = f.app.router();

    println!("\n📝 Stage 1: No marker renders the edit page");
    let response = router
        .clone()
        .oneshot(post_form(&uri, &f.cookie, ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = json_body(response).await;
    assert_eq!(page["values"]["rol"], "C-5-2024");

    println!("\n📝 Stage 2: Upload an attachment (multipart)");
    let boundary = "causasboundary";
    let multipart = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"upload_attachment\"\r\n\r\n1\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"descripcion\"\r\n\r\nEscrito\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"archivo\"; filename=\"escrito.pdf\"\r\n\
         Content-Type: application/pdf\r\n\r\n%PDF-1.4\r\n--{b}--\r\n",
        b = boundary
    );
    let request = Request::builder()
        .method("POST")
        .uri(&uri)
        .header(header::COOKIE, &f.cookie)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(multipart))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), uri);

    let adjuntos = f.app.service.list_adjuntos(causa.id).await.unwrap();
    assert_eq!(adjuntos.len(), 1);
    assert_eq!(adjuntos[0].nombre_original, "escrito.pdf");
    assert_eq!(adjuntos[0].descripcion, "Escrito");

    println!("\n📝 Stage 3: Update the case");
    let body = format!(
        "update_causa=1&rol=C-5-2024&estado=SUSPENDIDO&deudor={}&fecha_asignacion=2024-02-01",
        f.deudor.id
    );
    let response = router
        .clone()
        .oneshot(post_form(&uri, &f.cookie, &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/causas/{}/", causa.id));
    let updated = f.app.service.get_causa(causa.id).await.unwrap();
    assert_eq!(updated.estado, EstadoCausa::Suspendido);

    println!("\n📝 Stage 4: Invalid update is re-rendered");
    let body = format!("update_causa=1&rol=C-5-2024&estado=CERRADO&deudor={}", f.deudor.id);
    let response = router
        .oneshot(post_form(&uri, &f.cookie, &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let page = json_body(response).await;
    assert!(page["errors"]["estado"].is_array());
    assert_eq!(page["values"]["estado"], "CERRADO");
    assert_eq!(page["adjuntos"].as_array().unwrap().len(), 1);
    println!("✅ Edit page branches handled");
}

// ===== Delete =====

#[tokio::test]
async fn test_eliminar_confirms_then_deletes() {
    let f = fixture().await;
    let causa = f.app.causa("C-6-2024", &f.deudor, EstadoCausa::Activo).await;
    let uri = format!("/causas/{}/eliminar/", causa.id);
    let router = f.app.router();

    let page = json_body(router.clone().oneshot(get(&uri, &f.cookie)).await.unwrap()).await;
    assert_eq!(page["causa"]["rol"], "C-6-2024");
    assert_eq!(page["historial"], 0);

    let response = router
        .oneshot(post_form(&uri, &f.cookie, ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/causas/");

    assert!(matches!(
        f.app.service.get_causa(causa.id).await,
        Err(CausasError::NotFound { .. })
    ));
    assert_eq!(f.app.service.get_deudor(f.deudor.id).await.unwrap(), f.deudor);
}

// ===== OpenAPI =====

#[tokio::test]
async fn test_openapi_document_lists_page_models() {
    let f = fixture().await;
    let response = f
        .app
        .router()
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let doc = json_body(response).await;
    let schemas = &doc["components"]["schemas"];
    assert!(schemas["CausaDto"].is_object());
    assert!(schemas["CausaDetallePage"].is_object());
    assert!(schemas["DashboardPage"].is_object());
}
