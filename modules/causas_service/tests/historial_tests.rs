//! Integration tests for stage history, comments and attachments
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use causas_service::contract::*;
use chrono::NaiveDate;
use common::{print_test_header, TestApp, RUT_A, RUT_B};

fn fecha(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn evento(etapa: &Etapa, fecha: NaiveDate) -> NewEtapaCausa {
    NewEtapaCausa {
        etapa_id: Some(etapa.id),
        fecha: Some(fecha),
        descripcion: String::new(),
        costas: 0,
    }
}

// ===== Current stage =====

#[tokio::test]
async fn test_etapa_actual_without_history_is_sentinel() {
    let app = TestApp::new().await;
    let deudor = app.deudor(RUT_A).await;
    let causa = app.causa("C-1-2024", &deudor, EstadoCausa::Activo).await;

    let actual = app.service.etapa_actual(causa.id).await.unwrap();
    assert_eq!(actual, EtapaActual::SinRegistro);
    assert_eq!(actual.to_string(), SIN_ETAPA);
}

#[tokio::test]
async fn test_etapa_actual_follows_latest_date() {
    print_test_header(
        "test_etapa_actual_follows_latest_date",
        &["Verify the current stage is the one with the latest date, not the latest insert."],
    );

    let app = TestApp::new().await;
    let deudor = app.deudor(RUT_A).await;
    let causa = app.causa("C-2-2024", &deudor, EstadoCausa::Activo).await;
    let demanda = app.etapa("Demanda").await;
    let notificacion = app.etapa("Notificación").await;
    let embargo = app.etapa("Embargo").await;

    println!("\n📝 Stage 1: Register events out of date order");
    app.service
        .create_etapa_causa(causa.id, evento(&demanda, fecha(2024, 1, 10)))
        .await
        .unwrap();
    app.service
        .create_etapa_causa(causa.id, evento(&embargo, fecha(2024, 4, 2)))
        .await
        .unwrap();
    app.service
        .create_etapa_causa(causa.id, evento(&notificacion, fecha(2024, 2, 20)))
        .await
        .unwrap();

    println!("\n📝 Stage 2: Verify projection and ordering");
    let actual = app.service.etapa_actual(causa.id).await.unwrap();
    assert_eq!(actual.nombre(), "Embargo");
    assert_eq!(
        actual,
        EtapaActual::Registrada {
            etapa_id: embargo.id,
            nombre: "Embargo".into(),
            fecha: fecha(2024, 4, 2),
        }
    );

    let historial = app.service.list_historial(causa.id).await.unwrap();
    let nombres: Vec<&str> = historial.iter().map(|e| e.etapa_nombre.as_str()).collect();
    assert_eq!(nombres, ["Embargo", "Notificación", "Demanda"]);

    let listado = app.service.list_causas(CausaFilter::default()).await.unwrap();
    assert_eq!(listado[0].etapa_actual.nombre(), "Embargo");
    println!("✅ Current stage is {}", actual);
}

#[tokio::test]
async fn test_etapa_actual_same_date_prefers_newest_event() {
    let app = TestApp::new().await;
    let deudor = app.deudor(RUT_A).await;
    let causa = app.causa("C-3-2024", &deudor, EstadoCausa::Activo).await;
    let primera = app.etapa("Mandamiento").await;
    let segunda = app.etapa("Requerimiento de pago").await;

    let dia = fecha(2024, 7, 1);
    app.service
        .create_etapa_causa(causa.id, evento(&primera, dia))
        .await
        .unwrap();
    app.service
        .create_etapa_causa(causa.id, evento(&segunda, dia))
        .await
        .unwrap();

    let actual = app.service.etapa_actual(causa.id).await.unwrap();
    assert_eq!(actual.nombre(), "Requerimiento de pago");
}

#[tokio::test]
async fn test_etapa_causa_validation() {
    print_test_header(
        "test_etapa_causa_validation",
        &["Verify missing date or stage and unknown stage are rejected with nothing stored."],
    );

    let app = TestApp::new().await;
    let deudor = app.deudor(RUT_A).await;
    let causa = app.causa("C-4-2024", &deudor, EstadoCausa::Activo).await;
    let etapa = app.etapa("Demanda").await;

    let sin_fecha = NewEtapaCausa {
        etapa_id: Some(etapa.id),
        ..Default::default()
    };
    match app.service.create_etapa_causa(causa.id, sin_fecha).await.unwrap_err() {
        CausasError::Validation { errors } => {
            assert_eq!(errors.get("fecha").unwrap(), ["Este campo es obligatorio."]);
        }
        other => panic!("Expected Validation, got {:?}", other),
    }

    let etapa_inexistente = NewEtapaCausa {
        etapa_id: Some(etapa.id + 50),
        fecha: Some(fecha(2024, 1, 1)),
        ..Default::default()
    };
    match app
        .service
        .create_etapa_causa(causa.id, etapa_inexistente)
        .await
        .unwrap_err()
    {
        CausasError::Validation { errors } => assert!(errors.contains("etapa")),
        other => panic!("Expected Validation, got {:?}", other),
    }

    let costas_negativas = NewEtapaCausa {
        costas: -1,
        ..evento(&etapa, fecha(2024, 1, 1))
    };
    assert!(matches!(
        app.service.create_etapa_causa(causa.id, costas_negativas).await,
        Err(CausasError::Validation { .. })
    ));

    assert!(app.service.list_historial(causa.id).await.unwrap().is_empty());
    assert!(matches!(
        app.service
            .create_etapa_causa(causa.id + 1, evento(&etapa, fecha(2024, 1, 1)))
            .await,
        Err(CausasError::NotFound { .. })
    ));
    println!("✅ Invalid events rejected");
}

// ===== Comments =====

#[tokio::test]
async fn test_comentario_records_author() {
    let app = TestApp::new().await;
    let usuario = app.usuario("mlopez").await;
    let deudor = app.deudor(RUT_A).await;
    let causa = app.causa("C-5-2024", &deudor, EstadoCausa::Activo).await;
    let principal = Principal {
        usuario_id: usuario.id,
        username: usuario.username.clone(),
    };

    let comentario = app
        .service
        .create_comentario(&principal, causa.id, "  Llamar al tribunal  ")
        .await
        .unwrap();
    assert_eq!(comentario.texto, "Llamar al tribunal");
    assert_eq!(comentario.autor_id, usuario.id);
    assert_eq!(comentario.autor_username, "mlopez");

    assert!(matches!(
        app.service.create_comentario(&principal, causa.id, "   ").await,
        Err(CausasError::Validation { .. })
    ));
    assert_eq!(app.service.list_comentarios(causa.id).await.unwrap(), vec![comentario]);
}

// ===== Attachments =====

#[tokio::test]
async fn test_adjunto_is_stored_under_media_root() {
    print_test_header(
        "test_adjunto_is_stored_under_media_root",
        &["Verify an upload lands under adjuntos/ with a sanitized name and its record points to it."],
    );

    let app = TestApp::new().await;
    let deudor = app.deudor(RUT_A).await;
    let causa = app.causa("C-6-2024", &deudor, EstadoCausa::Activo).await;

    let adjunto = app
        .service
        .create_adjunto(
            causa.id,
            NewAdjunto {
                etapa_causa_id: None,
                descripcion: "Escritura".into(),
                archivo: Some(Upload {
                    nombre: "../escritura pública.pdf".into(),
                    content_type: Some("application/pdf".into()),
                    bytes: b"contenido".to_vec(),
                }),
            },
        )
        .await
        .unwrap();

    println!("   Stored at: {}", adjunto.archivo);
    assert!(adjunto.archivo.starts_with("adjuntos/"));
    assert!(!adjunto.archivo.contains(".."));
    assert_eq!(adjunto.causa_id, Some(causa.id));
    assert_eq!(adjunto.descripcion, "Escritura");

    let stored = std::fs::read(app.media_root.join(&adjunto.archivo)).unwrap();
    assert_eq!(stored, b"contenido");
    assert_eq!(app.service.list_adjuntos(causa.id).await.unwrap(), vec![adjunto]);
}

#[tokio::test]
async fn test_adjunto_validation() {
    let app = TestApp::new().await;
    let deudor = app.deudor(RUT_A).await;
    let otro = app.deudor(RUT_B).await;
    let causa = app.causa("C-7-2024", &deudor, EstadoCausa::Activo).await;
    let ajena = app.causa("C-8-2024", &otro, EstadoCausa::Activo).await;
    let etapa = app.etapa("Demanda").await;
    let evento_ajeno = app
        .service
        .create_etapa_causa(ajena.id, evento(&etapa, fecha(2024, 2, 1)))
        .await
        .unwrap();

    let sin_archivo = NewAdjunto::default();
    match app.service.create_adjunto(causa.id, sin_archivo).await.unwrap_err() {
        CausasError::Validation { errors } => assert!(errors.contains("archivo")),
        other => panic!("Expected Validation, got {:?}", other),
    }

    let vacio = NewAdjunto {
        archivo: Some(Upload {
            nombre: "vacio.txt".into(),
            content_type: None,
            bytes: Vec::new(),
        }),
        ..Default::default()
    };
    assert!(matches!(
        app.service.create_adjunto(causa.id, vacio).await,
        Err(CausasError::Validation { .. })
    ));

    // Events of another case cannot own this case's attachments
    let cruzado = NewAdjunto {
        etapa_causa_id: Some(evento_ajeno.id),
        archivo: Some(Upload {
            nombre: "acta.pdf".into(),
            content_type: None,
            bytes: b"x".to_vec(),
        }),
        ..Default::default()
    };
    match app.service.create_adjunto(causa.id, cruzado).await.unwrap_err() {
        CausasError::Validation { errors } => assert!(errors.contains("etapa_causa")),
        other => panic!("Expected Validation, got {:?}", other),
    }

    assert!(app.service.list_adjuntos(causa.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_causas_projects_each_current_stage() {
    print_test_header(
        "test_list_causas_projects_each_current_stage",
        &["Verify the list carries every case's own latest stage, and the sentinel for cases without history."],
    );

    let app = TestApp::new().await;
    let deudor = app.deudor(RUT_A).await;
    let otro = app.deudor(RUT_B).await;
    let primera = app.causa("C-20-2024", &deudor, EstadoCausa::Activo).await;
    let segunda = app.causa("C-21-2024", &otro, EstadoCausa::Activo).await;
    let sin_historia = app.causa("C-22-2024", &deudor, EstadoCausa::Suspendido).await;
    let demanda = app.etapa("Demanda").await;
    let embargo = app.etapa("Embargo").await;
    let remate = app.etapa("Remate").await;

    println!("\n📝 Stage 1: Interleave events of two cases");
    app.service
        .create_etapa_causa(primera.id, evento(&embargo, fecha(2024, 5, 1)))
        .await
        .unwrap();
    app.service
        .create_etapa_causa(segunda.id, evento(&remate, fecha(2024, 6, 1)))
        .await
        .unwrap();
    app.service
        .create_etapa_causa(primera.id, evento(&demanda, fecha(2024, 1, 1)))
        .await
        .unwrap();
    app.service
        .create_etapa_causa(segunda.id, evento(&demanda, fecha(2024, 6, 1)))
        .await
        .unwrap();

    println!("\n📝 Stage 2: Verify the list projection");
    let listado = app.service.list_causas(CausaFilter::default()).await.unwrap();
    let etapas: Vec<(Id, String)> = listado
        .iter()
        .map(|r| (r.causa.id, r.etapa_actual.to_string()))
        .collect();
    assert_eq!(
        etapas,
        [
            (sin_historia.id, SIN_ETAPA.to_string()),
            (segunda.id, "Demanda".to_string()),
            (primera.id, "Embargo".to_string()),
        ]
    );

    for resumen in &listado {
        assert_eq!(
            resumen.etapa_actual,
            app.service.etapa_actual(resumen.causa.id).await.unwrap()
        );
    }
    println!("✅ {} cases listed with their own stage", listado.len());
}

#[tokio::test]
async fn test_adjunto_with_overlong_name_is_rejected() {
    let app = TestApp::new().await;
    let deudor = app.deudor(RUT_A).await;
    let causa = app.causa("C-23-2024", &deudor, EstadoCausa::Activo).await;

    let adjunto = NewAdjunto {
        archivo: Some(Upload {
            nombre: format!("{}.pdf", "x".repeat(300)),
            content_type: None,
            bytes: b"x".to_vec(),
        }),
        ..Default::default()
    };
    match app.service.create_adjunto(causa.id, adjunto).await.unwrap_err() {
        CausasError::Validation { errors } => assert!(errors.contains("archivo")),
        other => panic!("Expected Validation, got {:?}", other),
    }

    assert!(app.service.list_adjuntos(causa.id).await.unwrap().is_empty());
    assert!(!app.media_root.join("adjuntos").exists());
}
