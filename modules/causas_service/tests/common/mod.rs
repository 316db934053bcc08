//! Common test utilities: a migrated SQLite store in a temp dir plus seed helpers
#![allow(dead_code)]

use axum::Router;
use causas_service::api::rest::auth::{AuthSettings, SESSION_COOKIE};
use causas_service::contract::{
    Causa, CausaFields, Deudor, Etapa, EstadoCausa, NewDeudor, Principal, Usuario,
};
use causas_service::domain::Service;
use causas_service::{CausasServiceModule, Config};
use sea_orm::{Database, DatabaseConnection};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const JWT_SECRET: &str = "test-secret";
pub const LOGIN_URL: &str = "/cuentas/login/";

/// Fully wired module on a throwaway database and media root
pub struct TestApp {
    pub module: CausasServiceModule,
    pub service: Arc<Service>,
    pub db: Arc<DatabaseConnection>,
    pub media_root: PathBuf,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("causas.db").display());
        let db = Arc::new(Database::connect(&url).await.unwrap());
        CausasServiceModule::migrate(&db).await.unwrap();

        let media_root = dir.path().join("media");
        let config = Config {
            media_root: media_root.clone(),
            jwt_secret: JWT_SECRET.to_string(),
            login_url: LOGIN_URL.to_string(),
            ..Config::default()
        };

        let module = CausasServiceModule::default();
        module.init(config, db.clone()).await.unwrap();
        let service = module.service().unwrap();

        Self {
            module,
            service,
            db,
            media_root,
            _dir: dir,
        }
    }

    pub fn router(&self) -> Router {
        self.module.register_rest(Router::new()).unwrap()
    }

    /// Session token for `usuario`, valid for an hour
    pub fn token(&self, usuario: &Usuario) -> String {
        let settings = AuthSettings::new(JWT_SECRET, LOGIN_URL).unwrap();
        let principal = Principal {
            usuario_id: usuario.id,
            username: usuario.username.clone(),
        };
        settings
            .issue_token(&principal, Duration::from_secs(3600))
            .unwrap()
    }

    pub fn session_cookie(&self, usuario: &Usuario) -> String {
        format!("{}={}", SESSION_COOKIE, self.token(usuario))
    }

    pub async fn usuario(&self, username: &str) -> Usuario {
        self.service.create_usuario(username, "Abogada de prueba").await.unwrap()
    }

    pub async fn deudor(&self, rut: &str) -> Deudor {
        self.service
            .create_deudor(NewDeudor {
                nombres: "Juan".into(),
                apellidos: "Pérez Soto".into(),
                rut: rut.into(),
                direccion: "Av. Providencia 1234".into(),
                comuna: "Providencia".into(),
            })
            .await
            .unwrap()
    }

    pub async fn causa(&self, rol: &str, deudor: &Deudor, estado: EstadoCausa) -> Causa {
        let mut fields = CausaFields::new(rol, deudor.id);
        fields.estado = estado;
        self.service.create_causa(fields).await.unwrap()
    }

    /// A stage under a fresh stage type
    pub async fn etapa(&self, nombre: &str) -> Etapa {
        let tipo = self
            .service
            .create_tipo_etapa(&format!("Tipo {}", nombre))
            .await
            .unwrap();
        self.service.create_etapa(nombre, tipo.id).await.unwrap()
    }
}

pub fn print_test_header(test_name: &str, purpose: &[&str]) {
    println!("\n🧪 TEST: {}", test_name);
    if let Some(first) = purpose.first() {
        println!("📋 PURPOSE: {}", first);
    }
    for line in purpose.iter().skip(1) {
        println!("   {}", line);
    }
}

/// Valid RUTs, check digit included
pub const RUT_A: &str = "12.345.678-5";
pub const RUT_B: &str = "11111111-1";
pub const RUT_C: &str = "7654321-6";
