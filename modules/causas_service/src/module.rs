//! Module declaration and lifecycle implementation

use crate::api::rest::auth::AuthSettings;
use crate::config::Config;
use crate::contract::CausasApi;
use crate::domain::Service;
use crate::infra::media::LocalMediaStore;
use crate::infra::storage::repositories::{
    SeaOrmCatalogRepository, SeaOrmCausaRepository, SeaOrmDeudorRepository,
    SeaOrmHistorialRepository,
};
use anyhow::Result;
use parking_lot::RwLock;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Causas service module
///
/// Lifecycle: [`CausasServiceModule::migrate`], then [`CausasServiceModule::init`],
/// then [`CausasServiceModule::register_rest`] or [`CausasServiceModule::native_client`].
pub struct CausasServiceModule {
    config: RwLock<Config>,
    service: RwLock<Option<Arc<Service>>>,
}

impl Default for CausasServiceModule {
    fn default() -> Self {
        Self {
            config: RwLock::new(Config::default()),
            service: RwLock::new(None),
        }
    }
}

impl CausasServiceModule {
    /// Wire repositories, media storage and the domain service
    pub async fn init(&self, cfg: Config, db: Arc<DatabaseConnection>) -> Result<()> {
        tokio::fs::create_dir_all(&cfg.media_root).await?;

        let catalog = Arc::new(SeaOrmCatalogRepository::new(db.clone()));
        let deudores = Arc::new(SeaOrmDeudorRepository::new(db.clone()));
        let causas = Arc::new(SeaOrmCausaRepository::new(db.clone()));
        let historial = Arc::new(SeaOrmHistorialRepository::new(db));
        let media = Arc::new(LocalMediaStore::new(cfg.media_root.clone()));

        let service = Arc::new(
            Service::new(catalog, deudores, causas, historial, media)
                .with_max_upload_bytes(cfg.max_upload_bytes),
        );

        tracing::info!(
            media_root = %cfg.media_root.display(),
            max_upload_bytes = cfg.max_upload_bytes,
            "Causas service initialized"
        );

        *self.config.write() = cfg;
        *self.service.write() = Some(service);
        Ok(())
    }

    /// Apply pending schema migrations
    pub async fn migrate(db: &DatabaseConnection) -> Result<()> {
        use crate::infra::storage::migrations::Migrator;
        use sea_orm_migration::MigratorTrait;

        Migrator::up(db, None).await?;
        tracing::info!("Causas service migrations completed");
        Ok(())
    }

    pub fn config(&self) -> Config {
        self.config.read().clone()
    }

    pub fn service(&self) -> Result<Arc<Service>> {
        self.service
            .read()
            .as_ref()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Service not initialized"))
    }

    /// In-process client for callers that do not go through HTTP
    pub fn native_client(&self) -> Result<Arc<dyn CausasApi>> {
        Ok(Arc::new(crate::api::native::NativeClient::new(self.service()?)))
    }

    /// Mount the HTTP routes on `router`
    pub fn register_rest(&self, router: axum::Router) -> Result<axum::Router> {
        let service = self.service()?;
        let cfg = self.config();
        let auth = Arc::new(AuthSettings::new(&cfg.jwt_secret, &cfg.login_url)?);

        tracing::info!("Registering causas service REST routes");
        crate::api::rest::routes::register_routes(router, service, auth, &cfg)
    }
}
