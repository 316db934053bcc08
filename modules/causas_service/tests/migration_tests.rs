//! Integration tests for the schema migrations
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use causas_service::infra::storage::migrations::Migrator;
use causas_service::CausasServiceModule;
use common::print_test_header;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;

#[tokio::test]
async fn test_migrate_twice_records_each_migration_once() {
    print_test_header(
        "test_migrate_twice_records_each_migration_once",
        &["Verify a restart re-running migrations is a no-op and every migration has its own version."],
    );

    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("causas.db").display());
    let db = Database::connect(&url).await.unwrap();

    println!("\n📝 Stage 1: Apply migrations on a fresh database");
    CausasServiceModule::migrate(&db).await.unwrap();

    println!("\n📝 Stage 2: Apply again, as serve does on every start");
    CausasServiceModule::migrate(&db).await.unwrap();
    assert!(Migrator::get_pending_migrations(&db).await.unwrap().is_empty());

    let mut versions: Vec<String> = Migrator::get_migration_models(&db)
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.version)
        .collect();
    versions.sort();
    assert_eq!(
        versions,
        [
            "m20261001_000001_create_catalogos",
            "m20261001_000002_create_deudores_causas",
            "m20261001_000003_create_historial",
            "m20261001_000004_create_antecedentes",
        ]
    );
    println!("✅ {} migrations recorded once each", versions.len());
}
