//! Database migrations for the causas service

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_catalogos::Migration),
            Box::new(m20261001_000002_create_deudores_causas::Migration),
            Box::new(m20261001_000003_create_historial::Migration),
            Box::new(m20261001_000004_create_antecedentes::Migration),
        ]
    }
}

/// Integer identity column shared by every table with a surrogate key
fn id_column<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

mod m20261001_000001_create_catalogos {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20261001_000001_create_catalogos"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Usuarios::Table)
                        .if_not_exists()
                        .col(&mut id_column(Usuarios::Id))
                        .col(
                            ColumnDef::new(Usuarios::Username)
                                .string_len(150)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Usuarios::Nombre).string_len(200).not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Tribunales::Table)
                        .if_not_exists()
                        .col(&mut id_column(Tribunales::Id))
                        .col(
                            ColumnDef::new(Tribunales::Nombre)
                                .string_len(200)
                                .not_null()
                                .unique_key(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Carteras::Table)
                        .if_not_exists()
                        .col(&mut id_column(Carteras::Id))
                        .col(
                            ColumnDef::new(Carteras::Nombre)
                                .string_len(200)
                                .not_null()
                                .unique_key(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(TiposEtapa::Table)
                        .if_not_exists()
                        .col(&mut id_column(TiposEtapa::Id))
                        .col(
                            ColumnDef::new(TiposEtapa::Nombre)
                                .string_len(200)
                                .not_null()
                                .unique_key(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Etapas::Table)
                        .if_not_exists()
                        .col(&mut id_column(Etapas::Id))
                        .col(
                            ColumnDef::new(Etapas::Nombre)
                                .string_len(200)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Etapas::TipoEtapaId).integer().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_etapas_tipo_etapa")
                                .from(Etapas::Table, Etapas::TipoEtapaId)
                                .to(TiposEtapa::Table, TiposEtapa::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_etapas_tipo_etapa_id")
                        .table(Etapas::Table)
                        .col(Etapas::TipoEtapaId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Etapas::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(TiposEtapa::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Carteras::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Tribunales::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Usuarios::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Usuarios {
        Table,
        Id,
        Username,
        Nombre,
    }

    #[derive(DeriveIden)]
    enum Tribunales {
        Table,
        Id,
        Nombre,
    }

    #[derive(DeriveIden)]
    enum Carteras {
        Table,
        Id,
        Nombre,
    }

    #[derive(DeriveIden)]
    enum TiposEtapa {
        Table,
        Id,
        Nombre,
    }

    #[derive(DeriveIden)]
    enum Etapas {
        Table,
        Id,
        Nombre,
        TipoEtapaId,
    }
}

mod m20261001_000002_create_deudores_causas {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20261001_000002_create_deudores_causas"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Deudores::Table)
                        .if_not_exists()
                        .col(&mut id_column(Deudores::Id))
                        .col(ColumnDef::new(Deudores::Nombres).string_len(150).not_null())
                        .col(ColumnDef::new(Deudores::Apellidos).string_len(150).not_null())
                        .col(
                            ColumnDef::new(Deudores::Rut)
                                .string_len(12)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Deudores::Direccion).string_len(200).not_null())
                        .col(ColumnDef::new(Deudores::Comuna).string_len(100).not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Causas::Table)
                        .if_not_exists()
                        .col(&mut id_column(Causas::Id))
                        .col(
                            ColumnDef::new(Causas::Rol)
                                .string_len(50)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Causas::Operacion).string_len(100).not_null())
                        .col(
                            ColumnDef::new(Causas::Estado)
                                .string_len(20)
                                .not_null()
                                .default("ACTIVO"),
                        )
                        .col(
                            ColumnDef::new(Causas::TotalCostas)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Causas::Arbitro).string_len(200).not_null())
                        .col(ColumnDef::new(Causas::FechaAsignacion).date())
                        .col(ColumnDef::new(Causas::Observaciones).text().not_null())
                        .col(ColumnDef::new(Causas::DeudorId).integer().not_null())
                        .col(ColumnDef::new(Causas::TribunalId).integer())
                        .col(ColumnDef::new(Causas::CarteraId).integer())
                        .col(ColumnDef::new(Causas::AbogadoEncargadoId).integer())
                        .col(
                            ColumnDef::new(Causas::FechaCreacion)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(
                            ColumnDef::new(Causas::FechaActualizacion)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_causas_deudor")
                                .from(Causas::Table, Causas::DeudorId)
                                .to(Deudores::Table, Deudores::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_causas_tribunal")
                                .from(Causas::Table, Causas::TribunalId)
                                .to(Tribunales::Table, Tribunales::Id)
                                .on_delete(ForeignKeyAction::SetNull)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_causas_cartera")
                                .from(Causas::Table, Causas::CarteraId)
                                .to(Carteras::Table, Carteras::Id)
                                .on_delete(ForeignKeyAction::SetNull)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_causas_abogado_encargado")
                                .from(Causas::Table, Causas::AbogadoEncargadoId)
                                .to(Usuarios::Table, Usuarios::Id)
                                .on_delete(ForeignKeyAction::SetNull)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            // List filters
            manager
                .create_index(
                    Index::create()
                        .name("idx_causas_estado")
                        .table(Causas::Table)
                        .col(Causas::Estado)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_causas_cartera_id")
                        .table(Causas::Table)
                        .col(Causas::CarteraId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_causas_deudor_id")
                        .table(Causas::Table)
                        .col(Causas::DeudorId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Causas::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Deudores::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Deudores {
        Table,
        Id,
        Nombres,
        Apellidos,
        Rut,
        Direccion,
        Comuna,
    }

    #[derive(DeriveIden)]
    enum Causas {
        Table,
        Id,
        Rol,
        Operacion,
        Estado,
        TotalCostas,
        Arbitro,
        FechaAsignacion,
        Observaciones,
        DeudorId,
        TribunalId,
        CarteraId,
        AbogadoEncargadoId,
        FechaCreacion,
        FechaActualizacion,
    }

    #[derive(DeriveIden)]
    enum Tribunales {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Carteras {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Usuarios {
        Table,
        Id,
    }
}

mod m20261001_000003_create_historial {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20261001_000003_create_historial"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(EtapasCausa::Table)
                        .if_not_exists()
                        .col(&mut id_column(EtapasCausa::Id))
                        .col(ColumnDef::new(EtapasCausa::CausaId).integer().not_null())
                        .col(ColumnDef::new(EtapasCausa::EtapaId).integer().not_null())
                        .col(ColumnDef::new(EtapasCausa::Fecha).date().not_null())
                        .col(ColumnDef::new(EtapasCausa::Descripcion).text().not_null())
                        .col(
                            ColumnDef::new(EtapasCausa::Costas)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_etapas_causa_causa")
                                .from(EtapasCausa::Table, EtapasCausa::CausaId)
                                .to(Causas::Table, Causas::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_etapas_causa_etapa")
                                .from(EtapasCausa::Table, EtapasCausa::EtapaId)
                                .to(Etapas::Table, Etapas::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            // Current-stage lookup orders by date then id within a case
            manager
                .create_index(
                    Index::create()
                        .name("idx_etapas_causa_causa_fecha")
                        .table(EtapasCausa::Table)
                        .col(EtapasCausa::CausaId)
                        .col(EtapasCausa::Fecha)
                        .col(EtapasCausa::Id)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_etapas_causa_etapa_id")
                        .table(EtapasCausa::Table)
                        .col(EtapasCausa::EtapaId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ArchivosAdjuntos::Table)
                        .if_not_exists()
                        .col(&mut id_column(ArchivosAdjuntos::Id))
                        .col(ColumnDef::new(ArchivosAdjuntos::CausaId).integer())
                        .col(ColumnDef::new(ArchivosAdjuntos::EtapaCausaId).integer())
                        .col(
                            ColumnDef::new(ArchivosAdjuntos::Archivo)
                                .string_len(500)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ArchivosAdjuntos::NombreOriginal)
                                .string_len(255)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ArchivosAdjuntos::Descripcion)
                                .string_len(255)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ArchivosAdjuntos::FechaSubida)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_archivos_adjuntos_causa")
                                .from(ArchivosAdjuntos::Table, ArchivosAdjuntos::CausaId)
                                .to(Causas::Table, Causas::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_archivos_adjuntos_etapa_causa")
                                .from(ArchivosAdjuntos::Table, ArchivosAdjuntos::EtapaCausaId)
                                .to(EtapasCausa::Table, EtapasCausa::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_archivos_adjuntos_causa_id")
                        .table(ArchivosAdjuntos::Table)
                        .col(ArchivosAdjuntos::CausaId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_archivos_adjuntos_etapa_causa_id")
                        .table(ArchivosAdjuntos::Table)
                        .col(ArchivosAdjuntos::EtapaCausaId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Comentarios::Table)
                        .if_not_exists()
                        .col(&mut id_column(Comentarios::Id))
                        .col(ColumnDef::new(Comentarios::CausaId).integer().not_null())
                        .col(ColumnDef::new(Comentarios::AutorId).integer().not_null())
                        .col(ColumnDef::new(Comentarios::Texto).text().not_null())
                        .col(
                            ColumnDef::new(Comentarios::FechaCreacion)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_comentarios_causa")
                                .from(Comentarios::Table, Comentarios::CausaId)
                                .to(Causas::Table, Causas::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_comentarios_autor")
                                .from(Comentarios::Table, Comentarios::AutorId)
                                .to(Usuarios::Table, Usuarios::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_comentarios_causa_id")
                        .table(Comentarios::Table)
                        .col(Comentarios::CausaId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Comentarios::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ArchivosAdjuntos::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(EtapasCausa::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum EtapasCausa {
        Table,
        Id,
        CausaId,
        EtapaId,
        Fecha,
        Descripcion,
        Costas,
    }

    #[derive(DeriveIden)]
    enum ArchivosAdjuntos {
        Table,
        Id,
        CausaId,
        EtapaCausaId,
        Archivo,
        NombreOriginal,
        Descripcion,
        FechaSubida,
    }

    #[derive(DeriveIden)]
    enum Comentarios {
        Table,
        Id,
        CausaId,
        AutorId,
        Texto,
        FechaCreacion,
    }

    #[derive(DeriveIden)]
    enum Causas {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Etapas {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Usuarios {
        Table,
        Id,
    }
}

mod m20261001_000004_create_antecedentes {
    use super::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20261001_000004_create_antecedentes"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(AntecedentesLeasing::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AntecedentesLeasing::CausaId)
                                .integer()
                                .not_null()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(AntecedentesLeasing::NumeroContrato)
                                .string_len(50)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AntecedentesLeasing::Notaria)
                                .string_len(200)
                                .not_null(),
                        )
                        .col(ColumnDef::new(AntecedentesLeasing::FechaEscritura).date())
                        .col(
                            ColumnDef::new(AntecedentesLeasing::Repertorio)
                                .string_len(50)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AntecedentesLeasing::MontoContrato)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_antecedentes_leasing_causa")
                                .from(AntecedentesLeasing::Table, AntecedentesLeasing::CausaId)
                                .to(Causas::Table, Causas::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(AntecedentesCbr::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AntecedentesCbr::CausaId)
                                .integer()
                                .not_null()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(AntecedentesCbr::Conservador)
                                .string_len(200)
                                .not_null(),
                        )
                        .col(ColumnDef::new(AntecedentesCbr::Fojas).string_len(20).not_null())
                        .col(ColumnDef::new(AntecedentesCbr::Numero).string_len(20).not_null())
                        .col(ColumnDef::new(AntecedentesCbr::Anio).integer())
                        .col(ColumnDef::new(AntecedentesCbr::Comuna).string_len(100).not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_antecedentes_cbr_causa")
                                .from(AntecedentesCbr::Table, AntecedentesCbr::CausaId)
                                .to(Causas::Table, Causas::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AntecedentesCbr::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(AntecedentesLeasing::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum AntecedentesLeasing {
        Table,
        CausaId,
        NumeroContrato,
        Notaria,
        FechaEscritura,
        Repertorio,
        MontoContrato,
    }

    #[derive(DeriveIden)]
    enum AntecedentesCbr {
        Table,
        CausaId,
        Conservador,
        Fojas,
        Numero,
        Anio,
        Comuna,
    }

    #[derive(DeriveIden)]
    enum Causas {
        Table,
        Id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_migration_names_are_distinct_and_ordered() {
        let names: Vec<String> = Migrator::migrations()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        let distinct: HashSet<&String> = names.iter().collect();
        assert_eq!(distinct.len(), names.len());

        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert!(names.iter().all(|n| n.starts_with("m2026")));
    }
}
