//! Database migrations for module setup

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250301_000001_create_module_shop_settings::Migration)]
    }
}

mod m20250301_000001_create_module_shop_settings {
    use super::*;

    #[derive(DeriveMigrationName)]
    pub struct Migration;

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ModuleShopSettings::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ModuleShopSettings::Id)
                                .string()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(ModuleShopSettings::ShopId).big_integer().not_null())
                        .col(ColumnDef::new(ModuleShopSettings::Name).string().not_null())
                        .col(ColumnDef::new(ModuleShopSettings::VarType).string().not_null())
                        .col(ColumnDef::new(ModuleShopSettings::Value).json().not_null())
                        .col(
                            ColumnDef::new(ModuleShopSettings::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_module_shop_settings_shop_name")
                        .table(ModuleShopSettings::Table)
                        .col(ModuleShopSettings::ShopId)
                        .col(ModuleShopSettings::Name)
                        .unique()
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ModuleShopSettings::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ModuleShopSettings {
        Table,
        Id,
        ShopId,
        Name,
        VarType,
        Value,
        UpdatedAt,
    }
}
