//! Create meter_values table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MeterValues::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MeterValues::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MeterValues::ChargerId).integer().not_null())
                    .col(ColumnDef::new(MeterValues::Connector).integer().not_null())
                    .col(
                        ColumnDef::new(MeterValues::Transaccio)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MeterValues::Hora).string().not_null())
                    .col(ColumnDef::new(MeterValues::Valor).string().not_null())
                    .col(ColumnDef::new(MeterValues::Unit).string().not_null())
                    .col(ColumnDef::new(MeterValues::Measurand).string().not_null())
                    .col(ColumnDef::new(MeterValues::Context).string().not_null())
                    .to_owned(),
            )
            .await?;

        // Samples are queried per charger
        manager
            .create_index(
                Index::create()
                    .name("idx_meter_values_charger")
                    .table(MeterValues::Table)
                    .col(MeterValues::ChargerId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MeterValues::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum MeterValues {
    Table,
    Id,
    ChargerId,
    Connector,
    Transaccio,
    Hora,
    Valor,
    Unit,
    Measurand,
    Context,
}
