//! Create transaccions (transaction lifecycle) table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Transaccions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transaccions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transaccions::ChargerId).integer().not_null())
                    .col(ColumnDef::new(Transaccions::Estat).string().not_null())
                    .col(ColumnDef::new(Transaccions::Connector).integer().not_null())
                    .col(ColumnDef::new(Transaccions::Hora).string().not_null())
                    .col(ColumnDef::new(Transaccions::Motiu).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transaccions_charger")
                    .table(Transaccions::Table)
                    .col(Transaccions::ChargerId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transaccions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Transaccions {
    Table,
    Id,
    ChargerId,
    Estat,
    Connector,
    Hora,
    Motiu,
}
