//! Create estats (connector status history) table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Estats::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Estats::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Estats::ChargerId).integer().not_null())
                    .col(ColumnDef::new(Estats::Connector).integer().not_null())
                    .col(ColumnDef::new(Estats::Estat).string().not_null())
                    .col(ColumnDef::new(Estats::Hora).string().not_null())
                    .col(ColumnDef::new(Estats::ErrorCode).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_estats_charger")
                    .table(Estats::Table)
                    .col(Estats::ChargerId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Estats::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Estats {
    Table,
    Id,
    ChargerId,
    Connector,
    Estat,
    Hora,
    ErrorCode,
}
