// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Targets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Targets::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Targets::Ip).string().not_null().unique_key())
                    .col(ColumnDef::new(Targets::Name).string().not_null())
                    .col(
                        ColumnDef::new(Targets::Status)
                            .string()
                            .not_null()
                            .default("init"),
                    )
                    .col(
                        ColumnDef::new(Targets::Unbounded)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Targets::CurrentPage)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Targets::LastFetchedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Targets::LastFullScanAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Targets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Targets::UpdatedAt)
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
                    .name("idx_targets_last_fetched_at")
                    .table(Targets::Table)
                    .col(Targets::LastFetchedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Targets::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Targets {
    Table,
    Id,
    Ip,
    Name,
    Status,
    Unbounded,
    CurrentPage,
    LastFetchedAt,
    LastFullScanAt,
    CreatedAt,
    UpdatedAt,
}
