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
                    .table(Domains::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Domains::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    // 主机名全局唯一，去重插入依赖此键
                    .col(ColumnDef::new(Domains::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(Domains::Target).string().not_null())
                    .col(
                        ColumnDef::new(Domains::Status)
                            .string()
                            .not_null()
                            .default("initialize"),
                    )
                    .col(ColumnDef::new(Domains::CanView).boolean().not_null().default(false))
                    .col(ColumnDef::new(Domains::IsJapan).boolean().not_null().default(false))
                    .col(ColumnDef::new(Domains::IsSend).boolean().not_null().default(false))
                    .col(ColumnDef::new(Domains::Title).string().not_null().default(""))
                    .col(ColumnDef::new(Domains::OwnerId).string().not_null().default(""))
                    .col(ColumnDef::new(Domains::Address).string().not_null().default(""))
                    .col(ColumnDef::new(Domains::Phone).string().not_null().default(""))
                    .col(ColumnDef::new(Domains::MobilePhone).string().not_null().default(""))
                    .col(ColumnDef::new(Domains::LandlinePhone).string().not_null().default(""))
                    .col(ColumnDef::new(Domains::Industry).string().not_null().default(""))
                    .col(ColumnDef::new(Domains::President).string().not_null().default(""))
                    .col(ColumnDef::new(Domains::Company).string().not_null().default(""))
                    .col(ColumnDef::new(Domains::Prefecture).string().not_null().default(""))
                    .col(ColumnDef::new(Domains::IsSsl).boolean().not_null().default(false))
                    .col(ColumnDef::new(Domains::RawPage).text().not_null().default(""))
                    .col(ColumnDef::new(Domains::PageNum).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Domains::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Domains::UpdatedAt)
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
                    .name("idx_domains_status")
                    .table(Domains::Table)
                    .col(Domains::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_domains_target_status")
                    .table(Domains::Table)
                    .col(Domains::Target)
                    .col(Domains::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Domains::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Domains {
    Table,
    Id,
    Name,
    Target,
    Status,
    CanView,
    IsJapan,
    IsSend,
    Title,
    OwnerId,
    Address,
    Phone,
    MobilePhone,
    LandlinePhone,
    Industry,
    President,
    Company,
    Prefecture,
    IsSsl,
    RawPage,
    PageNum,
    CreatedAt,
    UpdatedAt,
}
