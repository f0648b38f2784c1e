// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "domains")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub target: String,
    pub status: String,
    pub can_view: bool,
    pub is_japan: bool,
    pub is_send: bool,
    pub title: String,
    pub owner_id: String,
    pub address: String,
    pub phone: String,
    pub mobile_phone: String,
    pub landline_phone: String,
    pub industry: String,
    pub president: String,
    pub company: String,
    pub prefecture: String,
    pub is_ssl: bool,
    #[sea_orm(column_type = "Text")]
    pub raw_page: String,
    pub page_num: i32,
    pub created_at: ChronoDateTimeWithTimeZone,
    pub updated_at: ChronoDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
