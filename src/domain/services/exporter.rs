// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::domain::Domain;
use crate::utils::errors::PipelineError;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;

/// 按目标名称分组的导出批次
pub type ExportBatch = BTreeMap<String, Vec<Domain>>;

/// 导出的单行数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub name: String,
    pub title: String,
    pub owner_id: String,
    pub mobile_phone: String,
    pub landline_phone: String,
    pub industry: String,
    pub president: String,
    pub company: String,
    pub prefecture: String,
    pub page_num: i32,
}

impl From<&Domain> for ExportRow {
    fn from(domain: &Domain) -> Self {
        Self {
            name: domain.name.clone(),
            title: domain.title.clone(),
            owner_id: domain.owner_id.clone(),
            mobile_phone: domain.mobile_phone.clone(),
            landline_phone: domain.landline_phone.clone(),
            industry: domain.industry.clone(),
            president: domain.president.clone(),
            company: domain.company.clone(),
            prefecture: domain.prefecture.clone(),
            page_num: domain.page_num,
        }
    }
}

/// 导出协作方特质
///
/// 整个批次作为一个原子单元导出：返回 `Ok` 表示所有分组都已成功落地。
#[async_trait]
pub trait DomainExporter: Send + Sync {
    async fn export(&self, batch: &ExportBatch) -> Result<(), PipelineError>;
}
