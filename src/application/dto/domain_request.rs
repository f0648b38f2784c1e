// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::domain::DomainStatus;
use crate::domain::repositories::domain_repository::DomainFilter;
use crate::utils::errors::PipelineError;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 域名列表查询参数
#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct DomainQueryRequest {
    /// 逗号分隔的状态列表，例如 `initialize,check_view`
    pub status: Option<String>,
    pub target: Option<String>,
    /// 名称模糊匹配
    pub name: Option<String>,
    pub can_view: Option<bool>,
    pub is_japan: Option<bool>,
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl DomainQueryRequest {
    /// 转换为仓库查询条件，未知状态返回 `Validation` 错误
    pub fn to_filter(&self) -> Result<DomainFilter, PipelineError> {
        let statuses = match &self.status {
            Some(raw) => Some(
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| s.parse::<DomainStatus>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| PipelineError::Validation(e.to_string()))?,
            ),
            None => None,
        };

        Ok(DomainFilter {
            ids: None,
            statuses,
            target: self.target.clone(),
            name_contains: self.name.clone(),
            can_view: self.can_view,
            is_japan: self.is_japan,
            limit: Some(self.limit.unwrap_or(100)),
            offset: self.offset,
        })
    }
}

/// 运维更新域名的请求体，只有给出的字段会被修改
#[derive(Debug, Default, Clone, Deserialize, Serialize, Validate)]
pub struct UpdateDomainRequest {
    pub status: Option<String>,
    pub can_view: Option<bool>,
    pub is_japan: Option<bool>,
    pub is_send: Option<bool>,
    pub is_ssl: Option<bool>,
    #[validate(length(max = 512))]
    pub title: Option<String>,
    pub owner_id: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub industry: Option<String>,
    pub president: Option<String>,
    pub company: Option<String>,
    pub prefecture: Option<String>,
    pub raw_page: Option<String>,
    #[validate(range(min = 0))]
    pub page_num: Option<i32>,
}
