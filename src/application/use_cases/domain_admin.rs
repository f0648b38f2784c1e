// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::domain_request::{DomainQueryRequest, UpdateDomainRequest};
use crate::application::use_cases::enrichment_consumer::split_phone;
use crate::domain::models::domain::{truncate_chars, Domain, DomainStatus};
use crate::domain::repositories::domain_repository::DomainRepository;
use crate::utils::errors::PipelineError;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

/// 分页列表结果
#[derive(Debug, Clone, Serialize)]
pub struct DomainPage {
    pub domains: Vec<Domain>,
    pub total: u64,
}

/// 运维侧的域名管理
pub struct DomainAdmin<DR> {
    db: Arc<DatabaseConnection>,
    domain_repo: Arc<DR>,
    raw_page_max_chars: usize,
}

impl<DR> DomainAdmin<DR>
where
    DR: DomainRepository + 'static,
{
    pub fn new(
        db: Arc<DatabaseConnection>,
        domain_repo: Arc<DR>,
        raw_page_max_chars: usize,
    ) -> Self {
        Self {
            db,
            domain_repo,
            raw_page_max_chars,
        }
    }

    /// 按条件列出域名，同时返回不分页的总数
    pub async fn list(&self, query: &DomainQueryRequest) -> Result<DomainPage, PipelineError> {
        query
            .validate()
            .map_err(|e| PipelineError::Validation(e.to_string()))?;
        let filter = query.to_filter()?;

        let domains = self.domain_repo.find_all(self.db.as_ref(), &filter).await?;
        let total = self.domain_repo.count(self.db.as_ref(), &filter).await?;
        Ok(DomainPage { domains, total })
    }

    pub async fn get(&self, id: i32) -> Result<Domain, PipelineError> {
        self.domain_repo
            .find_by_id(self.db.as_ref(), id)
            .await?
            .ok_or_else(|| PipelineError::NotFound(format!("domain {}", id)))
    }

    /// 加锁更新单个域名
    ///
    /// 状态字符串在进入事务前校验；设置 Phone 时会一并重算手机/固话拆分。
    ///
    /// # 返回值
    ///
    /// * `Ok(Domain)` - 更新后的域名
    /// * `Err(PipelineError::Validation)` - 请求字段非法
    /// * `Err(PipelineError::NotFound)` - 域名不存在
    pub async fn update_domain(
        &self,
        id: i32,
        request: UpdateDomainRequest,
    ) -> Result<Domain, PipelineError> {
        request
            .validate()
            .map_err(|e| PipelineError::Validation(e.to_string()))?;
        let status = request
            .status
            .as_deref()
            .map(str::parse::<DomainStatus>)
            .transpose()
            .map_err(|e| PipelineError::Validation(e.to_string()))?;

        let txn = self.db.begin().await.map_err(PipelineError::transaction)?;
        let mut domain = self
            .domain_repo
            .find_for_update(&txn, id)
            .await?
            .ok_or_else(|| PipelineError::NotFound(format!("domain {}", id)))?;

        if let Some(status) = status {
            domain.status = status;
        }
        self.apply_fields(&mut domain, request);

        let saved = self.domain_repo.save(&txn, &domain).await?;
        txn.commit().await.map_err(PipelineError::transaction)?;

        info!(domain_id = id, status = %saved.status, "Domain updated by operator");
        Ok(saved)
    }

    fn apply_fields(&self, domain: &mut Domain, request: UpdateDomainRequest) {
        macro_rules! assign {
            ($($field:ident),*) => {
                $(if let Some(value) = request.$field {
                    domain.$field = value;
                })*
            };
        }
        assign!(
            can_view, is_japan, is_send, is_ssl, title, owner_id, address, industry, president,
            company, prefecture, page_num
        );

        if let Some(phone) = request.phone {
            let (mobile, landline) = split_phone(&phone);
            domain.phone = phone;
            domain.mobile_phone = mobile;
            domain.landline_phone = landline;
        }
        if let Some(raw_page) = request.raw_page {
            domain.raw_page = truncate_chars(&raw_page, self.raw_page_max_chars);
        }
    }

    /// 将域名移入回收站
    ///
    /// 已处于终止状态（done/trash）的域名保持不变。
    pub async fn trash(&self, id: i32) -> Result<Domain, PipelineError> {
        let txn = self.db.begin().await.map_err(PipelineError::transaction)?;
        let mut domain = self
            .domain_repo
            .find_for_update(&txn, id)
            .await?
            .ok_or_else(|| PipelineError::NotFound(format!("domain {}", id)))?;

        if domain.status.is_terminal() {
            return Ok(domain);
        }

        let from = domain.status;
        domain.status = DomainStatus::Trash;
        let saved = self.domain_repo.save(&txn, &domain).await?;
        txn.commit().await.map_err(PipelineError::transaction)?;

        info!(domain_id = id, from = %from, "Domain moved to trash");
        Ok(saved)
    }
}
