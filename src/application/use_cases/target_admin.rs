// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::target_request::{
    CreateTargetRequest, TargetQueryRequest, UpdateTargetRequest,
};
use crate::domain::models::target::{Target, TargetStatus};
use crate::domain::repositories::target_repository::{TargetFilter, TargetRepository};
use crate::utils::errors::PipelineError;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

/// 运维侧的抓取目标管理
pub struct TargetAdmin<TR> {
    db: Arc<DatabaseConnection>,
    target_repo: Arc<TR>,
}

impl<TR> TargetAdmin<TR>
where
    TR: TargetRepository + 'static,
{
    pub fn new(db: Arc<DatabaseConnection>, target_repo: Arc<TR>) -> Self {
        Self { db, target_repo }
    }

    /// 创建目标，初始状态为 init，游标为第一页
    pub async fn create(&self, request: CreateTargetRequest) -> Result<Target, PipelineError> {
        request
            .validate()
            .map_err(|e| PipelineError::Validation(e.to_string()))?;
        self.ensure_ip_free(self.db.as_ref(), &request.ip, None).await?;

        let target = Target::new(request.ip, request.name, request.unbounded);
        let created = self.target_repo.create(self.db.as_ref(), &target).await?;

        info!(target_id = created.id, ip = %created.ip, name = %created.name, "Target created");
        Ok(created)
    }

    pub async fn list(&self, query: &TargetQueryRequest) -> Result<Vec<Target>, PipelineError> {
        query
            .validate()
            .map_err(|e| PipelineError::Validation(e.to_string()))?;

        let mut filter = if query.include_disabled {
            TargetFilter::default()
        } else {
            TargetFilter::active()
        };
        filter.status = query.status;
        filter.limit = Some(query.limit.unwrap_or(100));
        filter.offset = query.offset;

        Ok(self.target_repo.find_all(self.db.as_ref(), &filter).await?)
    }

    /// 加锁更新目标
    pub async fn update(
        &self,
        id: i32,
        request: UpdateTargetRequest,
    ) -> Result<Target, PipelineError> {
        request
            .validate()
            .map_err(|e| PipelineError::Validation(e.to_string()))?;

        let txn = self.db.begin().await.map_err(PipelineError::transaction)?;
        let mut target = self.lock(&txn, id).await?;

        if let Some(ip) = request.ip {
            if ip != target.ip {
                self.ensure_ip_free(&txn, &ip, Some(id)).await?;
                target.ip = ip;
            }
        }
        if let Some(name) = request.name {
            target.name = name;
        }
        if let Some(unbounded) = request.unbounded {
            target.unbounded = unbounded;
        }
        if let Some(page) = request.current_page {
            target.current_page = page;
        }

        let saved = self.target_repo.save(&txn, &target).await?;
        txn.commit().await.map_err(PipelineError::transaction)?;

        info!(target_id = id, "Target updated");
        Ok(saved)
    }

    /// 停用目标，之后的所有抓取都会跳过它
    pub async fn disable(&self, id: i32) -> Result<Target, PipelineError> {
        let txn = self.db.begin().await.map_err(PipelineError::transaction)?;
        let mut target = self.lock(&txn, id).await?;
        if target.status == TargetStatus::Disabled {
            return Ok(target);
        }

        target.status = TargetStatus::Disabled;
        let saved = self.target_repo.save(&txn, &target).await?;
        txn.commit().await.map_err(PipelineError::transaction)?;

        info!(target_id = id, name = %saved.name, "Target disabled");
        Ok(saved)
    }

    async fn lock<C>(&self, conn: &C, id: i32) -> Result<Target, PipelineError>
    where
        C: ConnectionTrait,
    {
        self.target_repo
            .find_for_update(conn, id)
            .await?
            .ok_or_else(|| PipelineError::NotFound(format!("target {}", id)))
    }

    async fn ensure_ip_free<C>(
        &self,
        conn: &C,
        ip: &str,
        except: Option<i32>,
    ) -> Result<(), PipelineError>
    where
        C: ConnectionTrait,
    {
        let filter = TargetFilter {
            ip: Some(ip.to_string()),
            ..Default::default()
        };
        let taken = self
            .target_repo
            .find_all(conn, &filter)
            .await?
            .into_iter()
            .any(|t| Some(t.id) != except);
        if taken {
            return Err(PipelineError::Validation(format!(
                "target with ip {} already exists",
                ip
            )));
        }
        Ok(())
    }
}
