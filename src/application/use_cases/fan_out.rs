// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::domain::DomainStatus;
use crate::domain::models::message::DomainMessage;
use crate::domain::repositories::domain_repository::{DomainFilter, DomainRepository};
use crate::domain::services::message_channel::MessageChannel;
use crate::utils::errors::{ItemFailure, PipelineError};
use crate::utils::worker_pool::{run_bounded, with_deadline, FailurePolicy};
use metrics::counter;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// 单个域名的派发结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// 已发布并标记为 check_view
    Dispatched,
    /// 行已不存在或状态已不是 initialize
    Skipped,
}

/// 派发批次报告
#[derive(Debug, Clone, Default, Serialize)]
pub struct FanOutReport {
    pub selected: usize,
    pub dispatched: Vec<i32>,
    pub skipped: Vec<i32>,
    pub failed: Vec<ItemFailure>,
}

#[derive(Debug, Clone)]
pub struct FanOutConfig {
    pub batch_size: u64,
    pub max_concurrency: usize,
    pub policy: FailurePolicy,
    pub unit_timeout: Duration,
}

impl Default for FanOutConfig {
    fn default() -> Self {
        Self {
            batch_size: 300,
            max_concurrency: 20,
            policy: FailurePolicy::Isolate,
            unit_timeout: Duration::from_secs(120),
        }
    }
}

/// 富化派发协调器
///
/// 读取一批 initialize 状态的域名，以有界并发逐个发布消息并推进到 check_view。
pub struct FanOutCoordinator<DR> {
    db: Arc<DatabaseConnection>,
    domain_repo: Arc<DR>,
    channel: Arc<dyn MessageChannel>,
    config: FanOutConfig,
}

impl<DR> FanOutCoordinator<DR>
where
    DR: DomainRepository + 'static,
{
    pub fn new(
        db: Arc<DatabaseConnection>,
        domain_repo: Arc<DR>,
        channel: Arc<dyn MessageChannel>,
        config: FanOutConfig,
    ) -> Self {
        Self {
            db,
            domain_repo,
            channel,
            config,
        }
    }

    /// 派发一批 initialize 域名
    ///
    /// `Isolate` 策略下单个域名的失败只记录在报告里；`FailFast` 下首个失败即返回错误。
    /// 失败的域名保持 initialize，下一次调用会重新派发。
    pub async fn polling(&self) -> Result<FanOutReport, PipelineError> {
        let filter =
            DomainFilter::with_status(DomainStatus::Initialize).limit(self.config.batch_size);
        let batch = self.domain_repo.find_all(self.db.as_ref(), &filter).await?;

        let mut report = FanOutReport {
            selected: batch.len(),
            ..Default::default()
        };
        if batch.is_empty() {
            return Ok(report);
        }

        let items: Vec<(i32, i32)> = batch.iter().map(|d| (d.id, d.id)).collect();
        let pool = run_bounded(
            items,
            self.config.max_concurrency,
            self.config.policy,
            |id| self.dispatch(id),
        )
        .await?;

        for (id, outcome) in pool.completed {
            match outcome {
                DispatchOutcome::Dispatched => report.dispatched.push(id),
                DispatchOutcome::Skipped => report.skipped.push(id),
            }
        }
        report.failed = pool.failed.into_iter().map(ItemFailure::from).collect();

        info!(
            selected = report.selected,
            dispatched = report.dispatched.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Fan-out batch finished"
        );
        Ok(report)
    }

    /// 派发单个域名：加锁 → 校验状态 → 发布 → 更新状态 → 提交
    pub async fn dispatch(&self, domain_id: i32) -> Result<DispatchOutcome, PipelineError> {
        let result = with_deadline(self.config.unit_timeout, self.dispatch_locked(domain_id)).await;
        match &result {
            Ok(DispatchOutcome::Dispatched) => {
                counter!("leadrs_domains_dispatched_total").increment(1)
            }
            Ok(DispatchOutcome::Skipped) => counter!("leadrs_dispatch_skipped_total").increment(1),
            Err(_) => counter!("leadrs_dispatch_failures_total").increment(1),
        }
        result
    }

    async fn dispatch_locked(&self, domain_id: i32) -> Result<DispatchOutcome, PipelineError> {
        let txn = self.db.begin().await.map_err(PipelineError::transaction)?;

        let Some(mut domain) = self.domain_repo.find_for_update(&txn, domain_id).await? else {
            debug!(domain_id, "Domain vanished before dispatch");
            return Ok(DispatchOutcome::Skipped);
        };
        if domain.status != DomainStatus::Initialize {
            debug!(domain_id, status = %domain.status, "Domain already dispatched");
            return Ok(DispatchOutcome::Skipped);
        }

        // 先发布成功，再更新状态
        let payload = DomainMessage::new(domain_id).encode()?;
        self.channel.publish(payload).await?;

        domain.status = DomainStatus::CheckView;
        self.domain_repo.save(&txn, &domain).await?;
        txn.commit().await.map_err(PipelineError::transaction)?;

        debug!(domain_id, domain = %domain.name, "Domain dispatched");
        Ok(DispatchOutcome::Dispatched)
    }
}
