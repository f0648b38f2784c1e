// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::domain::DomainStatus;
use crate::domain::repositories::domain_repository::{DomainFilter, DomainRepository};
use crate::domain::services::exporter::{DomainExporter, ExportBatch};
use crate::utils::errors::PipelineError;
use crate::utils::worker_pool::with_deadline;
use metrics::counter;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// 导出报告
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    /// 交给导出方的域名数
    pub exported: usize,
    /// 按目标名称划分的分组数
    pub groups: usize,
    /// 实际标记为 done 的行数
    pub flipped: u64,
}

/// 批量导出器
///
/// 收集所有 pending_output 域名，按目标分组整体导出，
/// 导出成功后一次性把这批域名标记为 done。
pub struct BatchExporter<DR> {
    db: Arc<DatabaseConnection>,
    domain_repo: Arc<DR>,
    exporter: Arc<dyn DomainExporter>,
    unit_timeout: Duration,
}

impl<DR> BatchExporter<DR>
where
    DR: DomainRepository + 'static,
{
    pub fn new(
        db: Arc<DatabaseConnection>,
        domain_repo: Arc<DR>,
        exporter: Arc<dyn DomainExporter>,
        unit_timeout: Duration,
    ) -> Self {
        Self {
            db,
            domain_repo,
            exporter,
            unit_timeout,
        }
    }

    /// 导出并翻转状态
    ///
    /// # 返回值
    ///
    /// * `Ok(ExportReport)` - 导出成功（没有待导出的域名时返回空报告）
    /// * `Err(PipelineError)` - 导出或状态更新失败，所有域名保持 pending_output
    pub async fn output(&self) -> Result<ExportReport, PipelineError> {
        with_deadline(self.unit_timeout, self.export_then_flip()).await
    }

    async fn export_then_flip(&self) -> Result<ExportReport, PipelineError> {
        let filter = DomainFilter::with_status(DomainStatus::PendingOutput);
        let pending = self.domain_repo.find_all(self.db.as_ref(), &filter).await?;
        if pending.is_empty() {
            return Ok(ExportReport::default());
        }

        let ids: Vec<i32> = pending.iter().map(|d| d.id).collect();
        let mut batch = ExportBatch::new();
        for domain in pending {
            batch.entry(domain.target.clone()).or_default().push(domain);
        }

        let report = ExportReport {
            exported: ids.len(),
            groups: batch.len(),
            flipped: 0,
        };

        if let Err(e) = self.exporter.export(&batch).await {
            warn!(domains = report.exported, error = %e, "Export failed, leaving batch pending");
            counter!("leadrs_export_failures_total").increment(1);
            return Err(e);
        }

        let txn = self.db.begin().await.map_err(PipelineError::transaction)?;
        let flipped = self
            .domain_repo
            .bulk_update_status(&txn, &ids, DomainStatus::PendingOutput, DomainStatus::Done)
            .await?;
        txn.commit().await.map_err(PipelineError::transaction)?;

        if flipped < ids.len() as u64 {
            warn!(
                exported = ids.len(),
                flipped, "Some exported domains left pending_output before the flip"
            );
        }
        counter!("leadrs_domains_exported_total").increment(flipped);
        info!(
            exported = report.exported,
            groups = report.groups,
            flipped,
            "Export batch finished"
        );

        Ok(ExportReport { flipped, ..report })
    }
}
