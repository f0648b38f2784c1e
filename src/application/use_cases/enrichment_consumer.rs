// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::domain::{Domain, DomainStatus};
use crate::domain::models::enrichment::EnrichmentResult;
use crate::domain::models::message::DomainMessage;
use crate::domain::repositories::domain_repository::{DomainFilter, DomainRepository};
use crate::domain::services::llm_service::EnrichmentClient;
use crate::utils::errors::{ItemFailure, PipelineError};
use crate::utils::worker_pool::{run_bounded, with_deadline, FailurePolicy};
use metrics::counter;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const MOBILE_PREFIXES: [&str; 3] = ["080", "090", "070"];

/// 电话号码分类
///
/// 按逗号切分，去掉空白和空项；以 080/090/070 开头的归为手机，其余为固话。
/// 两组各自保持原有顺序，用逗号重新拼接。
///
/// # 返回值
///
/// `(mobile, landline)`
pub fn split_phone(phone: &str) -> (String, String) {
    let (mobile, landline): (Vec<&str>, Vec<&str>) = phone
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .partition(|token| MOBILE_PREFIXES.iter().any(|prefix| token.starts_with(prefix)));

    (mobile.join(","), landline.join(","))
}

/// 写入富化结果和电话分类，并推进到 pending_output
fn apply_enrichment(domain: &mut Domain, result: &EnrichmentResult) {
    domain.apply_enrichment(result);
    let (mobile, landline) = split_phone(&domain.phone);
    domain.mobile_phone = mobile;
    domain.landline_phone = landline;
    domain.status = DomainStatus::PendingOutput;
}

/// 单条消息的消费结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "status", rename_all = "snake_case")]
pub enum ConsumeOutcome {
    /// 已富化并推进到 pending_output
    Enriched,
    /// 域名已不存在
    NotFound,
    /// 状态不是 crawl_comp_info，未做任何修改
    Skipped(DomainStatus),
}

/// 批量富化报告
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalyzeReport {
    pub selected: usize,
    pub enriched: Vec<i32>,
    pub failed: Vec<ItemFailure>,
}

#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    pub max_concurrency: usize,
    pub unit_timeout: Duration,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 20,
            unit_timeout: Duration::from_secs(120),
        }
    }
}

/// 富化消费者
///
/// 处理 `crawl_comp_info → pending_output` 的状态转换。
pub struct EnrichmentConsumer<DR> {
    db: Arc<DatabaseConnection>,
    domain_repo: Arc<DR>,
    enrichment: Arc<dyn EnrichmentClient>,
    config: ConsumerConfig,
}

impl<DR> EnrichmentConsumer<DR>
where
    DR: DomainRepository + 'static,
{
    pub fn new(
        db: Arc<DatabaseConnection>,
        domain_repo: Arc<DR>,
        enrichment: Arc<dyn EnrichmentClient>,
        config: ConsumerConfig,
    ) -> Self {
        Self {
            db,
            domain_repo,
            enrichment,
            config,
        }
    }

    /// 消费一条流水线消息
    ///
    /// 在事务内加锁重读域名并校验状态，重复投递或过期消息只会得到 `Skipped`/`NotFound`。
    ///
    /// # 返回值
    ///
    /// * `Ok(ConsumeOutcome)` - 已处理或无需处理
    /// * `Err(PipelineError)` - 富化或存储失败，域名保持 crawl_comp_info
    pub async fn analyze_domain(
        &self,
        message: DomainMessage,
    ) -> Result<ConsumeOutcome, PipelineError> {
        let result =
            with_deadline(self.config.unit_timeout, self.analyze_locked(message.domain_id)).await;
        match &result {
            Ok(ConsumeOutcome::Enriched) => {
                counter!("leadrs_enrichments_applied_total").increment(1)
            }
            Ok(_) => counter!("leadrs_enrichments_skipped_total").increment(1),
            Err(_) => counter!("leadrs_enrichment_failures_total").increment(1),
        }
        result
    }

    async fn analyze_locked(&self, domain_id: i32) -> Result<ConsumeOutcome, PipelineError> {
        let txn = self.db.begin().await.map_err(PipelineError::transaction)?;

        let Some(mut domain) = self.domain_repo.find_for_update(&txn, domain_id).await? else {
            debug!(domain_id, "Domain not found, treating message as handled");
            return Ok(ConsumeOutcome::NotFound);
        };
        if domain.status != DomainStatus::CrawlCompInfo {
            debug!(domain_id, status = %domain.status, "Domain not awaiting enrichment");
            return Ok(ConsumeOutcome::Skipped(domain.status));
        }

        let result = self.enrichment.enrich(&domain.raw_page).await?;
        apply_enrichment(&mut domain, &result);
        self.domain_repo.save(&txn, &domain).await?;
        txn.commit().await.map_err(PipelineError::transaction)?;

        info!(domain_id, domain = %domain.name, "Domain enriched");
        Ok(ConsumeOutcome::Enriched)
    }

    /// 批量富化所有 crawl_comp_info 域名
    ///
    /// 面向运维补跑，不做逐行加锁重读；单个域名失败只记录，不中止整批。
    pub async fn analyze_domains(&self) -> Result<AnalyzeReport, PipelineError> {
        let filter = DomainFilter::with_status(DomainStatus::CrawlCompInfo);
        let batch = self.domain_repo.find_all(self.db.as_ref(), &filter).await?;

        let mut report = AnalyzeReport {
            selected: batch.len(),
            ..Default::default()
        };
        if batch.is_empty() {
            return Ok(report);
        }

        let items: Vec<(i32, Domain)> = batch.into_iter().map(|d| (d.id, d)).collect();
        let pool = run_bounded(
            items,
            self.config.max_concurrency,
            FailurePolicy::Isolate,
            |domain| self.analyze_unlocked(domain),
        )
        .await?;

        report.enriched = pool.completed.into_iter().map(|(id, _)| id).collect();
        report.failed = pool.failed.into_iter().map(ItemFailure::from).collect();

        info!(
            selected = report.selected,
            enriched = report.enriched.len(),
            failed = report.failed.len(),
            "Batch enrichment finished"
        );
        Ok(report)
    }

    async fn analyze_unlocked(&self, mut domain: Domain) -> Result<(), PipelineError> {
        let unit = async {
            let result = self.enrichment.enrich(&domain.raw_page).await?;
            apply_enrichment(&mut domain, &result);
            self.domain_repo.save(self.db.as_ref(), &domain).await?;
            Ok(())
        };
        let result = with_deadline(self.config.unit_timeout, unit).await;
        match &result {
            Ok(()) => counter!("leadrs_enrichments_applied_total").increment(1),
            Err(_) => counter!("leadrs_enrichment_failures_total").increment(1),
        }
        result
    }
}
