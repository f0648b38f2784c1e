// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::domain::Domain;
use crate::domain::models::target::{sort_by_staleness, TargetClass, TargetStatus};
use crate::domain::repositories::domain_repository::DomainRepository;
use crate::domain::repositories::target_repository::{TargetFilter, TargetRepository};
use crate::domain::services::reverse_ip_service::ReverseIpClient;
use crate::utils::errors::{ItemFailure, PipelineError};
use crate::utils::worker_pool::with_deadline;
use chrono::Utc;
use metrics::{counter, histogram};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// 根据远端报告的结果总数计算页数上限
///
/// `count == 0` 时返回 0，否则为 `ceil(count / page_size)`，超出 `i32` 时饱和。
pub fn max_page(count: u64, page_size: u64) -> i32 {
    if count == 0 || page_size == 0 {
        return 0;
    }
    i32::try_from(count.div_ceil(page_size)).unwrap_or(i32::MAX)
}

/// 一次分页之后的游标变化
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CursorAdvance {
    pub next_page: i32,
    /// 有界目标完成了一轮完整扫描
    pub full_scan_completed: bool,
}

/// 游标推进规则
///
/// 无界目标在末页停住，只在远端总数为0时回到第一页；
/// 有界目标到达末页（或总数为0）即视为一轮扫描完成并回到第一页。
pub fn next_cursor(class: TargetClass, page: i32, max_page: i32) -> CursorAdvance {
    let advance = |next_page| CursorAdvance {
        next_page,
        full_scan_completed: false,
    };

    match class {
        TargetClass::Unbounded => {
            if max_page == 0 {
                advance(1)
            } else if page >= max_page {
                advance(max_page)
            } else {
                advance(page + 1)
            }
        }
        TargetClass::Bounded => {
            if max_page == 0 || page >= max_page {
                CursorAdvance {
                    next_page: 1,
                    full_scan_completed: true,
                }
            } else {
                advance(page + 1)
            }
        }
    }
}

/// 参与一次扫描的目标范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSelection {
    All,
    Bounded,
    Unbounded,
}

impl TargetSelection {
    fn includes(&self, class: TargetClass) -> bool {
        match self {
            TargetSelection::All => true,
            TargetSelection::Bounded => class == TargetClass::Bounded,
            TargetSelection::Unbounded => class == TargetClass::Unbounded,
        }
    }
}

/// 单页抓取的结果
#[derive(Debug, Clone, Serialize)]
pub struct PageStep {
    pub target_id: i32,
    pub target: String,
    pub page: i32,
    pub max_page: i32,
    pub discovered: usize,
    pub inserted: u64,
    pub next_page: i32,
    pub full_scan_completed: bool,
}

/// 扫描报告
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    /// 已消耗的页数预算
    pub steps_spent: u32,
    pub inserted: u64,
    pub pages: Vec<PageStep>,
    /// 失败的单页抓取，按目标ID记录
    pub failed: Vec<ItemFailure>,
}

impl SweepReport {
    fn record(&mut self, step: PageStep) {
        self.inserted += step.inserted;
        self.pages.push(step);
    }

    fn merge(&mut self, other: SweepReport) {
        self.steps_spent += other.steps_spent;
        self.inserted += other.inserted;
        self.pages.extend(other.pages);
        self.failed.extend(other.failed);
    }
}

/// 抓取调度配置
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// 远端每页条数
    pub page_size: u64,
    /// 单页抓取的期限
    pub unit_timeout: Duration,
    /// 混合扫描的页数预算
    pub fetch_quota: u32,
    /// 混合扫描中有界目标的份额
    pub bounded_ratio: f64,
    /// 无界目标专用扫描的页数预算
    pub unbounded_quota: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            page_size: 10_000,
            unit_timeout: Duration::from_secs(120),
            fetch_quota: 100,
            bounded_ratio: 0.8,
            unbounded_quota: 500,
        }
    }
}

/// 抓取调度用例
///
/// 按目标逐页调用反查服务，插入新域名并推进目标游标。
/// 每个目标的每一页是一个事务：域名插入与游标推进要么一起提交，要么一起回滚。
pub struct CrawlScheduler<DR, TR> {
    db: Arc<DatabaseConnection>,
    domain_repo: Arc<DR>,
    target_repo: Arc<TR>,
    lookup: Arc<dyn ReverseIpClient>,
    config: SchedulerConfig,
}

impl<DR, TR> CrawlScheduler<DR, TR>
where
    DR: DomainRepository + 'static,
    TR: TargetRepository + 'static,
{
    pub fn new(
        db: Arc<DatabaseConnection>,
        domain_repo: Arc<DR>,
        target_repo: Arc<TR>,
        lookup: Arc<dyn ReverseIpClient>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            db,
            domain_repo,
            target_repo,
            lookup,
            config,
        }
    }

    /// 抓取一个目标的当前页
    ///
    /// # 参数
    ///
    /// * `target_id` - 目标ID
    ///
    /// # 返回值
    ///
    /// * `Ok(Some(PageStep))` - 本页已处理并提交
    /// * `Ok(None)` - 目标不存在或已停用
    /// * `Err(PipelineError)` - 反查、存储或提交失败，或超出期限；游标不变
    pub async fn fetch_one_page(&self, target_id: i32) -> Result<Option<PageStep>, PipelineError> {
        let started = Instant::now();
        let result = with_deadline(self.config.unit_timeout, self.step(target_id)).await;
        histogram!("leadrs_fetch_page_duration_seconds").record(started.elapsed().as_secs_f64());

        match &result {
            Ok(Some(step)) => {
                counter!("leadrs_pages_fetched_total").increment(1);
                counter!("leadrs_domains_inserted_total").increment(step.inserted);
            }
            Ok(None) => {}
            Err(e) => {
                counter!("leadrs_fetch_failures_total", "kind" => format!("{:?}", e.kind()))
                    .increment(1);
                warn!(target_id, error = %e, "Page fetch failed");
            }
        }
        result
    }

    async fn step(&self, target_id: i32) -> Result<Option<PageStep>, PipelineError> {
        let txn = self.db.begin().await.map_err(PipelineError::transaction)?;

        // 行锁保证同一游标上的并发扫描串行执行
        let Some(mut target) = self.target_repo.find_for_update(&txn, target_id).await? else {
            return Ok(None);
        };
        if !target.is_active() {
            debug!(target_id, "Target disabled, skipping");
            return Ok(None);
        }

        let page = target.page();
        let response = self.lookup.lookup(&target.ip, page).await?;
        let count = response.total_count()?;

        let mut seen = HashSet::new();
        let names: Vec<String> = response
            .names()
            .into_iter()
            .filter(|name| seen.insert(name.clone()))
            .collect();
        let existing = self.domain_repo.existing_names(&txn, &names).await?;
        let fresh: Vec<Domain> = names
            .iter()
            .filter(|name| !existing.contains(*name))
            .map(|name| Domain::discovered(name.clone(), target.name.clone()))
            .collect();
        let inserted = self.domain_repo.insert_new(&txn, &fresh).await?;

        let max = max_page(count, self.config.page_size);
        let advance = next_cursor(target.class(), page, max);
        let now = Utc::now();

        target.current_page = advance.next_page;
        if advance.full_scan_completed {
            target.last_full_scan_at = Some(now);
        }
        target.last_fetched_at = Some(now);
        if target.status == TargetStatus::Init {
            target.status = TargetStatus::Fetched;
        }
        self.target_repo.save(&txn, &target).await?;

        txn.commit().await.map_err(PipelineError::transaction)?;

        info!(
            target = %target.name,
            page,
            max_page = max,
            next_page = advance.next_page,
            discovered = names.len(),
            inserted,
            "Fetched page"
        );

        Ok(Some(PageStep {
            target_id: target.id,
            target: target.name,
            page,
            max_page: max,
            discovered: names.len(),
            inserted,
            next_page: advance.next_page,
            full_scan_completed: advance.full_scan_completed,
        }))
    }

    /// 在一组目标上按轮转方式消耗页数预算
    ///
    /// 目标按陈旧度排序，每轮每个目标一页，每次抓取无论结果都消耗一页预算。
    /// 单页失败只回滚该页并记入 `failed`，扫描继续轮转其它目标；
    /// 一整轮没有任何成功的页时提前结束。
    pub async fn sweep(
        &self,
        selection: TargetSelection,
        budget: u32,
    ) -> Result<SweepReport, PipelineError> {
        let mut targets: Vec<_> = self
            .target_repo
            .find_all(self.db.as_ref(), &TargetFilter::active())
            .await?
            .into_iter()
            .filter(|t| selection.includes(t.class()))
            .collect();
        sort_by_staleness(&mut targets);

        let mut report = SweepReport::default();
        let mut remaining = budget;

        while remaining > 0 && !targets.is_empty() {
            let mut progressed = false;
            for target in &targets {
                if remaining == 0 {
                    break;
                }
                remaining -= 1;
                report.steps_spent += 1;
                match self.fetch_one_page(target.id).await {
                    Ok(Some(step)) => {
                        report.record(step);
                        progressed = true;
                    }
                    Ok(None) => {}
                    Err(e) => report.failed.push(ItemFailure::from((target.id, e))),
                }
            }
            if !progressed {
                break;
            }
        }

        info!(
            ?selection,
            budget,
            steps = report.steps_spent,
            inserted = report.inserted,
            failed = report.failed.len(),
            "Sweep finished"
        );
        Ok(report)
    }

    /// 混合扫描
    ///
    /// 预算按 `bounded_ratio` 分给有界目标，剩余部分（含有界目标未用完的份额）交给无界目标。
    pub async fn fetch(&self) -> Result<SweepReport, PipelineError> {
        let quota = self.config.fetch_quota;
        let ratio = self.config.bounded_ratio.clamp(0.0, 1.0);
        let bounded_share = ((quota as f64) * ratio).floor() as u32;

        let mut report = self.sweep(TargetSelection::Bounded, bounded_share).await?;
        let unbounded_share = quota - report.steps_spent.min(quota);
        let rest = self.sweep(TargetSelection::Unbounded, unbounded_share).await?;
        report.merge(rest);
        Ok(report)
    }

    /// 只扫描无界目标
    pub async fn fetch_unbounded(&self) -> Result<SweepReport, PipelineError> {
        self.sweep(TargetSelection::Unbounded, self.config.unbounded_quota)
            .await
    }
}
