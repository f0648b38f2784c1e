// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::interval;
use tracing::{error, info};

use crate::application::use_cases::batch_exporter::BatchExporter;
use crate::application::use_cases::crawl_scheduler::CrawlScheduler;
use crate::application::use_cases::fan_out::FanOutCoordinator;
use crate::domain::repositories::domain_repository::DomainRepository;
use crate::domain::repositories::target_repository::TargetRepository;
use crate::utils::errors::WorkerError;

/// 单次周期的执行摘要
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickSummary {
    pub inserted: u64,
    pub dispatched: usize,
    pub exported: u64,
    /// 抓取阶段中失败的单页数
    pub failed_pages: usize,
    /// 失败的阶段名称
    pub failed_stages: Vec<&'static str>,
}

/// 周期流水线Worker
///
/// 每个周期依次执行抓取、派发和导出。某一阶段失败只记录日志，
/// 后续阶段和下一个周期照常执行。
pub struct PipelineWorker<DR, TR>
where
    DR: DomainRepository + 'static,
    TR: TargetRepository + 'static,
{
    scheduler: Arc<CrawlScheduler<DR, TR>>,
    fan_out: Arc<FanOutCoordinator<DR>>,
    exporter: Arc<BatchExporter<DR>>,
    tick_interval: Duration,
}

impl<DR, TR> PipelineWorker<DR, TR>
where
    DR: DomainRepository + 'static,
    TR: TargetRepository + 'static,
{
    pub fn new(
        scheduler: Arc<CrawlScheduler<DR, TR>>,
        fan_out: Arc<FanOutCoordinator<DR>>,
        exporter: Arc<BatchExporter<DR>>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            scheduler,
            fan_out,
            exporter,
            tick_interval,
        }
    }

    /// 执行一个周期
    pub async fn run_once(&self) -> TickSummary {
        let mut summary = TickSummary::default();

        match self.scheduler.fetch().await {
            Ok(report) => {
                summary.inserted = report.inserted;
                summary.failed_pages = report.failed.len();
            }
            Err(e) => {
                error!(stage = "fetch", error = %e, "Pipeline stage failed");
                summary.failed_stages.push("fetch");
            }
        }

        match self.fan_out.polling().await {
            Ok(report) => summary.dispatched = report.dispatched.len(),
            Err(e) => {
                error!(stage = "polling", error = %e, "Pipeline stage failed");
                summary.failed_stages.push("polling");
            }
        }

        match self.exporter.output().await {
            Ok(report) => summary.exported = report.flipped,
            Err(e) => {
                error!(stage = "output", error = %e, "Pipeline stage failed");
                summary.failed_stages.push("output");
            }
        }

        info!(
            inserted = summary.inserted,
            dispatched = summary.dispatched,
            exported = summary.exported,
            failed_pages = summary.failed_pages,
            failed_stages = ?summary.failed_stages,
            "Pipeline tick finished"
        );
        summary
    }
}

#[async_trait]
impl<DR, TR> crate::workers::Worker for PipelineWorker<DR, TR>
where
    DR: DomainRepository + 'static,
    TR: TargetRepository + 'static,
{
    async fn run(&self) -> Result<(), WorkerError> {
        info!(interval_secs = self.tick_interval.as_secs(), "Pipeline worker started");

        let mut interval = interval(self.tick_interval);
        loop {
            interval.tick().await;
            self.run_once().await;
        }
    }

    fn name(&self) -> &str {
        "pipeline-worker"
    }
}
