// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::use_cases::batch_exporter::{BatchExporter, ExportReport};
use crate::application::use_cases::crawl_scheduler::{CrawlScheduler, SweepReport};
use crate::application::use_cases::enrichment_consumer::{AnalyzeReport, EnrichmentConsumer};
use crate::application::use_cases::fan_out::{FanOutCoordinator, FanOutReport};
use crate::domain::repositories::domain_repository::DomainRepository;
use crate::domain::repositories::target_repository::TargetRepository;
use crate::presentation::errors::AppError;
use axum::{Extension, Json};
use std::sync::Arc;

/// 混合配额抓取
pub async fn fetch<DR: DomainRepository + 'static, TR: TargetRepository + 'static>(
    Extension(scheduler): Extension<Arc<CrawlScheduler<DR, TR>>>,
) -> Result<Json<SweepReport>, AppError> {
    Ok(Json(scheduler.fetch().await?))
}

/// 只抓取无界目标
pub async fn fetch_unbounded<DR: DomainRepository + 'static, TR: TargetRepository + 'static>(
    Extension(scheduler): Extension<Arc<CrawlScheduler<DR, TR>>>,
) -> Result<Json<SweepReport>, AppError> {
    Ok(Json(scheduler.fetch_unbounded().await?))
}

/// 派发一批 initialize 域名
pub async fn polling<DR: DomainRepository + 'static>(
    Extension(coordinator): Extension<Arc<FanOutCoordinator<DR>>>,
) -> Result<Json<FanOutReport>, AppError> {
    Ok(Json(coordinator.polling().await?))
}

/// 批量富化所有 crawl_comp_info 域名
pub async fn analyze<DR: DomainRepository + 'static>(
    Extension(consumer): Extension<Arc<EnrichmentConsumer<DR>>>,
) -> Result<Json<AnalyzeReport>, AppError> {
    Ok(Json(consumer.analyze_domains().await?))
}

/// 导出 pending_output 域名
pub async fn output<DR: DomainRepository + 'static>(
    Extension(exporter): Extension<Arc<BatchExporter<DR>>>,
) -> Result<Json<ExportReport>, AppError> {
    Ok(Json(exporter.output().await?))
}
