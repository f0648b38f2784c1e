// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::use_cases::batch_exporter::BatchExporter;
use crate::application::use_cases::crawl_scheduler::CrawlScheduler;
use crate::application::use_cases::domain_admin::DomainAdmin;
use crate::application::use_cases::enrichment_consumer::EnrichmentConsumer;
use crate::application::use_cases::fan_out::FanOutCoordinator;
use crate::application::use_cases::target_admin::TargetAdmin;
use crate::infrastructure::repositories::domain_repo_impl::DomainRepositoryImpl;
use crate::infrastructure::repositories::target_repo_impl::TargetRepositoryImpl;
use crate::presentation::handlers::{
    domain_handler, pipeline_handler, target_handler, webhook_handler,
};
use axum::{
    routing::{get, patch, post},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

type DR = DomainRepositoryImpl;
type TR = TargetRepositoryImpl;

/// HTTP层依赖的全部用例
#[derive(Clone)]
pub struct ApiServices {
    pub scheduler: Arc<CrawlScheduler<DR, TR>>,
    pub fan_out: Arc<FanOutCoordinator<DR>>,
    pub consumer: Arc<EnrichmentConsumer<DR>>,
    pub exporter: Arc<BatchExporter<DR>>,
    pub domain_admin: Arc<DomainAdmin<DR>>,
    pub target_admin: Arc<TargetAdmin<TR>>,
}

/// 创建应用路由
///
/// # 返回值
///
/// 返回配置好的路由，用例需要通过 `Extension` 层注入，见 [`app`]
pub fn routes() -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version));

    let pipeline_routes = Router::new()
        .route(
            "/v1/webhook/analyze",
            post(webhook_handler::analyze_push::<DR>),
        )
        .route("/v1/pipeline/fetch", post(pipeline_handler::fetch::<DR, TR>))
        .route(
            "/v1/pipeline/fetch-unbounded",
            post(pipeline_handler::fetch_unbounded::<DR, TR>),
        )
        .route("/v1/pipeline/polling", post(pipeline_handler::polling::<DR>))
        .route("/v1/pipeline/analyze", post(pipeline_handler::analyze::<DR>))
        .route("/v1/pipeline/output", post(pipeline_handler::output::<DR>));

    let admin_routes = Router::new()
        .route("/v1/domains", get(domain_handler::list_domains::<DR>))
        .route(
            "/v1/domains/{id}",
            get(domain_handler::get_domain::<DR>).patch(domain_handler::update_domain::<DR>),
        )
        .route(
            "/v1/domains/{id}/trash",
            post(domain_handler::trash_domain::<DR>),
        )
        .route(
            "/v1/targets",
            get(target_handler::list_targets::<TR>).post(target_handler::create_target::<TR>),
        )
        .route(
            "/v1/targets/{id}",
            patch(target_handler::update_target::<TR>),
        )
        .route(
            "/v1/targets/{id}/disable",
            post(target_handler::disable_target::<TR>),
        );

    Router::new()
        .merge(public_routes)
        .merge(pipeline_routes)
        .merge(admin_routes)
}

/// 注入用例后的完整应用
pub fn app(services: ApiServices) -> Router {
    routes()
        .layer(Extension(services.scheduler))
        .layer(Extension(services.fan_out))
        .layer(Extension(services.consumer))
        .layer(Extension(services.exporter))
        .layer(Extension(services.domain_admin))
        .layer(Extension(services.target_admin))
        .layer(TraceLayer::new_for_http())
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
