// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use leadrs::application::use_cases::batch_exporter::BatchExporter;
use leadrs::application::use_cases::crawl_scheduler::{CrawlScheduler, SchedulerConfig};
use leadrs::application::use_cases::domain_admin::DomainAdmin;
use leadrs::application::use_cases::enrichment_consumer::{ConsumerConfig, EnrichmentConsumer};
use leadrs::application::use_cases::fan_out::{FanOutConfig, FanOutCoordinator};
use leadrs::application::use_cases::target_admin::TargetAdmin;
use leadrs::config::settings::Settings;
use leadrs::domain::services::llm_service::LLMService;
use leadrs::infrastructure::clients::view_dns_client::ViewDnsClient;
use leadrs::infrastructure::database::connection;
use leadrs::infrastructure::export::local_exporter::LocalExporter;
use leadrs::infrastructure::messaging::redis_channel::RedisChannel;
use leadrs::infrastructure::repositories::domain_repo_impl::DomainRepositoryImpl;
use leadrs::infrastructure::repositories::target_repo_impl::TargetRepositoryImpl;
use leadrs::presentation::routes::{self, ApiServices};
use leadrs::utils::telemetry;
use leadrs::utils::worker_pool::FailurePolicy;
use leadrs::workers::channel_worker::ChannelWorker;
use leadrs::workers::manager::WorkerManager;
use leadrs::workers::pipeline_worker::PipelineWorker;
use migration::{Migrator, MigratorTrait};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting leadrs...");

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    if settings.metrics.enabled {
        leadrs::infrastructure::metrics::init_metrics(&settings.metrics.listen_addr);
    }

    // 3. Connect to database
    let db = Arc::new(connection::create_pool(&settings.database).await?);
    info!("Database connection established");

    info!("Running database migrations...");
    Migrator::up(db.as_ref(), None).await?;
    info!("Database migrations applied");

    // 4. External collaborators
    let channel = Arc::new(RedisChannel::new(
        &settings.redis.url,
        &settings.channel.topic,
        &settings.channel.processing_list,
    )?);
    let lookup = Arc::new(ViewDnsClient::new(
        &settings.reverse_ip.base_url,
        settings.reverse_ip.api_key.clone(),
        settings.reverse_ip.requests_per_second,
        Duration::from_secs(settings.reverse_ip.timeout_secs),
    )?);
    let enrichment = Arc::new(LLMService::new_with_config(
        settings.llm.api_key.clone(),
        settings.llm.model.clone(),
        settings.llm.api_base_url.clone(),
        Duration::from_secs(settings.llm.timeout_secs),
    )?);
    let exporter = Arc::new(LocalExporter::new(&settings.export.output_dir));

    // 5. Use cases
    let pipeline = &settings.pipeline;
    let domain_repo = Arc::new(DomainRepositoryImpl::new());
    let target_repo = Arc::new(TargetRepositoryImpl::new());

    let scheduler = Arc::new(CrawlScheduler::new(
        db.clone(),
        domain_repo.clone(),
        target_repo.clone(),
        lookup,
        SchedulerConfig {
            page_size: settings.reverse_ip.page_size,
            unit_timeout: pipeline.unit_timeout(),
            fetch_quota: pipeline.fetch_quota,
            bounded_ratio: pipeline.bounded_ratio,
            unbounded_quota: pipeline.unbounded_quota,
        },
    ));
    let fan_out = Arc::new(FanOutCoordinator::new(
        db.clone(),
        domain_repo.clone(),
        channel.clone(),
        FanOutConfig {
            batch_size: pipeline.polling_batch_size,
            max_concurrency: pipeline.max_concurrency,
            policy: if pipeline.fan_out_fail_fast {
                FailurePolicy::FailFast
            } else {
                FailurePolicy::Isolate
            },
            unit_timeout: pipeline.unit_timeout(),
        },
    ));
    let consumer = Arc::new(EnrichmentConsumer::new(
        db.clone(),
        domain_repo.clone(),
        enrichment,
        ConsumerConfig {
            max_concurrency: pipeline.max_concurrency,
            unit_timeout: pipeline.unit_timeout(),
        },
    ));
    let batch_exporter = Arc::new(BatchExporter::new(
        db.clone(),
        domain_repo.clone(),
        exporter,
        pipeline.unit_timeout(),
    ));
    let domain_admin = Arc::new(DomainAdmin::new(
        db.clone(),
        domain_repo.clone(),
        pipeline.raw_page_max_chars,
    ));
    let target_admin = Arc::new(TargetAdmin::new(db.clone(), target_repo.clone()));

    // 6. Start workers
    let mut worker_manager = WorkerManager::new();
    if pipeline.schedule_interval_secs > 0 {
        worker_manager.spawn(Arc::new(PipelineWorker::new(
            scheduler.clone(),
            fan_out.clone(),
            batch_exporter.clone(),
            Duration::from_secs(pipeline.schedule_interval_secs),
        )));
    }
    if settings.channel.consumer_enabled {
        worker_manager.spawn(Arc::new(ChannelWorker::new(
            channel.clone(),
            consumer.clone(),
            Duration::from_millis(settings.channel.poll_interval_ms),
        )));
    }

    // 7. Start HTTP server
    let app = routes::app(ApiServices {
        scheduler,
        fan_out,
        consumer,
        exporter: batch_exporter,
        domain_admin,
        target_admin,
    });

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            worker_manager.wait_for_shutdown().await;
        })
        .await?;

    Ok(())
}
