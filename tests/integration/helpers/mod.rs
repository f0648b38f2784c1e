// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use axum_test::TestServer;
use leadrs::application::use_cases::batch_exporter::BatchExporter;
use leadrs::application::use_cases::crawl_scheduler::{CrawlScheduler, SchedulerConfig};
use leadrs::application::use_cases::domain_admin::DomainAdmin;
use leadrs::application::use_cases::enrichment_consumer::{ConsumerConfig, EnrichmentConsumer};
use leadrs::application::use_cases::fan_out::{FanOutConfig, FanOutCoordinator};
use leadrs::application::use_cases::target_admin::TargetAdmin;
use leadrs::domain::models::domain::{Domain, DomainStatus};
use leadrs::domain::models::message::DomainMessage;
use leadrs::domain::repositories::domain_repository::{DomainFilter, DomainRepository};
use leadrs::domain::services::llm_service::LLMService;
use leadrs::domain::services::message_channel::MessageChannel;
use leadrs::infrastructure::clients::view_dns_client::ViewDnsClient;
use leadrs::infrastructure::export::local_exporter::LocalExporter;
use leadrs::infrastructure::repositories::domain_repo_impl::DomainRepositoryImpl;
use leadrs::infrastructure::repositories::target_repo_impl::TargetRepositoryImpl;
use leadrs::presentation::routes::{self, ApiServices};
use leadrs::utils::errors::PipelineError;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 内存消息通道
#[derive(Default)]
pub struct MemoryChannel {
    published: Mutex<Vec<Vec<u8>>>,
}

impl MemoryChannel {
    pub fn published_ids(&self) -> Vec<i32> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .map(|payload| DomainMessage::decode(payload).unwrap().domain_id)
            .collect()
    }
}

#[async_trait]
impl MessageChannel for MemoryChannel {
    async fn publish(&self, payload: Vec<u8>) -> Result<(), PipelineError> {
        self.published.lock().unwrap().push(payload);
        Ok(())
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub db: Arc<DatabaseConnection>,
    pub channel: Arc<MemoryChannel>,
    pub view_dns: MockServer,
    pub llm: MockServer,
    pub export_dir: TempDir,
}

pub async fn setup_db() -> Arc<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    Arc::new(db)
}

/// 创建一个完整装配的测试应用
///
/// 反查服务和 LLM 都指向 wiremock，导出写入临时目录。
pub async fn create_test_app() -> TestApp {
    let db = setup_db().await;
    let view_dns = MockServer::start().await;
    let llm = MockServer::start().await;
    let export_dir = TempDir::new().expect("Failed to create export dir");
    let channel = Arc::new(MemoryChannel::default());

    let lookup = Arc::new(
        ViewDnsClient::new(
            &view_dns.uri(),
            Some("test-key".to_string()),
            100,
            Duration::from_secs(5),
        )
        .expect("Failed to build reverse-IP client"),
    );
    let enrichment = Arc::new(
        LLMService::new_with_config(
            Some("test-key".to_string()),
            "test-model".to_string(),
            llm.uri(),
            Duration::from_secs(5),
        )
        .expect("Failed to build LLM client"),
    );

    let domain_repo = Arc::new(DomainRepositoryImpl::new());
    let target_repo = Arc::new(TargetRepositoryImpl::new());
    let unit_timeout = Duration::from_secs(10);

    let services = ApiServices {
        scheduler: Arc::new(CrawlScheduler::new(
            db.clone(),
            domain_repo.clone(),
            target_repo.clone(),
            lookup,
            SchedulerConfig {
                unit_timeout,
                fetch_quota: 10,
                ..SchedulerConfig::default()
            },
        )),
        fan_out: Arc::new(FanOutCoordinator::new(
            db.clone(),
            domain_repo.clone(),
            channel.clone(),
            FanOutConfig {
                unit_timeout,
                ..FanOutConfig::default()
            },
        )),
        consumer: Arc::new(EnrichmentConsumer::new(
            db.clone(),
            domain_repo.clone(),
            enrichment,
            ConsumerConfig {
                max_concurrency: 4,
                unit_timeout,
            },
        )),
        exporter: Arc::new(BatchExporter::new(
            db.clone(),
            domain_repo.clone(),
            Arc::new(LocalExporter::new(export_dir.path())),
            unit_timeout,
        )),
        domain_admin: Arc::new(DomainAdmin::new(db.clone(), domain_repo.clone(), 8000)),
        target_admin: Arc::new(TargetAdmin::new(db.clone(), target_repo)),
    };

    let server = TestServer::new(routes::app(services)).expect("Failed to start test server");

    TestApp {
        server,
        db,
        channel,
        view_dns,
        llm,
        export_dir,
    }
}

/// 插入一个指定状态的域名
pub async fn seed_domain(
    db: &DatabaseConnection,
    name: &str,
    target: &str,
    status: DomainStatus,
) -> Domain {
    let repo = DomainRepositoryImpl::new();
    let mut domain = Domain::discovered(name, target);
    domain.status = status;
    repo.insert_new(db, &[domain]).await.expect("Failed to seed domain");

    let filter = DomainFilter {
        name_contains: Some(name.to_string()),
        ..Default::default()
    };
    repo.find_all(db, &filter)
        .await
        .expect("Failed to load seeded domain")
        .into_iter()
        .find(|d| d.name == name)
        .expect("Seeded domain missing")
}

pub async fn domain_status(db: &DatabaseConnection, id: i32) -> DomainStatus {
    DomainRepositoryImpl::new()
        .find_by_id(db, id)
        .await
        .expect("Failed to load domain")
        .expect("Domain missing")
        .status
}

/// 让 LLM 替身固定回复一行文本
pub async fn mock_llm_reply(llm: &MockServer, reply: &str) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": reply } }]
        })))
        .mount(llm)
        .await;
}
