// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 单元测试共用的数据库初始化和协作方替身

use crate::domain::models::domain::{Domain, DomainStatus};
use crate::domain::models::enrichment::EnrichmentResult;
use crate::domain::models::message::DomainMessage;
use crate::domain::models::target::Target;
use crate::domain::services::exporter::{DomainExporter, ExportBatch};
use crate::domain::services::llm_service::EnrichmentClient;
use crate::domain::services::message_channel::MessageChannel;
use crate::domain::services::reverse_ip_service::{ReverseIpClient, ReverseIpEntry, ReverseIpPage};
use crate::infrastructure::database::entities::{domain as domain_entity, target as target_entity};
use crate::utils::errors::PipelineError;
use async_trait::async_trait;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

pub async fn seed_domain(
    db: &DatabaseConnection,
    name: &str,
    target: &str,
    status: DomainStatus,
) -> Domain {
    let mut domain = Domain::discovered(name, target);
    domain.status = status;
    let model = domain_entity::ActiveModel::from(&domain)
        .insert(db)
        .await
        .expect("Failed to seed domain");
    Domain::try_from(model).expect("Seeded domain is valid")
}

pub async fn seed_target(db: &DatabaseConnection, ip: &str, name: &str) -> Target {
    let target = Target::new(ip, name, false);
    let model = target_entity::ActiveModel::from(&target)
        .insert(db)
        .await
        .expect("Failed to seed target");
    Target::try_from(model).expect("Seeded target is valid")
}

/// 反查服务替身：按主机返回固定的总数和分页结果
#[derive(Default)]
pub struct FakeReverseIp {
    counts: Mutex<HashMap<String, String>>,
    pages: Mutex<HashMap<(String, i32), Vec<String>>>,
    failing: Mutex<HashSet<String>>,
    delay: Option<Duration>,
    pub calls: Mutex<Vec<(String, i32)>>,
}

impl FakeReverseIp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn set_count(&self, host: &str, count: u64) {
        self.set_raw_count(host, &count.to_string());
    }

    /// 原样设置远端返回的 domain_count 字符串
    pub fn set_raw_count(&self, host: &str, raw: &str) {
        self.counts
            .lock()
            .unwrap()
            .insert(host.to_string(), raw.to_string());
    }

    pub fn set_page(&self, host: &str, page: i32, names: &[&str]) {
        self.pages.lock().unwrap().insert(
            (host.to_string(), page),
            names.iter().map(|n| n.to_string()).collect(),
        );
    }

    pub fn fail_for(&self, host: &str) {
        self.failing.lock().unwrap().insert(host.to_string());
    }

    pub fn calls(&self) -> Vec<(String, i32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReverseIpClient for FakeReverseIp {
    async fn lookup(&self, host: &str, page: i32) -> Result<ReverseIpPage, PipelineError> {
        self.calls.lock().unwrap().push((host.to_string(), page));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().unwrap().contains(host) {
            return Err(PipelineError::external("ViewDNS", "503 Service Unavailable"));
        }

        let count = self
            .counts
            .lock()
            .unwrap()
            .get(host)
            .cloned()
            .unwrap_or_else(|| "0".to_string());
        let names = self
            .pages
            .lock()
            .unwrap()
            .get(&(host.to_string(), page))
            .cloned()
            .unwrap_or_default();

        Ok(ReverseIpPage {
            domain_count: count,
            domains: names
                .into_iter()
                .map(|name| ReverseIpEntry {
                    name,
                    last_resolved: "2025-01-01".to_string(),
                })
                .collect(),
        })
    }
}

/// 富化服务替身
pub struct FakeEnrichment {
    reply: Mutex<Result<EnrichmentResult, String>>,
    pub calls: AtomicUsize,
}

impl FakeEnrichment {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Mutex::new(Ok(EnrichmentResult::parse(reply))),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: Mutex::new(Err("model overloaded".to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EnrichmentClient for FakeEnrichment {
    async fn enrich(&self, _raw_page: &str) -> Result<EnrichmentResult, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply
            .lock()
            .unwrap()
            .clone()
            .map_err(|e| PipelineError::external("LLM", e))
    }
}

/// 记录所有发布内容的消息通道，可对指定域名模拟发布失败
#[derive(Default)]
pub struct RecordingChannel {
    published: Mutex<Vec<Vec<u8>>>,
    failing_ids: Mutex<HashSet<i32>>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for(&self, domain_id: i32) {
        self.failing_ids.lock().unwrap().insert(domain_id);
    }

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
impl MessageChannel for RecordingChannel {
    async fn publish(&self, payload: Vec<u8>) -> Result<(), PipelineError> {
        let message = DomainMessage::decode(&payload)?;
        if self.failing_ids.lock().unwrap().contains(&message.domain_id) {
            return Err(PipelineError::external("channel", "publish rejected"));
        }
        self.published.lock().unwrap().push(payload);
        Ok(())
    }
}

/// 记录导出批次的导出替身
#[derive(Default)]
pub struct RecordingExporter {
    pub batches: Mutex<Vec<ExportBatch>>,
    fail: bool,
}

impl RecordingExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            batches: Mutex::new(Vec::new()),
            fail: true,
        }
    }
}

#[async_trait]
impl DomainExporter for RecordingExporter {
    async fn export(&self, batch: &ExportBatch) -> Result<(), PipelineError> {
        if self.fail {
            return Err(PipelineError::external("exporter", "destination unavailable"));
        }
        self.batches.lock().unwrap().push(batch.clone());
        Ok(())
    }
}
