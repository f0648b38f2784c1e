// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::application::use_cases::enrichment_consumer::EnrichmentConsumer;
use crate::domain::models::message::DomainMessage;
use crate::domain::repositories::domain_repository::DomainRepository;
use crate::domain::services::message_channel::MessageSource;
use crate::utils::errors::{ErrorClass, WorkerError};

/// 一条消息的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    /// 队列为空
    Idle,
    /// 已确认
    Acked,
    /// 已放回队列等待重试
    Requeued,
}

/// 消息通道消费Worker
///
/// 拉取路径的至少一次投递：处理成功或消息本身无效时确认，
/// 可重试的失败放回队列。启动时先恢复上次遗留的处理中消息。
pub struct ChannelWorker<DR>
where
    DR: DomainRepository + 'static,
{
    source: Arc<dyn MessageSource>,
    consumer: Arc<EnrichmentConsumer<DR>>,
    poll_interval: Duration,
}

impl<DR> ChannelWorker<DR>
where
    DR: DomainRepository + 'static,
{
    pub fn new(
        source: Arc<dyn MessageSource>,
        consumer: Arc<EnrichmentConsumer<DR>>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            source,
            consumer,
            poll_interval,
        }
    }

    /// 处理下一条消息
    pub async fn process_next(&self) -> Result<Handled, WorkerError> {
        let Some(delivery) = self.source.receive().await? else {
            return Ok(Handled::Idle);
        };

        let message = match DomainMessage::decode(&delivery.payload) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Dropping undecodable message");
                self.source.ack(&delivery).await?;
                return Ok(Handled::Acked);
            }
        };

        match self.consumer.analyze_domain(message).await {
            Ok(_) => {
                self.source.ack(&delivery).await?;
                Ok(Handled::Acked)
            }
            Err(e) if e.kind().class() == ErrorClass::DataProblem => {
                warn!(domain_id = message.domain_id, error = %e, "Dropping message with bad data");
                self.source.ack(&delivery).await?;
                Ok(Handled::Acked)
            }
            Err(e) => {
                warn!(domain_id = message.domain_id, error = %e, "Enrichment failed, requeueing");
                self.source.nack(&delivery).await?;
                Ok(Handled::Requeued)
            }
        }
    }
}

#[async_trait]
impl<DR> crate::workers::Worker for ChannelWorker<DR>
where
    DR: DomainRepository + 'static,
{
    async fn run(&self) -> Result<(), WorkerError> {
        let recovered = self.source.recover().await?;
        info!(recovered, "Channel worker started");

        loop {
            match self.process_next().await {
                Ok(Handled::Acked) => continue,
                // 退避，避免失败消息让循环空转
                Ok(Handled::Idle) | Ok(Handled::Requeued) => sleep(self.poll_interval).await,
                Err(e) => {
                    error!(error = %e, "Channel worker iteration failed");
                    sleep(self.poll_interval).await;
                }
            }
        }
    }

    fn name(&self) -> &str {
        "channel-worker"
    }
}
