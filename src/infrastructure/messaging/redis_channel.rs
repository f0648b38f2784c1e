// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::message_channel::{Delivery, MessageChannel, MessageSource};
use crate::utils::errors::PipelineError;
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Direction};
use tracing::{debug, info};

const SERVICE: &str = "Redis";

/// 基于 Redis 列表的消息通道
///
/// 发布端 RPUSH 到队列；拉取端用 LMOVE 把消息原子地移入处理中列表，
/// 确认后从处理中列表删除。进程崩溃时遗留在处理中列表的消息由 `recover` 放回队列。
#[derive(Clone)]
pub struct RedisChannel {
    client: redis::Client,
    topic: String,
    processing_list: String,
}

impl RedisChannel {
    /// 创建通道
    ///
    /// # 参数
    ///
    /// * `redis_url` - Redis连接URL
    /// * `topic` - 队列列表名
    /// * `processing_list` - 处理中列表名
    pub fn new(redis_url: &str, topic: &str, processing_list: &str) -> Result<Self, PipelineError> {
        let client =
            redis::Client::open(redis_url).map_err(|e| PipelineError::external(SERVICE, e))?;
        Ok(Self {
            client,
            topic: topic.to_string(),
            processing_list: processing_list.to_string(),
        })
    }

    async fn connection(&self) -> Result<MultiplexedConnection, PipelineError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| PipelineError::external(SERVICE, e))
    }

    /// 队列中等待处理的消息数
    pub async fn pending(&self) -> Result<u64, PipelineError> {
        let mut con = self.connection().await?;
        con.llen(&self.topic)
            .await
            .map_err(|e| PipelineError::external(SERVICE, e))
    }
}

#[async_trait]
impl MessageChannel for RedisChannel {
    async fn publish(&self, payload: Vec<u8>) -> Result<(), PipelineError> {
        let mut con = self.connection().await?;
        con.rpush::<_, _, ()>(&self.topic, payload)
            .await
            .map_err(|e| PipelineError::external(SERVICE, e))
    }
}

#[async_trait]
impl MessageSource for RedisChannel {
    async fn receive(&self) -> Result<Option<Delivery>, PipelineError> {
        let mut con = self.connection().await?;
        let payload: Option<Vec<u8>> = con
            .lmove(
                &self.topic,
                &self.processing_list,
                Direction::Left,
                Direction::Right,
            )
            .await
            .map_err(|e| PipelineError::external(SERVICE, e))?;
        Ok(payload.map(|payload| Delivery { payload }))
    }

    async fn ack(&self, delivery: &Delivery) -> Result<(), PipelineError> {
        let mut con = self.connection().await?;
        con.lrem::<_, _, ()>(&self.processing_list, 1, delivery.payload.as_slice())
            .await
            .map_err(|e| PipelineError::external(SERVICE, e))
    }

    async fn nack(&self, delivery: &Delivery) -> Result<(), PipelineError> {
        let mut con = self.connection().await?;
        redis::pipe()
            .atomic()
            .lrem(&self.processing_list, 1, delivery.payload.as_slice())
            .ignore()
            .rpush(&self.topic, delivery.payload.as_slice())
            .ignore()
            .query_async::<()>(&mut con)
            .await
            .map_err(|e| PipelineError::external(SERVICE, e))
    }

    async fn recover(&self) -> Result<u64, PipelineError> {
        let mut con = self.connection().await?;
        let mut recovered = 0u64;
        loop {
            // 从尾部取、放回头部，保持原有顺序排在队首
            let moved: Option<Vec<u8>> = con
                .lmove(
                    &self.processing_list,
                    &self.topic,
                    Direction::Right,
                    Direction::Left,
                )
                .await
                .map_err(|e| PipelineError::external(SERVICE, e))?;
            if moved.is_none() {
                break;
            }
            recovered += 1;
        }

        if recovered > 0 {
            info!(recovered, topic = %self.topic, "Re-queued unacknowledged messages");
        } else {
            debug!(topic = %self.topic, "No unacknowledged messages to recover");
        }
        Ok(recovered)
    }
}
