// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::PipelineError;
use async_trait::async_trait;

/// 消息通道发布端
///
/// 至少一次投递；载荷对通道是不透明的字节。
#[async_trait]
pub trait MessageChannel: Send + Sync {
    async fn publish(&self, payload: Vec<u8>) -> Result<(), PipelineError>;
}

/// 一次待确认的投递
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub payload: Vec<u8>,
}

/// 消息通道拉取端
///
/// 收到的消息在 `ack` 之前处于"处理中"，`recover` 会把
/// 上次进程退出时遗留的处理中消息重新放回队列。
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// 取出一条消息，队列为空时返回 `None`
    async fn receive(&self) -> Result<Option<Delivery>, PipelineError>;

    /// 确认处理完成
    async fn ack(&self, delivery: &Delivery) -> Result<(), PipelineError>;

    /// 放弃处理，消息重新入队
    async fn nack(&self, delivery: &Delivery) -> Result<(), PipelineError>;

    /// 把遗留的处理中消息重新入队，返回数量
    async fn recover(&self) -> Result<u64, PipelineError>;
}
