// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::PipelineError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// 流水线消息
///
/// 只携带域名ID。消费方在投递时重新读取数据库中的记录。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainMessage {
    pub domain_id: i32,
}

impl DomainMessage {
    pub fn new(domain_id: i32) -> Self {
        Self { domain_id }
    }

    pub fn encode(&self) -> Result<Vec<u8>, PipelineError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(payload: &[u8]) -> Result<Self, PipelineError> {
        Ok(serde_json::from_slice(payload)?)
    }
}

/// 推送投递的外层包装
///
/// `message.data` 为 base64 编码的 [`DomainMessage`]。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushRequest {
    pub message: PushMessage,
    #[serde(default)]
    pub subscription: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    pub data: String,
    #[serde(default)]
    pub message_id: Option<String>,
}

impl PushRequest {
    pub fn wrap(message: &DomainMessage) -> Result<Self, PipelineError> {
        Ok(Self {
            message: PushMessage {
                data: STANDARD.encode(message.encode()?),
                message_id: None,
            },
            subscription: None,
        })
    }

    pub fn domain_message(&self) -> Result<DomainMessage, PipelineError> {
        let payload = STANDARD
            .decode(self.message.data.trim())
            .map_err(|e| PipelineError::Validation(format!("invalid base64 payload: {}", e)))?;
        DomainMessage::decode(&payload)
    }
}
