// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::PipelineError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// 反查结果中的单个主机名
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReverseIpEntry {
    pub name: String,
    #[serde(default)]
    pub last_resolved: String,
}

/// 反查接口返回的一页结果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReverseIpPage {
    /// 远端报告的结果总数，以字符串形式编码
    pub domain_count: String,
    #[serde(default)]
    pub domains: Vec<ReverseIpEntry>,
}

impl ReverseIpPage {
    /// 解析结果总数
    ///
    /// 空字符串和无法解析的值都视为远端返回异常，返回 `ExternalApi` 错误。
    pub fn total_count(&self) -> Result<u64, PipelineError> {
        let raw = self.domain_count.trim();
        raw.parse::<u64>().map_err(|_| {
            PipelineError::external(
                "ViewDNS",
                format!("invalid domain_count in lookup response: {:?}", raw),
            )
        })
    }

    pub fn names(&self) -> Vec<String> {
        self.domains
            .iter()
            .map(|entry| entry.name.trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .collect()
    }
}

/// 分页反查客户端特质
#[async_trait]
pub trait ReverseIpClient: Send + Sync {
    /// 查询某个主机的第 `page` 页（从1开始）
    async fn lookup(&self, host: &str, page: i32) -> Result<ReverseIpPage, PipelineError>;
}
