// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 富化服务表示"未找到"的标记值
pub const NOT_FOUND_SENTINEL: &str = "なし";

const FIELD_COUNT: usize = 4;

/// 富化结果
///
/// 不落库的临时值。`None` 表示该字段未找到，应用时不得覆盖原值。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentResult {
    pub industry: Option<String>,
    pub president: Option<String>,
    pub company: Option<String>,
    pub prefecture: Option<String>,
}

impl EnrichmentResult {
    /// 解析富化服务的文本回复
    ///
    /// 回复必须恰好包含4个逗号分隔的字段（行业、代表人、公司、都道府县）。
    /// 字段数不对或回复为空时返回空结果，不视为错误。
    pub fn parse(reply: &str) -> Self {
        let fields: Vec<&str> = reply.trim().split(',').map(str::trim).collect();
        if fields.len() != FIELD_COUNT {
            return Self::default();
        }

        Self {
            industry: field_value(fields[0]),
            president: field_value(fields[1]),
            company: field_value(fields[2]),
            prefecture: field_value(fields[3]),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.industry.is_none()
            && self.president.is_none()
            && self.company.is_none()
            && self.prefecture.is_none()
    }
}

fn field_value(raw: &str) -> Option<String> {
    if raw.is_empty() || raw == NOT_FOUND_SENTINEL {
        None
    } else {
        Some(raw.to_string())
    }
}
