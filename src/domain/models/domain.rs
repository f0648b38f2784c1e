// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::enrichment::EnrichmentResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 域名处理状态
///
/// 按流水线顺序排列。`Done` 与 `Trash` 为终态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainStatus {
    /// 未使用的占位状态
    Unknown,
    /// 刚被发现
    Initialize,
    /// 已派发给外部可见性检查
    CheckView,
    /// 等待日语站点判定
    CheckJapan,
    /// 公司信息已抓取，等待富化
    CrawlCompInfo,
    /// 已富化，等待导出
    PendingOutput,
    /// 已导出
    Done,
    /// 人工排除
    Trash,
}

impl DomainStatus {
    pub const ALL: [DomainStatus; 8] = [
        DomainStatus::Unknown,
        DomainStatus::Initialize,
        DomainStatus::CheckView,
        DomainStatus::CheckJapan,
        DomainStatus::CrawlCompInfo,
        DomainStatus::PendingOutput,
        DomainStatus::Done,
        DomainStatus::Trash,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DomainStatus::Unknown => "unknown",
            DomainStatus::Initialize => "initialize",
            DomainStatus::CheckView => "check_view",
            DomainStatus::CheckJapan => "check_japan",
            DomainStatus::CrawlCompInfo => "crawl_comp_info",
            DomainStatus::PendingOutput => "pending_output",
            DomainStatus::Done => "done",
            DomainStatus::Trash => "trash",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DomainStatus::Done | DomainStatus::Trash)
    }
}

impl fmt::Display for DomainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 无法识别的状态标签
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown domain status: {0}")]
pub struct InvalidStatus(pub String);

impl FromStr for DomainStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DomainStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| InvalidStatus(s.to_string()))
    }
}

/// 域名实体
///
/// 流水线中的基本工作单元，一个被发现的主机名。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub id: i32,
    pub name: String,
    /// 发现该域名的目标名称
    pub target: String,
    pub status: DomainStatus,
    pub can_view: bool,
    pub is_japan: bool,
    pub is_send: bool,
    pub title: String,
    pub owner_id: String,
    pub address: String,
    pub phone: String,
    pub mobile_phone: String,
    pub landline_phone: String,
    pub industry: String,
    pub president: String,
    pub company: String,
    pub prefecture: String,
    pub is_ssl: bool,
    #[serde(skip_serializing)]
    pub raw_page: String,
    pub page_num: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Domain {
    /// 创建新发现的域名，状态为 `initialize`
    pub fn discovered(name: impl Into<String>, target: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name: name.into(),
            target: target.into(),
            status: DomainStatus::Initialize,
            can_view: false,
            is_japan: false,
            is_send: false,
            title: String::new(),
            owner_id: String::new(),
            address: String::new(),
            phone: String::new(),
            mobile_phone: String::new(),
            landline_phone: String::new(),
            industry: String::new(),
            president: String::new(),
            company: String::new(),
            prefecture: String::new(),
            is_ssl: false,
            raw_page: String::new(),
            page_num: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// 应用富化结果
    ///
    /// 只覆盖有值的字段，"未找到"的字段保持原值。
    pub fn apply_enrichment(&mut self, result: &EnrichmentResult) {
        if let Some(industry) = &result.industry {
            self.industry = industry.clone();
        }
        if let Some(president) = &result.president {
            self.president = president.clone();
        }
        if let Some(company) = &result.company {
            self.company = company.clone();
        }
        if let Some(prefecture) = &result.prefecture {
            self.prefecture = prefecture.clone();
        }
    }
}

/// 按字符数截断文本，不会切断多字节字符
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_through_str() {
        for status in DomainStatus::ALL {
            assert_eq!(status.as_str().parse::<DomainStatus>(), Ok(status));
        }
        assert!("exported".parse::<DomainStatus>().is_err());
        assert!("DONE".parse::<DomainStatus>().is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(DomainStatus::Done.is_terminal());
        assert!(DomainStatus::Trash.is_terminal());
        assert!(!DomainStatus::PendingOutput.is_terminal());
        assert!(!DomainStatus::Initialize.is_terminal());
    }

    #[test]
    fn test_apply_enrichment_keeps_missing_fields() {
        let mut domain = Domain::discovered("example.jp", "203.0.113.10");
        domain.president = "山田 太郎".to_string();
        domain.industry = "old".to_string();

        let result = EnrichmentResult {
            industry: Some("建設業".to_string()),
            president: None,
            company: Some("株式会社サンプル".to_string()),
            prefecture: Some("東京都".to_string()),
        };
        domain.apply_enrichment(&result);

        assert_eq!(domain.industry, "建設業");
        assert_eq!(domain.president, "山田 太郎");
        assert_eq!(domain.company, "株式会社サンプル");
        assert_eq!(domain.prefecture, "東京都");
    }

    #[test]
    fn test_truncate_chars_counts_code_points() {
        assert_eq!(truncate_chars("株式会社", 2), "株式");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
        assert_eq!(truncate_chars("abc", 0), "");
    }
}
