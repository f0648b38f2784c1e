// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// 结果集过大、无法完整轮询的目标名称
pub const UNBOUNDED_TARGET_NAME: &str = "WIX";

/// 目标生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStatus {
    Init,
    Fetched,
    Disabled,
}

impl TargetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetStatus::Init => "init",
            TargetStatus::Fetched => "fetched",
            TargetStatus::Disabled => "disabled",
        }
    }
}

impl fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "init" => Ok(TargetStatus::Init),
            "fetched" => Ok(TargetStatus::Fetched),
            "disabled" => Ok(TargetStatus::Disabled),
            other => Err(format!("unknown target status: {}", other)),
        }
    }
}

/// 目标分类，决定游标推进策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetClass {
    /// 游标停在末页，不回绕
    Unbounded,
    /// 每轮完整扫描后回到第一页
    Bounded,
}

/// 抓取目标（通常是一个托管商IP）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: i32,
    pub ip: String,
    pub name: String,
    pub status: TargetStatus,
    /// 显式标记为无界目标
    pub unbounded: bool,
    /// 抓取游标，从1开始
    pub current_page: i32,
    pub last_fetched_at: Option<DateTime<Utc>>,
    pub last_full_scan_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Target {
    pub fn new(ip: impl Into<String>, name: impl Into<String>, unbounded: bool) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            ip: ip.into(),
            name: name.into(),
            status: TargetStatus::Init,
            unbounded,
            current_page: 1,
            last_fetched_at: None,
            last_full_scan_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn class(&self) -> TargetClass {
        if self.unbounded || self.name == UNBOUNDED_TARGET_NAME {
            TargetClass::Unbounded
        } else {
            TargetClass::Bounded
        }
    }

    pub fn is_active(&self) -> bool {
        self.status != TargetStatus::Disabled
    }

    /// 当前页，非正数按第一页处理
    pub fn page(&self) -> i32 {
        self.current_page.max(1)
    }
}

/// 按"陈旧度"比较两个目标
///
/// 从未抓取过的目标排在最前，其次按最后抓取时间升序，相同时按ID升序。
pub fn staleness_order(a: &Target, b: &Target) -> Ordering {
    match (a.last_fetched_at, b.last_fetched_at) {
        (None, None) => a.id.cmp(&b.id),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.cmp(&y).then(a.id.cmp(&b.id)),
    }
}

pub fn sort_by_staleness(targets: &mut [Target]) {
    targets.sort_by(staleness_order);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn target(id: i32, last_fetched_at: Option<DateTime<Utc>>) -> Target {
        let mut t = Target::new(format!("192.0.2.{}", id), format!("t{}", id), false);
        t.id = id;
        t.last_fetched_at = last_fetched_at;
        t
    }

    #[test]
    fn test_sort_by_staleness_puts_never_fetched_first() {
        let t1 = Utc::now() - Duration::hours(2);
        let t2 = Utc::now() - Duration::hours(1);
        let mut targets = vec![
            target(4, Some(t2)),
            target(3, None),
            target(2, Some(t1)),
            target(1, None),
        ];

        sort_by_staleness(&mut targets);

        let order: Vec<i32> = targets.iter().map(|t| t.id).collect();
        assert_eq!(order, vec![1, 3, 2, 4]);
    }

    #[test]
    fn test_sort_by_staleness_breaks_ties_by_id() {
        let at = Utc::now();
        let mut targets = vec![target(9, Some(at)), target(5, Some(at))];
        sort_by_staleness(&mut targets);
        assert_eq!(targets[0].id, 5);
    }

    #[test]
    fn test_target_class() {
        assert_eq!(Target::new("a", "WIX", false).class(), TargetClass::Unbounded);
        assert_eq!(Target::new("a", "sakura", true).class(), TargetClass::Unbounded);
        assert_eq!(Target::new("a", "sakura", false).class(), TargetClass::Bounded);
    }

    #[test]
    fn test_page_defaults_to_one() {
        let mut t = Target::new("a", "b", false);
        t.current_page = 0;
        assert_eq!(t.page(), 1);
        t.current_page = -3;
        assert_eq!(t.page(), 1);
        t.current_page = 7;
        assert_eq!(t.page(), 7);
    }
}
