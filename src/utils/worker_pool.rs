// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::PipelineError;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// 工作池的失败策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// 单个任务失败只记录，不影响其余任务
    #[default]
    Isolate,
    /// 首个失败立即返回，仍在执行的任务被丢弃
    FailFast,
}

/// 工作池执行结果
#[derive(Debug)]
pub struct PoolReport<K, T> {
    pub completed: Vec<(K, T)>,
    pub failed: Vec<(K, PipelineError)>,
}

impl<K, T> Default for PoolReport<K, T> {
    fn default() -> Self {
        Self {
            completed: Vec::new(),
            failed: Vec::new(),
        }
    }
}

/// 以固定并发上限执行一批任务
///
/// 每个条目带一个键，用于在报告和日志中标识失败的条目。
/// 结果顺序不保证与输入一致。
///
/// # 参数
///
/// * `items` - `(键, 输入)` 列表
/// * `limit` - 并发上限，0 按 1 处理
/// * `policy` - 失败策略
/// * `task` - 处理单个输入的异步函数
///
/// # 返回值
///
/// * `Ok(PoolReport)` - 所有任务都已结束（`Isolate` 下可能含失败项）
/// * `Err(PipelineError)` - `FailFast` 下的首个错误
pub async fn run_bounded<K, I, T, F, Fut>(
    items: Vec<(K, I)>,
    limit: usize,
    policy: FailurePolicy,
    task: F,
) -> Result<PoolReport<K, T>, PipelineError>
where
    K: Debug + Send,
    I: Send,
    T: Send,
    F: Fn(I) -> Fut + Sync,
    Fut: Future<Output = Result<T, PipelineError>> + Send,
{
    let task = &task;
    let mut results = stream::iter(items.into_iter().map(|(key, item)| async move {
        let result = task(item).await;
        (key, result)
    }))
    .buffer_unordered(limit.max(1));

    let mut report = PoolReport::default();
    while let Some((key, result)) = results.next().await {
        match result {
            Ok(value) => report.completed.push((key, value)),
            Err(error) => match policy {
                FailurePolicy::Isolate => {
                    warn!(item = ?key, error = %error, "Pool task failed");
                    report.failed.push((key, error));
                }
                FailurePolicy::FailFast => {
                    warn!(item = ?key, error = %error, "Pool task failed, aborting batch");
                    return Err(error);
                }
            },
        }
    }

    Ok(report)
}

/// 在期限内执行一个原子单元
///
/// 超时后 `fut` 被丢弃，其中持有的事务随之回滚。
pub async fn with_deadline<T, Fut>(deadline: Duration, fut: Fut) -> Result<T, PipelineError>
where
    Fut: Future<Output = Result<T, PipelineError>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(PipelineError::Timeout(deadline)),
    }
}
