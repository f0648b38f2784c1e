// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::workers::Worker;
use std::sync::Arc;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// 工作管理器
///
/// 为每个后台Worker启动独立任务，并在收到关闭信号时统一终止。
#[derive(Default)]
pub struct WorkerManager {
    handles: Vec<(String, JoinHandle<()>)>,
}

impl WorkerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 启动一个工作进程
    ///
    /// # 参数
    ///
    /// * `worker` - 要运行的Worker，退出或出错时记录日志
    pub fn spawn(&mut self, worker: Arc<dyn Worker>) {
        let name = worker.name().to_string();
        let task_name = name.clone();
        let handle = tokio::spawn(async move {
            match worker.run().await {
                Ok(()) => info!(worker = %task_name, "Worker exited"),
                Err(e) => error!(worker = %task_name, error = %e, "Worker stopped with error"),
            }
        });
        info!(worker = %name, "Worker started");
        self.handles.push((name, handle));
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// 终止所有工作进程
    pub fn shutdown(&mut self) {
        info!("Shutting down workers...");
        for (name, handle) in self.handles.drain(..) {
            handle.abort();
            info!(worker = %name, "Worker aborted");
        }
    }

    /// 等待关闭信号并关闭工作进程
    pub async fn wait_for_shutdown(&mut self) {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(err) => error!("Unable to listen for shutdown signal: {}", err),
        }
        self.shutdown();
        info!("Workers shut down successfully");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::errors::WorkerError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingWorker {
        runs: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Worker for CountingWorker {
        async fn run(&self) -> Result<(), WorkerError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            std::future::pending::<()>().await;
            Ok(())
        }

        fn name(&self) -> &str {
            "counting-worker"
        }
    }

    #[tokio::test]
    async fn test_spawn_and_shutdown() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut manager = WorkerManager::new();
        manager.spawn(Arc::new(CountingWorker { runs: runs.clone() }));
        assert_eq!(manager.len(), 1);

        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        manager.shutdown();
        assert!(manager.is_empty());
    }
}
