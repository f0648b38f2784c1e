// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::exporter::{DomainExporter, ExportBatch, ExportRow};
use crate::utils::errors::PipelineError;
use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

const SERVICE: &str = "LocalExporter";

/// 本地文件导出
///
/// 每个批次写入一个以时间戳命名的目录，每个目标一个 JSON 文件。
/// 文件先写入临时目录，全部成功后整体重命名，读取方不会看到半个批次。
pub struct LocalExporter {
    base_path: PathBuf,
}

impl LocalExporter {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn file_name(target: &str) -> String {
        let safe: String = target
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}.json", safe)
    }

    async fn write_group(
        dir: &Path,
        target: &str,
        rows: &[ExportRow],
    ) -> Result<(), PipelineError> {
        let data =
            serde_json::to_vec_pretty(rows).map_err(|e| PipelineError::external(SERVICE, e))?;
        let mut file = fs::File::create(dir.join(Self::file_name(target)))
            .await
            .map_err(|e| PipelineError::external(SERVICE, e))?;
        file.write_all(&data)
            .await
            .map_err(|e| PipelineError::external(SERVICE, e))?;
        file.flush()
            .await
            .map_err(|e| PipelineError::external(SERVICE, e))?;
        Ok(())
    }
}

#[async_trait]
impl DomainExporter for LocalExporter {
    async fn export(&self, batch: &ExportBatch) -> Result<(), PipelineError> {
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%.6fZ").to_string();
        let partial = self.base_path.join(format!(".partial-{}", stamp));
        let complete = self.base_path.join(&stamp);

        fs::create_dir_all(&partial)
            .await
            .map_err(|e| PipelineError::external(SERVICE, e))?;

        for (target, domains) in batch {
            let rows: Vec<ExportRow> = domains.iter().map(ExportRow::from).collect();
            if let Err(e) = Self::write_group(&partial, target, &rows).await {
                let _ = fs::remove_dir_all(&partial).await;
                return Err(e);
            }
        }

        fs::rename(&partial, &complete)
            .await
            .map_err(|e| PipelineError::external(SERVICE, e))?;

        info!(path = %complete.display(), groups = batch.len(), "Export batch written");
        Ok(())
    }
}
