// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::DbErr;
use thiserror::Error;

/// 仓库接口模块
///
/// 该模块定义了领域层的仓库接口，具体实现由基础设施层提供。
/// 所有方法都接收一个显式的连接或事务句柄，调用方据此决定
/// 操作是否处于同一个事务之内。
///
/// 包含的仓库接口：
/// - 域名仓库（domain_repository）：域名的过滤读取、加锁读取、去重插入和批量状态更新
/// - 目标仓库（target_repository）：抓取目标的读取、加锁读取和保存
pub mod domain_repository;
pub mod target_repository;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("{0} not found")]
    NotFound(String),
}
