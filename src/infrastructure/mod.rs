// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 领域层特质的具体实现，负责与外部系统的交互。
///
/// 包含的子模块：
/// - 外部客户端（clients）：反查服务的HTTP客户端
/// - 数据库（database）：数据库连接和实体映射
/// - 导出（export）：本地文件导出
/// - 消息（messaging）：基于Redis列表的消息通道
/// - 指标（metrics）：Prometheus导出器
/// - 仓库实现（repositories）：领域仓库接口的具体实现
pub mod clients;
pub mod database;
pub mod export;
pub mod messaging;
pub mod metrics;
pub mod repositories;
