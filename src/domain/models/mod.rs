// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了流水线的核心业务实体，包括：
/// - 域名（domain）：流水线中的工作单元及其状态机
/// - 目标（target）：带有分页游标的抓取来源
/// - 消息（message）：消息通道上传递的最小信封
/// - 富化结果（enrichment）：富化服务返回的结构化字段
pub mod domain;
pub mod enrichment;
pub mod message;
pub mod target;
