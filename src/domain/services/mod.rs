// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 该模块定义了流水线依赖的外部协作方接口：
/// - 反查服务（reverse_ip_service）：按IP分页查询托管的主机名
/// - LLM服务（llm_service）：从网页正文富化公司信息
/// - 消息通道（message_channel）：至少一次投递的发布与拉取
/// - 导出（exporter）：按目标分组的批量导出
pub mod exporter;
pub mod llm_service;
pub mod message_channel;
pub mod reverse_ip_service;
