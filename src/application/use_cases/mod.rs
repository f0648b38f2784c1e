// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 用例模块
///
/// 流水线的各个阶段和运维操作，每个用例只依赖领域层的特质
pub mod batch_exporter;
pub mod crawl_scheduler;
pub mod domain_admin;
pub mod enrichment_consumer;
pub mod fan_out;
pub mod target_admin;
