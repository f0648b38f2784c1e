// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 周期流水线和消息消费两个后台Worker，以及它们的生命周期管理
pub mod channel_worker;
pub mod manager;
pub mod pipeline_worker;
pub mod worker;

pub use worker::Worker;
