// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// HTTP请求处理器模块
///
/// 每个处理器只做参数提取，业务逻辑全部委托给对应的用例
pub mod domain_handler;
pub mod pipeline_handler;
pub mod target_handler;
pub mod webhook_handler;
