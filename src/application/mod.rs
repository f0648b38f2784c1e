// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 包含流水线的业务逻辑和用例实现，与基础设施分离
pub mod dto;
pub mod use_cases;
