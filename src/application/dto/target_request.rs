// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::target::TargetStatus;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CreateTargetRequest {
    #[validate(ip)]
    pub ip: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// 是否按无界目标处理（名称为 WIX 的目标总是无界）
    #[serde(default)]
    pub unbounded: bool,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize, Validate)]
pub struct UpdateTargetRequest {
    #[validate(ip)]
    pub ip: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub unbounded: Option<bool>,
    #[validate(range(min = 1))]
    pub current_page: Option<i32>,
}

#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct TargetQueryRequest {
    pub status: Option<TargetStatus>,
    /// 为 true 时包含已停用的目标
    #[serde(default)]
    pub include_disabled: bool,
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}
