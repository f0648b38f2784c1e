// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::RepositoryError;
use crate::domain::models::target::{Target, TargetStatus};
use async_trait::async_trait;
use sea_orm::ConnectionTrait;

/// 目标查询条件
#[derive(Debug, Default, Clone)]
pub struct TargetFilter {
    pub ids: Option<Vec<i32>>,
    pub ip: Option<String>,
    pub name: Option<String>,
    pub status: Option<TargetStatus>,
    /// 排除某个状态，用于过滤已停用的目标
    pub exclude_status: Option<TargetStatus>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl TargetFilter {
    /// 所有未停用的目标
    pub fn active() -> Self {
        Self {
            exclude_status: Some(TargetStatus::Disabled),
            ..Default::default()
        }
    }
}

/// 目标仓库特质
#[async_trait]
pub trait TargetRepository: Send + Sync {
    /// 按条件查询目标，结果按ID升序
    async fn find_all<C>(
        &self,
        conn: &C,
        filter: &TargetFilter,
    ) -> Result<Vec<Target>, RepositoryError>
    where
        C: ConnectionTrait;

    async fn find_by_id<C>(&self, conn: &C, id: i32) -> Result<Option<Target>, RepositoryError>
    where
        C: ConnectionTrait;

    /// 加排他行锁读取目标，用于串行化游标推进
    async fn find_for_update<C>(&self, conn: &C, id: i32) -> Result<Option<Target>, RepositoryError>
    where
        C: ConnectionTrait;

    /// 创建目标
    ///
    /// # 返回值
    ///
    /// * `Ok(Target)` - 带有生成ID的目标
    /// * `Err(RepositoryError)` - 创建失败（例如IP重复）
    async fn create<C>(&self, conn: &C, target: &Target) -> Result<Target, RepositoryError>
    where
        C: ConnectionTrait;

    async fn save<C>(&self, conn: &C, target: &Target) -> Result<Target, RepositoryError>
    where
        C: ConnectionTrait;
}
