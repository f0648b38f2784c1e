// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::RepositoryError;
use crate::domain::models::domain::{Domain, DomainStatus};
use async_trait::async_trait;
use sea_orm::ConnectionTrait;
use std::collections::HashSet;

/// 域名查询条件
#[derive(Debug, Default, Clone)]
pub struct DomainFilter {
    pub ids: Option<Vec<i32>>,
    pub statuses: Option<Vec<DomainStatus>>,
    pub target: Option<String>,
    /// 名称模糊匹配
    pub name_contains: Option<String>,
    pub can_view: Option<bool>,
    pub is_japan: Option<bool>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl DomainFilter {
    pub fn with_status(status: DomainStatus) -> Self {
        Self {
            statuses: Some(vec![status]),
            ..Default::default()
        }
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// 域名仓库特质
///
/// 定义域名数据访问接口。所有方法接收显式的连接句柄，
/// 传入 `DatabaseTransaction` 即可让多个调用共享同一事务。
#[async_trait]
pub trait DomainRepository: Send + Sync {
    /// 按条件查询域名，结果按ID升序
    async fn find_all<C>(
        &self,
        conn: &C,
        filter: &DomainFilter,
    ) -> Result<Vec<Domain>, RepositoryError>
    where
        C: ConnectionTrait;

    /// 按条件统计域名数量（忽略分页参数）
    async fn count<C>(&self, conn: &C, filter: &DomainFilter) -> Result<u64, RepositoryError>
    where
        C: ConnectionTrait;

    /// 根据ID查找域名
    async fn find_by_id<C>(&self, conn: &C, id: i32) -> Result<Option<Domain>, RepositoryError>
    where
        C: ConnectionTrait;

    /// 加排他行锁读取域名
    ///
    /// 锁在事务提交或回滚时释放，因此 `conn` 应当是一个事务。
    ///
    /// # 返回值
    ///
    /// * `Ok(Some(Domain))` - 找到并锁定的域名
    /// * `Ok(None)` - 域名不存在
    /// * `Err(RepositoryError)` - 查询失败
    async fn find_for_update<C>(&self, conn: &C, id: i32) -> Result<Option<Domain>, RepositoryError>
    where
        C: ConnectionTrait;

    /// 返回给定名称中已存在于库中的那部分
    async fn existing_names<C>(
        &self,
        conn: &C,
        names: &[String],
    ) -> Result<HashSet<String>, RepositoryError>
    where
        C: ConnectionTrait;

    /// 去重插入
    ///
    /// 名称冲突的行被静默跳过，已有记录保持不变。
    ///
    /// # 返回值
    ///
    /// * `Ok(u64)` - 实际插入的行数
    /// * `Err(RepositoryError)` - 插入失败
    async fn insert_new<C>(&self, conn: &C, domains: &[Domain]) -> Result<u64, RepositoryError>
    where
        C: ConnectionTrait;

    /// 保存域名的全部可变字段
    async fn save<C>(&self, conn: &C, domain: &Domain) -> Result<Domain, RepositoryError>
    where
        C: ConnectionTrait;

    /// 批量状态更新
    ///
    /// 只更新 `ids` 中当前状态仍为 `from` 的行。
    ///
    /// # 返回值
    ///
    /// * `Ok(u64)` - 受影响的行数
    /// * `Err(RepositoryError)` - 更新失败
    async fn bulk_update_status<C>(
        &self,
        conn: &C,
        ids: &[i32],
        from: DomainStatus,
        to: DomainStatus,
    ) -> Result<u64, RepositoryError>
    where
        C: ConnectionTrait;
}
