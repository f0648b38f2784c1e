// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::domain::{Domain, DomainStatus};
use crate::domain::repositories::domain_repository::{DomainFilter, DomainRepository};
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::domain as domain_entity;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::*;
use std::collections::HashSet;

/// 单条 SQL 中允许的最大行数/参数组数
const CHUNK_SIZE: usize = 100;

/// 域名仓库实现
///
/// 无状态，所有操作都在调用方传入的连接或事务上执行。
#[derive(Debug, Default, Clone)]
pub struct DomainRepositoryImpl;

impl DomainRepositoryImpl {
    pub fn new() -> Self {
        Self
    }
}

impl TryFrom<domain_entity::Model> for Domain {
    type Error = RepositoryError;

    fn try_from(model: domain_entity::Model) -> Result<Self, Self::Error> {
        let status = model
            .status
            .parse::<DomainStatus>()
            .map_err(|e| RepositoryError::Database(DbErr::Custom(e.to_string())))?;

        Ok(Self {
            id: model.id,
            name: model.name,
            target: model.target,
            status,
            can_view: model.can_view,
            is_japan: model.is_japan,
            is_send: model.is_send,
            title: model.title,
            owner_id: model.owner_id,
            address: model.address,
            phone: model.phone,
            mobile_phone: model.mobile_phone,
            landline_phone: model.landline_phone,
            industry: model.industry,
            president: model.president,
            company: model.company,
            prefecture: model.prefecture,
            is_ssl: model.is_ssl,
            raw_page: model.raw_page,
            page_num: model.page_num,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }
}

impl From<&Domain> for domain_entity::ActiveModel {
    fn from(domain: &Domain) -> Self {
        Self {
            id: if domain.id > 0 { Set(domain.id) } else { NotSet },
            name: Set(domain.name.clone()),
            target: Set(domain.target.clone()),
            status: Set(domain.status.to_string()),
            can_view: Set(domain.can_view),
            is_japan: Set(domain.is_japan),
            is_send: Set(domain.is_send),
            title: Set(domain.title.clone()),
            owner_id: Set(domain.owner_id.clone()),
            address: Set(domain.address.clone()),
            phone: Set(domain.phone.clone()),
            mobile_phone: Set(domain.mobile_phone.clone()),
            landline_phone: Set(domain.landline_phone.clone()),
            industry: Set(domain.industry.clone()),
            president: Set(domain.president.clone()),
            company: Set(domain.company.clone()),
            prefecture: Set(domain.prefecture.clone()),
            is_ssl: Set(domain.is_ssl),
            raw_page: Set(domain.raw_page.clone()),
            page_num: Set(domain.page_num),
            created_at: Set(domain.created_at.into()),
            updated_at: Set(domain.updated_at.into()),
        }
    }
}

fn apply_filter(
    mut query: Select<domain_entity::Entity>,
    filter: &DomainFilter,
) -> Select<domain_entity::Entity> {
    if let Some(ids) = &filter.ids {
        query = query.filter(domain_entity::Column::Id.is_in(ids.clone()));
    }
    if let Some(statuses) = &filter.statuses {
        query = query.filter(
            domain_entity::Column::Status.is_in(statuses.iter().map(|s| s.as_str())),
        );
    }
    if let Some(target) = &filter.target {
        query = query.filter(domain_entity::Column::Target.eq(target.as_str()));
    }
    if let Some(name) = &filter.name_contains {
        query = query.filter(domain_entity::Column::Name.contains(name.as_str()));
    }
    if let Some(can_view) = filter.can_view {
        query = query.filter(domain_entity::Column::CanView.eq(can_view));
    }
    if let Some(is_japan) = filter.is_japan {
        query = query.filter(domain_entity::Column::IsJapan.eq(is_japan));
    }
    query
}

fn collect_domains(models: Vec<domain_entity::Model>) -> Result<Vec<Domain>, RepositoryError> {
    models.into_iter().map(Domain::try_from).collect()
}

#[async_trait]
impl DomainRepository for DomainRepositoryImpl {
    async fn find_all<C>(
        &self,
        conn: &C,
        filter: &DomainFilter,
    ) -> Result<Vec<Domain>, RepositoryError>
    where
        C: ConnectionTrait,
    {
        let models = apply_filter(domain_entity::Entity::find(), filter)
            .order_by_asc(domain_entity::Column::Id)
            .limit(filter.limit)
            .offset(filter.offset)
            .all(conn)
            .await?;
        collect_domains(models)
    }

    async fn count<C>(&self, conn: &C, filter: &DomainFilter) -> Result<u64, RepositoryError>
    where
        C: ConnectionTrait,
    {
        let total = apply_filter(domain_entity::Entity::find(), filter)
            .count(conn)
            .await?;
        Ok(total)
    }

    async fn find_by_id<C>(&self, conn: &C, id: i32) -> Result<Option<Domain>, RepositoryError>
    where
        C: ConnectionTrait,
    {
        domain_entity::Entity::find_by_id(id)
            .one(conn)
            .await?
            .map(Domain::try_from)
            .transpose()
    }

    async fn find_for_update<C>(&self, conn: &C, id: i32) -> Result<Option<Domain>, RepositoryError>
    where
        C: ConnectionTrait,
    {
        domain_entity::Entity::find_by_id(id)
            .lock_exclusive()
            .one(conn)
            .await?
            .map(Domain::try_from)
            .transpose()
    }

    async fn existing_names<C>(
        &self,
        conn: &C,
        names: &[String],
    ) -> Result<HashSet<String>, RepositoryError>
    where
        C: ConnectionTrait,
    {
        let mut existing = HashSet::new();
        for chunk in names.chunks(CHUNK_SIZE) {
            let found: Vec<String> = domain_entity::Entity::find()
                .select_only()
                .column(domain_entity::Column::Name)
                .filter(domain_entity::Column::Name.is_in(chunk.iter().map(String::as_str)))
                .into_tuple()
                .all(conn)
                .await?;
            existing.extend(found);
        }
        Ok(existing)
    }

    async fn insert_new<C>(&self, conn: &C, domains: &[Domain]) -> Result<u64, RepositoryError>
    where
        C: ConnectionTrait,
    {
        let mut inserted = 0;
        for chunk in domains.chunks(CHUNK_SIZE) {
            let models = chunk.iter().map(domain_entity::ActiveModel::from);
            // 名称冲突时跳过，已有行保持不变
            inserted += domain_entity::Entity::insert_many(models)
                .on_conflict(
                    OnConflict::column(domain_entity::Column::Name)
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(conn)
                .await?;
        }
        Ok(inserted)
    }

    async fn save<C>(&self, conn: &C, domain: &Domain) -> Result<Domain, RepositoryError>
    where
        C: ConnectionTrait,
    {
        let mut model = domain_entity::ActiveModel::from(domain);
        model.id = Set(domain.id);
        model.created_at = NotSet;
        model.updated_at = Set(Utc::now().into());

        match model.update(conn).await {
            Ok(updated) => Domain::try_from(updated),
            Err(DbErr::RecordNotUpdated) => {
                Err(RepositoryError::NotFound(format!("domain {}", domain.id)))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn bulk_update_status<C>(
        &self,
        conn: &C,
        ids: &[i32],
        from: DomainStatus,
        to: DomainStatus,
    ) -> Result<u64, RepositoryError>
    where
        C: ConnectionTrait,
    {
        let now: DateTime<FixedOffset> = Utc::now().into();
        let mut affected = 0;
        for chunk in ids.chunks(CHUNK_SIZE) {
            let result = domain_entity::Entity::update_many()
                .col_expr(domain_entity::Column::Status, Expr::value(to.as_str()))
                .col_expr(domain_entity::Column::UpdatedAt, Expr::value(now))
                .filter(domain_entity::Column::Id.is_in(chunk.to_vec()))
                .filter(domain_entity::Column::Status.eq(from.as_str()))
                .exec(conn)
                .await?;
            affected += result.rows_affected;
        }
        Ok(affected)
    }
}
