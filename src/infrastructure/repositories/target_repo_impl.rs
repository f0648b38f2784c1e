// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::target::{Target, TargetStatus};
use crate::domain::repositories::target_repository::{TargetFilter, TargetRepository};
use crate::domain::repositories::RepositoryError;
use crate::infrastructure::database::entities::target as target_entity;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::*;

/// 目标仓库实现
#[derive(Debug, Default, Clone)]
pub struct TargetRepositoryImpl;

impl TargetRepositoryImpl {
    pub fn new() -> Self {
        Self
    }
}

impl TryFrom<target_entity::Model> for Target {
    type Error = RepositoryError;

    fn try_from(model: target_entity::Model) -> Result<Self, Self::Error> {
        let status = model
            .status
            .parse::<TargetStatus>()
            .map_err(|e| RepositoryError::Database(DbErr::Custom(e)))?;

        Ok(Self {
            id: model.id,
            ip: model.ip,
            name: model.name,
            status,
            unbounded: model.unbounded,
            current_page: model.current_page,
            last_fetched_at: model.last_fetched_at.map(Into::into),
            last_full_scan_at: model.last_full_scan_at.map(Into::into),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }
}

impl From<&Target> for target_entity::ActiveModel {
    fn from(target: &Target) -> Self {
        Self {
            id: if target.id > 0 { Set(target.id) } else { NotSet },
            ip: Set(target.ip.clone()),
            name: Set(target.name.clone()),
            status: Set(target.status.to_string()),
            unbounded: Set(target.unbounded),
            current_page: Set(target.current_page),
            last_fetched_at: Set(target.last_fetched_at.map(Into::into)),
            last_full_scan_at: Set(target.last_full_scan_at.map(Into::into)),
            created_at: Set(target.created_at.into()),
            updated_at: Set(target.updated_at.into()),
        }
    }
}

#[async_trait]
impl TargetRepository for TargetRepositoryImpl {
    async fn find_all<C>(
        &self,
        conn: &C,
        filter: &TargetFilter,
    ) -> Result<Vec<Target>, RepositoryError>
    where
        C: ConnectionTrait,
    {
        let mut query = target_entity::Entity::find();
        if let Some(ids) = &filter.ids {
            query = query.filter(target_entity::Column::Id.is_in(ids.clone()));
        }
        if let Some(ip) = &filter.ip {
            query = query.filter(target_entity::Column::Ip.eq(ip.as_str()));
        }
        if let Some(name) = &filter.name {
            query = query.filter(target_entity::Column::Name.eq(name.as_str()));
        }
        if let Some(status) = filter.status {
            query = query.filter(target_entity::Column::Status.eq(status.as_str()));
        }
        if let Some(excluded) = filter.exclude_status {
            query = query.filter(target_entity::Column::Status.ne(excluded.as_str()));
        }

        query
            .order_by_asc(target_entity::Column::Id)
            .limit(filter.limit)
            .offset(filter.offset)
            .all(conn)
            .await?
            .into_iter()
            .map(Target::try_from)
            .collect()
    }

    async fn find_by_id<C>(&self, conn: &C, id: i32) -> Result<Option<Target>, RepositoryError>
    where
        C: ConnectionTrait,
    {
        target_entity::Entity::find_by_id(id)
            .one(conn)
            .await?
            .map(Target::try_from)
            .transpose()
    }

    async fn find_for_update<C>(&self, conn: &C, id: i32) -> Result<Option<Target>, RepositoryError>
    where
        C: ConnectionTrait,
    {
        target_entity::Entity::find_by_id(id)
            .lock_exclusive()
            .one(conn)
            .await?
            .map(Target::try_from)
            .transpose()
    }

    async fn create<C>(&self, conn: &C, target: &Target) -> Result<Target, RepositoryError>
    where
        C: ConnectionTrait,
    {
        let mut model = target_entity::ActiveModel::from(target);
        model.id = NotSet;
        let created = model.insert(conn).await?;
        Target::try_from(created)
    }

    async fn save<C>(&self, conn: &C, target: &Target) -> Result<Target, RepositoryError>
    where
        C: ConnectionTrait,
    {
        let mut model = target_entity::ActiveModel::from(target);
        model.id = Set(target.id);
        model.created_at = NotSet;
        model.updated_at = Set(Utc::now().into());

        match model.update(conn).await {
            Ok(updated) => Target::try_from(updated),
            Err(DbErr::RecordNotUpdated) => {
                Err(RepositoryError::NotFound(format!("target {}", target.id)))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_target, setup_db};

    #[tokio::test]
    async fn test_create_assigns_id_and_defaults() {
        let db = setup_db().await;
        let repo = TargetRepositoryImpl::new();

        let created = repo
            .create(&db, &Target::new("203.0.113.10", "sakura", false))
            .await
            .unwrap();
        assert!(created.id > 0);
        assert_eq!(created.status, TargetStatus::Init);
        assert_eq!(created.current_page, 1);
        assert!(created.last_fetched_at.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_ip_is_rejected() {
        let db = setup_db().await;
        let repo = TargetRepositoryImpl::new();
        seed_target(&db, "203.0.113.10", "sakura").await;

        let result = repo
            .create(&db, &Target::new("203.0.113.10", "again", false))
            .await;
        assert!(matches!(result, Err(RepositoryError::Database(_))));
    }

    #[tokio::test]
    async fn test_active_filter_excludes_disabled() {
        let db = setup_db().await;
        let repo = TargetRepositoryImpl::new();
        let mut disabled = seed_target(&db, "203.0.113.10", "old").await;
        seed_target(&db, "203.0.113.11", "live").await;

        disabled.status = TargetStatus::Disabled;
        repo.save(&db, &disabled).await.unwrap();

        let active = repo.find_all(&db, &TargetFilter::active()).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "live");
    }

    #[tokio::test]
    async fn test_save_persists_cursor_and_timestamps() {
        let db = setup_db().await;
        let repo = TargetRepositoryImpl::new();
        let mut target = seed_target(&db, "203.0.113.10", "sakura").await;

        let now = Utc::now();
        target.current_page = 4;
        target.last_fetched_at = Some(now);
        repo.save(&db, &target).await.unwrap();

        let reloaded = repo.find_by_id(&db, target.id).await.unwrap().unwrap();
        assert_eq!(reloaded.current_page, 4);
        assert_eq!(
            reloaded.last_fetched_at.map(|t| t.timestamp()),
            Some(now.timestamp())
        );
        assert!(reloaded.last_full_scan_at.is_none());
    }
}
