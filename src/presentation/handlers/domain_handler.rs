// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::domain_request::{DomainQueryRequest, UpdateDomainRequest};
use crate::application::use_cases::domain_admin::{DomainAdmin, DomainPage};
use crate::domain::models::domain::Domain;
use crate::domain::repositories::domain_repository::DomainRepository;
use crate::presentation::errors::AppError;
use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use std::sync::Arc;

/// 域名列表查询处理器
pub async fn list_domains<DR: DomainRepository + 'static>(
    Extension(admin): Extension<Arc<DomainAdmin<DR>>>,
    Query(query): Query<DomainQueryRequest>,
) -> Result<Json<DomainPage>, AppError> {
    Ok(Json(admin.list(&query).await?))
}

pub async fn get_domain<DR: DomainRepository + 'static>(
    Extension(admin): Extension<Arc<DomainAdmin<DR>>>,
    Path(id): Path<i32>,
) -> Result<Json<Domain>, AppError> {
    Ok(Json(admin.get(id).await?))
}

/// 运维更新域名字段
pub async fn update_domain<DR: DomainRepository + 'static>(
    Extension(admin): Extension<Arc<DomainAdmin<DR>>>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateDomainRequest>,
) -> Result<Json<Domain>, AppError> {
    Ok(Json(admin.update_domain(id, request).await?))
}

pub async fn trash_domain<DR: DomainRepository + 'static>(
    Extension(admin): Extension<Arc<DomainAdmin<DR>>>,
    Path(id): Path<i32>,
) -> Result<Json<Domain>, AppError> {
    Ok(Json(admin.trash(id).await?))
}
