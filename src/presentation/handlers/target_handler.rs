// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::target_request::{
    CreateTargetRequest, TargetQueryRequest, UpdateTargetRequest,
};
use crate::application::use_cases::target_admin::TargetAdmin;
use crate::domain::models::target::Target;
use crate::domain::repositories::target_repository::TargetRepository;
use crate::presentation::errors::AppError;
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;

pub async fn list_targets<TR: TargetRepository + 'static>(
    Extension(admin): Extension<Arc<TargetAdmin<TR>>>,
    Query(query): Query<TargetQueryRequest>,
) -> Result<Json<Vec<Target>>, AppError> {
    Ok(Json(admin.list(&query).await?))
}

/// 创建抓取目标
pub async fn create_target<TR: TargetRepository + 'static>(
    Extension(admin): Extension<Arc<TargetAdmin<TR>>>,
    Json(request): Json<CreateTargetRequest>,
) -> Result<(StatusCode, Json<Target>), AppError> {
    let target = admin.create(request).await?;
    Ok((StatusCode::CREATED, Json(target)))
}

pub async fn update_target<TR: TargetRepository + 'static>(
    Extension(admin): Extension<Arc<TargetAdmin<TR>>>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateTargetRequest>,
) -> Result<Json<Target>, AppError> {
    Ok(Json(admin.update(id, request).await?))
}

/// 停用目标
pub async fn disable_target<TR: TargetRepository + 'static>(
    Extension(admin): Extension<Arc<TargetAdmin<TR>>>,
    Path(id): Path<i32>,
) -> Result<Json<Target>, AppError> {
    Ok(Json(admin.disable(id).await?))
}
