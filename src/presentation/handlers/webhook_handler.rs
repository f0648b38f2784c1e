// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::use_cases::enrichment_consumer::EnrichmentConsumer;
use crate::domain::models::message::PushRequest;
use crate::domain::repositories::domain_repository::DomainRepository;
use crate::presentation::errors::AppError;
use axum::{http::StatusCode, Extension, Json};
use std::sync::Arc;
use tracing::debug;

/// 推送投递入口
///
/// 解码推送信封并同步执行富化；无论消费者是否实际修改了记录都返回 204，
/// 这样通道不会对已处理或过期的消息反复重投。
pub async fn analyze_push<DR: DomainRepository + 'static>(
    Extension(consumer): Extension<Arc<EnrichmentConsumer<DR>>>,
    Json(request): Json<PushRequest>,
) -> Result<StatusCode, AppError> {
    let message = request.domain_message()?;
    let outcome = consumer.analyze_domain(message).await?;
    debug!(
        domain_id = message.domain_id,
        message_id = ?request.message.message_id,
        outcome = ?outcome,
        "Push delivery handled"
    );
    Ok(StatusCode::NO_CONTENT)
}
