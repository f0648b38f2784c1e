// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::domain::repositories::RepositoryError;
use crate::utils::errors::{ErrorKind, PipelineError};

/// 应用错误类型
///
/// 封装所有可能的应用层错误，按错误种类映射HTTP状态码，
/// 响应体同时带上种类和分类，便于运维区分"稍后重试"、"数据问题"和"程序缺陷"。
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    fn kind(&self) -> ErrorKind {
        if let Some(err) = self.0.downcast_ref::<PipelineError>() {
            return err.kind();
        }
        match self.0.downcast_ref::<RepositoryError>() {
            Some(RepositoryError::NotFound(_)) => ErrorKind::NotFound,
            _ => ErrorKind::Database,
        }
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::ExternalApi => StatusCode::BAD_GATEWAY,
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::Database | ErrorKind::Transaction => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = status_for(kind);
        let error_message = self.0.to_string();

        if status.is_server_error() {
            error!(error = %error_message, kind = ?kind, "Request failed");
        }

        let body = Json(json!({
            "error": error_message,
            "kind": kind,
            "class": kind.class(),
        }));
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
