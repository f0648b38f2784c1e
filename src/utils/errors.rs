// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::RepositoryError;
use sea_orm::DbErr;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// 流水线错误类型
///
/// 所有用例对外暴露的错误。每个变体对应一种错误类别，
/// 运维面板据此区分"稍后重试"、"数据问题"和"程序缺陷"。
#[derive(Error, Debug)]
pub enum PipelineError {
    /// 记录不存在
    #[error("{0} not found")]
    NotFound(String),

    /// 输入或外部数据不合法
    #[error("validation failed: {0}")]
    Validation(String),

    /// 外部服务（反查、富化、导出、消息通道）调用失败
    #[error("{service} request failed: {message}")]
    ExternalApi {
        service: &'static str,
        message: String,
    },

    /// 存储读写失败
    #[error("database error: {0}")]
    Database(String),

    /// 事务开启、提交或回滚失败
    #[error("transaction error: {0}")]
    Transaction(String),

    /// 超出调用方给定的期限
    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl PipelineError {
    pub fn external(service: &'static str, err: impl fmt::Display) -> Self {
        Self::ExternalApi {
            service,
            message: err.to_string(),
        }
    }

    pub fn transaction(err: DbErr) -> Self {
        Self::Transaction(err.to_string())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::ExternalApi { .. } => ErrorKind::ExternalApi,
            Self::Database(_) => ErrorKind::Database,
            Self::Transaction(_) => ErrorKind::Transaction,
            Self::Timeout(_) => ErrorKind::Timeout,
        }
    }
}

impl From<RepositoryError> for PipelineError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(resource) => Self::NotFound(resource),
            RepositoryError::Database(db_err) => Self::Database(db_err.to_string()),
        }
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Validation(err.to_string())
    }
}

/// 错误种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Validation,
    ExternalApi,
    Database,
    Transaction,
    Timeout,
}

impl ErrorKind {
    pub fn class(self) -> ErrorClass {
        match self {
            ErrorKind::ExternalApi | ErrorKind::Timeout => ErrorClass::RetryLater,
            ErrorKind::Validation | ErrorKind::NotFound => ErrorClass::DataProblem,
            ErrorKind::Database | ErrorKind::Transaction => ErrorClass::Bug,
        }
    }
}

/// 面向运维的错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// 外部服务暂时不可用，稍后重试即可
    RetryLater,
    /// 数据本身有问题，需要人工处理
    DataProblem,
    /// 程序或存储层缺陷
    Bug,
}

/// 批处理中单个条目的失败记录
#[derive(Debug, Clone, Serialize)]
pub struct ItemFailure {
    pub id: i32,
    pub kind: ErrorKind,
    pub class: ErrorClass,
    pub error: String,
}

impl From<(i32, PipelineError)> for ItemFailure {
    fn from((id, error): (i32, PipelineError)) -> Self {
        let kind = error.kind();
        Self {
            id,
            kind,
            class: kind.class(),
            error: error.to_string(),
        }
    }
}

/// Worker错误类型
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("流水线错误: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("内部错误: {0}")]
    InternalError(String),
}
