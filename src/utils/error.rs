//! # 统一错误类型模块
//!
//! 电池测试记录系统的错误分类，按处理策略分为两类：
//! - 调用方可修正的错误（校验失败、编号冲突、引用的记录不存在），
//!   携带字段名或资源类型，调用方据此修正请求后重试
//! - 致命错误（存储故障、IO失败、配置损坏），原样上抛，不做自动重试
//!
//! 查询未命中不属于错误，统一用 `Ok(None)` / 空集合表达。

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 应用程序统一错误类型
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum AppError {
    /// 兜底的通用错误
    #[error("通用错误: {message}")]
    Generic { message: String },

    /// 文件/目录操作失败
    #[error("IO错误: {message} ({kind})")]
    IoError { message: String, kind: String },

    /// 底层存储故障，视为致命错误，事务已回滚
    #[error("持久化错误: {message}")]
    PersistenceError { message: String },

    /// 配置加载、解析或取值非法
    #[error("配置错误: {message}")]
    ConfigurationError { message: String },

    /// 请求字段超出声明的范围或形状，field指出问题字段
    #[error("验证错误: {field} {message}")]
    ValidationError { field: String, message: String },

    /// 锁获取失败等并发原语层面的错误
    #[error("并发错误: {message}")]
    ConcurrencyError { message: String },

    /// 被引用的记录不存在（创建时父记录缺失等）
    #[error("资源未找到: {resource_type} - {message}")]
    NotFoundError {
        resource_type: String,
        message: String,
    },

    /// 唯一性约束冲突（工号、组号、读数号重复）
    #[error("唯一性冲突: {resource_type} - {message}")]
    ConflictError {
        resource_type: String,
        message: String,
    },

    /// JSON编解码失败
    #[error("JSON序列化/反序列化错误: {message}")]
    JsonError { message: String },

    /// 报告装配或写出失败
    #[error("报告生成错误: {message}")]
    ReportGenerationError { message: String },
}

impl AppError {
    /// 构造通用错误
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// 构造IO错误，kind为std::io::ErrorKind的文本形式
    pub fn io_error(message: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::IoError {
            message: message.into(),
            kind: kind.into(),
        }
    }

    /// 构造持久化错误
    pub fn persistence_error(message: impl Into<String>) -> Self {
        Self::PersistenceError {
            message: message.into(),
        }
    }

    /// 构造配置错误
    pub fn configuration_error(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// 构造验证错误，field是请求中不合法的字段名
    pub fn validation_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// 构造并发错误
    pub fn concurrency_error(message: impl Into<String>) -> Self {
        Self::ConcurrencyError {
            message: message.into(),
        }
    }

    /// 构造资源未找到错误
    pub fn not_found_error(resource_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFoundError {
            resource_type: resource_type.into(),
            message: message.into(),
        }
    }

    /// 构造唯一性冲突错误
    pub fn conflict_error(resource_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConflictError {
            resource_type: resource_type.into(),
            message: message.into(),
        }
    }

    /// 构造JSON错误
    pub fn json_error(message: impl Into<String>) -> Self {
        Self::JsonError {
            message: message.into(),
        }
    }

    /// 构造报告生成错误
    pub fn report_generation_error(message: impl Into<String>) -> Self {
        Self::ReportGenerationError {
            message: message.into(),
        }
    }

    /// 错误的短代码，用于日志检索和跨进程传递
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Generic { .. } => "GENERIC",
            Self::IoError { .. } => "IO_ERROR",
            Self::PersistenceError { .. } => "PERSISTENCE_ERROR",
            Self::ConfigurationError { .. } => "CONFIGURATION_ERROR",
            Self::ValidationError { .. } => "VALIDATION_ERROR",
            Self::ConcurrencyError { .. } => "CONCURRENCY_ERROR",
            Self::NotFoundError { .. } => "NOT_FOUND_ERROR",
            Self::ConflictError { .. } => "CONFLICT_ERROR",
            Self::JsonError { .. } => "JSON_ERROR",
            Self::ReportGenerationError { .. } => "REPORT_GENERATION_ERROR",
        }
    }

    /// 是否为调用方可修正的错误
    ///
    /// 验证失败、编号冲突、引用缺失都能通过修正请求解决；
    /// 其余错误对调用方不可恢复，应按故障处理
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::ValidationError { .. }
                | Self::ConflictError { .. }
                | Self::NotFoundError { .. }
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::io_error(err.to_string(), err.kind().to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::json_error(err.to_string())
    }
}

impl From<String> for AppError {
    fn from(message: String) -> Self {
        Self::Generic { message }
    }
}

impl From<&str> for AppError {
    fn from(message: &str) -> Self {
        Self::generic(message)
    }
}

/// 应用程序统一的Result别名
pub type AppResult<T> = Result<T, AppError>;
