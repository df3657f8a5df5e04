/// 错误处理模块
///
/// 重新导出utils::error中的所有错误类型，
/// 其他模块可以通过 use crate::error::{AppError, AppResult} 使用统一错误类型
pub use crate::utils::error::*;
