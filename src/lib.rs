//! 电池测试数据记录系统 - Rust核心库

pub mod database_migration;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod utils;

// 重新导出常用类型，方便使用
pub use database_migration::DatabaseMigration;
pub use logging::init_logging;
pub use models::*;
pub use services::*;
pub use utils::{AppConfig, AppError, AppResult};
