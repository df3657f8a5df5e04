/// 持久化服务模块
/// 提供电池测试数据的SQLite存储

/// SQLite ORM 持久化实现
pub mod sqlite_orm_persistence_service;

/// 单元测试模块
#[cfg(test)]
pub mod tests;

// 重新导出主要接口和实现
pub use sqlite_orm_persistence_service::*;
