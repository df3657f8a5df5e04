//! # 数据库迁移模块
//!
//! 负责电池测试数据库的结构迁移，在表结构创建之后补充实体定义
//! 无法表达的约束，目前是两个组合唯一索引：
//! - banks(test_id, bank_number)：同一测试下组号唯一
//! - readings(cycle_id, reading_number)：同一循环下读数号唯一
//!
//! 读数号的唯一索引是并发写入竞争的最终防线：两个请求同时提交
//! 相同读数号时，预检查都能通过，最终由索引拒绝后提交的那个。
//!
//! 所有迁移操作都是幂等的，系统每次启动时安全地重复执行。

use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};

use crate::error::AppError;

/// 数据库迁移管理器
///
/// 纯工具类，没有实例字段，所有方法都是关联函数
///
/// 调用链：
/// SqliteOrmPersistenceService::new() -> DatabaseMigration::migrate()
pub struct DatabaseMigration;

impl DatabaseMigration {
    /// 执行所有必要的数据库迁移
    pub async fn migrate(db: &DatabaseConnection) -> Result<(), AppError> {
        log::info!("开始执行数据库迁移...");

        Self::create_unique_indexes(db).await?;
        Self::verify_data_integrity(db).await?;

        log::info!("数据库迁移完成");
        Ok(())
    }

    /// 创建组合唯一索引（如果不存在）
    async fn create_unique_indexes(db: &DatabaseConnection) -> Result<(), AppError> {
        let indexes = vec![
            (
                "uq_banks_test_bank_number",
                "CREATE UNIQUE INDEX IF NOT EXISTS uq_banks_test_bank_number ON banks (test_id, bank_number)",
            ),
            (
                "uq_readings_cycle_reading_number",
                "CREATE UNIQUE INDEX IF NOT EXISTS uq_readings_cycle_reading_number ON readings (cycle_id, reading_number)",
            ),
        ];

        for (index_name, sql) in indexes {
            if !Self::check_index_exists(db, index_name).await? {
                log::info!("创建唯一索引 {}", index_name);
            }
            db.execute(Statement::from_string(
                sea_orm::DatabaseBackend::Sqlite,
                sql.to_string(),
            ))
            .await
            .map_err(|e| AppError::persistence_error(format!("创建索引{}失败: {}", index_name, e)))?;
        }

        Ok(())
    }

    /// 检查表是否存在
    ///
    /// 通过查询SQLite的元数据表sqlite_master来判断
    async fn check_table_exists(db: &DatabaseConnection, table_name: &str) -> Result<bool, AppError> {
        let sql = "SELECT name FROM sqlite_master WHERE type='table' AND name=?";
        let result = db
            .query_all(Statement::from_sql_and_values(
                sea_orm::DatabaseBackend::Sqlite,
                sql,
                vec![table_name.into()],
            ))
            .await
            .map_err(|e| AppError::persistence_error(format!("检查表是否存在失败: {}", e)))?;

        Ok(!result.is_empty())
    }

    /// 检查索引是否存在
    async fn check_index_exists(db: &DatabaseConnection, index_name: &str) -> Result<bool, AppError> {
        let sql = "SELECT name FROM sqlite_master WHERE type='index' AND name=?";
        let result = db
            .query_all(Statement::from_sql_and_values(
                sea_orm::DatabaseBackend::Sqlite,
                sql,
                vec![index_name.into()],
            ))
            .await
            .map_err(|e| AppError::persistence_error(format!("检查索引是否存在失败: {}", e)))?;

        Ok(!result.is_empty())
    }

    /// 数据完整性检查
    ///
    /// 确认全部业务表已经就位，缺表时及早失败，
    /// 避免后续操作报出晦涩的SQL错误
    pub async fn verify_data_integrity(db: &DatabaseConnection) -> Result<(), AppError> {
        log::info!("执行数据完整性检查...");

        let required_tables = vec!["tests", "banks", "cycles", "readings", "cell_values"];
        for table_name in required_tables {
            if !Self::check_table_exists(db, table_name).await? {
                return Err(AppError::persistence_error(format!(
                    "数据完整性检查失败: 缺少关键表 {}",
                    table_name
                )));
            }
        }

        log::info!("数据完整性检查通过");
        Ok(())
    }
}
