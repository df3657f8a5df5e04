// 使用SeaORM和SQLite实现电池测试数据的聚合持久化服务

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Schema, SqlErr, TransactionTrait,
};
use sea_orm::ActiveValue::Set;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::database_migration::DatabaseMigration;
use crate::models::entities;
use crate::models::enums::TestStatus;
use crate::models::structs::*;
use crate::services::traits::{BaseService, IPersistenceService};
use crate::utils::error::{AppError, AppResult};

// 默认的SQLite数据库文件名
const DEFAULT_DB_FILE: &str = "battery_test_data.sqlite";
// 数据库URL前缀，mode=rwc保证文件不存在时自动创建
const SQLITE_URL_PREFIX: &str = "sqlite://";
const SQLITE_URL_OPTIONS: &str = "?mode=rwc";

/// 基于SeaORM和SQLite的持久化服务实现
///
/// 每个公开操作都是一个事务边界：内部先做预检查（父记录存在性、编号唯一性），
/// 再执行写入，最后提交。任何一步失败都会让事务整体回滚。
/// 唯一索引（见DatabaseMigration）作为并发竞争下的最终防线。
pub struct SqliteOrmPersistenceService {
    db_conn: Arc<DatabaseConnection>, // 使用Arc以便在多处共享连接
    db_file_path: Option<PathBuf>,    // 数据库文件路径，内存库为None
}

impl SqliteOrmPersistenceService {
    /// 创建新的 SqliteOrmPersistenceService 实例
    ///
    /// # Arguments
    ///
    /// * `db_path_opt` - SQLite数据库文件的可选路径。如果为None，则使用默认路径。
    pub async fn new(db_path_opt: Option<&Path>) -> AppResult<Self> {
        let determined_db_file_path = db_path_opt
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| {
                std::env::current_dir()
                    .unwrap_or_default()
                    .join(DEFAULT_DB_FILE)
            });

        // 确保数据库文件的父目录存在
        if let Some(parent_dir) = determined_db_file_path.parent() {
            if !parent_dir.exists() {
                tokio::fs::create_dir_all(parent_dir).await.map_err(|e| {
                    AppError::io_error(
                        format!("创建数据库目录失败: {:?}", parent_dir),
                        e.kind().to_string(),
                    )
                })?;
            }
        }

        let db_url = format!(
            "{}{}{}",
            SQLITE_URL_PREFIX,
            determined_db_file_path.to_string_lossy(),
            SQLITE_URL_OPTIONS
        );

        let conn = Database::connect(&db_url)
            .await
            .map_err(|db_err| AppError::persistence_error(db_err.to_string()))?;

        Self::setup_schema(&conn).await?;
        DatabaseMigration::migrate(&conn).await?;

        Ok(Self {
            db_conn: Arc::new(conn),
            db_file_path: Some(determined_db_file_path),
        })
    }

    /// 创建基于内存数据库的实例，用于测试和演示
    pub async fn new_in_memory() -> AppResult<Self> {
        let conn = Database::connect("sqlite::memory:")
            .await
            .map_err(|db_err| AppError::persistence_error(db_err.to_string()))?;

        Self::setup_schema(&conn).await?;
        DatabaseMigration::migrate(&conn).await?;

        Ok(Self {
            db_conn: Arc::new(conn),
            db_file_path: None,
        })
    }

    /// 获取数据库连接（供启动工具和集成测试使用）
    pub fn database_connection(&self) -> Arc<DatabaseConnection> {
        self.db_conn.clone()
    }

    /// 数据库文件路径，内存库返回None
    pub fn db_file_path(&self) -> Option<&Path> {
        self.db_file_path.as_deref()
    }

    /// 初始化数据库表结构
    /// 按层级顺序创建所有必要的表（如果它们不存在）
    async fn setup_schema(db: &DatabaseConnection) -> AppResult<()> {
        let backend = db.get_database_backend();
        let schema = Schema::new(backend);

        let stmt_tests = schema.create_table_from_entity(entities::test::Entity).if_not_exists().to_owned();
        db.execute(backend.build(&stmt_tests))
            .await.map_err(|e| AppError::persistence_error(format!("创建 tests 表失败: {}", e)))?;

        let stmt_banks = schema.create_table_from_entity(entities::bank::Entity).if_not_exists().to_owned();
        db.execute(backend.build(&stmt_banks))
            .await.map_err(|e| AppError::persistence_error(format!("创建 banks 表失败: {}", e)))?;

        let stmt_cycles = schema.create_table_from_entity(entities::cycle::Entity).if_not_exists().to_owned();
        db.execute(backend.build(&stmt_cycles))
            .await.map_err(|e| AppError::persistence_error(format!("创建 cycles 表失败: {}", e)))?;

        let stmt_readings = schema.create_table_from_entity(entities::reading::Entity).if_not_exists().to_owned();
        db.execute(backend.build(&stmt_readings))
            .await.map_err(|e| AppError::persistence_error(format!("创建 readings 表失败: {}", e)))?;

        let stmt_cell_values = schema.create_table_from_entity(entities::cell_value::Entity).if_not_exists().to_owned();
        db.execute(backend.build(&stmt_cell_values))
            .await.map_err(|e| AppError::persistence_error(format!("创建 cell_values 表失败: {}", e)))?;

        log::info!("数据库表结构设置完成或已存在。");
        Ok(())
    }

    /// 将插入失败映射为冲突错误或持久化错误
    /// 唯一索引触发的失败说明并发写入撞上了同一编号
    fn map_insert_err(e: DbErr, resource_type: &'static str, detail: String) -> AppError {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::conflict_error(resource_type, detail)
            }
            _ => AppError::persistence_error(format!("插入{}失败: {}", resource_type, e)),
        }
    }

    /// 开启事务
    async fn begin_txn(&self) -> AppResult<sea_orm::DatabaseTransaction> {
        self.db_conn
            .begin()
            .await
            .map_err(|e| AppError::persistence_error(format!("开启事务失败: {}", e)))
    }

    /// 提交事务
    async fn commit_txn(txn: sea_orm::DatabaseTransaction) -> AppResult<()> {
        txn.commit()
            .await
            .map_err(|e| AppError::persistence_error(format!("提交事务失败: {}", e)))
    }

    // ==================== 层级装配辅助方法 ====================
    // 与创建路径共用事务连接，保证读取的是同一快照

    /// 装配测试下的全部电池组（含完整子层级），按组号排序
    async fn load_banks_for_test<C: ConnectionTrait>(db: &C, test_id: &str) -> AppResult<Vec<Bank>> {
        let bank_models = entities::bank::Entity::find()
            .filter(entities::bank::Column::TestId.eq(test_id))
            .order_by_asc(entities::bank::Column::BankNumber)
            .all(db)
            .await
            .map_err(|e| AppError::persistence_error(format!("加载电池组列表失败: {}", e)))?;

        let mut banks = Vec::with_capacity(bank_models.len());
        for model in &bank_models {
            let mut bank: Bank = model.into();
            bank.cycles = Self::load_cycles_for_bank(db, &model.id).await?;
            banks.push(bank);
        }
        Ok(banks)
    }

    /// 装配电池组下的全部循环（含读数），按循环号排序
    async fn load_cycles_for_bank<C: ConnectionTrait>(db: &C, bank_id: &str) -> AppResult<Vec<Cycle>> {
        let cycle_models = entities::cycle::Entity::find()
            .filter(entities::cycle::Column::BankId.eq(bank_id))
            .order_by_asc(entities::cycle::Column::CycleNumber)
            .order_by_asc(entities::cycle::Column::CreatedAt)
            .all(db)
            .await
            .map_err(|e| AppError::persistence_error(format!("加载循环列表失败: {}", e)))?;

        let mut cycles = Vec::with_capacity(cycle_models.len());
        for model in &cycle_models {
            let mut cycle: Cycle = model.into();
            cycle.readings = Self::load_readings_for_cycle(db, &model.id).await?;
            cycles.push(cycle);
        }
        Ok(cycles)
    }

    /// 装配循环下的全部读数（含单体电压），按读数号排序，采集时间作为次序兜底
    async fn load_readings_for_cycle<C: ConnectionTrait>(db: &C, cycle_id: &str) -> AppResult<Vec<Reading>> {
        let reading_models = entities::reading::Entity::find()
            .filter(entities::reading::Column::CycleId.eq(cycle_id))
            .order_by_asc(entities::reading::Column::ReadingNumber)
            .order_by_asc(entities::reading::Column::Timestamp)
            .all(db)
            .await
            .map_err(|e| AppError::persistence_error(format!("加载读数列表失败: {}", e)))?;

        let mut readings = Vec::with_capacity(reading_models.len());
        for model in &reading_models {
            let mut reading: Reading = model.into();
            reading.cell_values = Self::load_cell_values_for_reading(db, &model.id).await?;
            readings.push(reading);
        }
        Ok(readings)
    }

    /// 装配读数下的全部单体电压，按单体编号排序
    async fn load_cell_values_for_reading<C: ConnectionTrait>(db: &C, reading_id: &str) -> AppResult<Vec<CellValue>> {
        let value_models = entities::cell_value::Entity::find()
            .filter(entities::cell_value::Column::ReadingId.eq(reading_id))
            .order_by_asc(entities::cell_value::Column::CellNumber)
            .all(db)
            .await
            .map_err(|e| AppError::persistence_error(format!("加载单体电压列表失败: {}", e)))?;
        Ok(value_models.iter().map(|m| m.into()).collect())
    }
}

#[async_trait]
impl BaseService for SqliteOrmPersistenceService {
    fn service_name(&self) -> &'static str {
        "SqliteOrmPersistenceService"
    }

    async fn initialize(&mut self) -> AppResult<()> {
        // 表结构和迁移在 new 中已经完成
        log::info!("{} 已初始化。", self.service_name());
        Ok(())
    }

    async fn shutdown(&mut self) -> AppResult<()> {
        // SeaORM 的 DatabaseConnection 在 Drop 时会自动关闭
        log::info!("{} 已关闭。", self.service_name());
        Ok(())
    }

    async fn health_check(&self) -> AppResult<()> {
        self.db_conn.ping().await.map_err(|db_err| {
            AppError::persistence_error(format!("数据库健康检查失败: {}", db_err))
        })?;
        log::debug!("数据库连接健康。");
        Ok(())
    }
}

#[async_trait]
impl IPersistenceService for SqliteOrmPersistenceService {
    // --- Test ---
    async fn create_test(&self, request: &TestCreate) -> AppResult<Test> {
        let txn = self.begin_txn().await?;

        // 工号冲突预检查
        let existing = entities::test::Entity::find()
            .filter(entities::test::Column::JobNumber.eq(&request.job_number))
            .one(&txn)
            .await
            .map_err(|e| AppError::persistence_error(format!("查询工号失败: {}", e)))?;
        if existing.is_some() {
            return Err(AppError::conflict_error(
                "Test",
                format!("工号 {} 已存在", request.job_number),
            ));
        }

        let test = Test::new(request);
        let active_model: entities::test::ActiveModel = (&test).into();
        entities::test::Entity::insert(active_model)
            .exec(&txn)
            .await
            .map_err(|e| Self::map_insert_err(e, "Test", format!("工号 {} 已存在", request.job_number)))?;

        Self::commit_txn(txn).await?;
        log::info!("测试已创建: id={}, job_number={}", test.id, test.job_number);
        Ok(test)
    }

    async fn find_test_by_job_number(&self, job_number: &str) -> AppResult<Option<Test>> {
        let model = entities::test::Entity::find()
            .filter(entities::test::Column::JobNumber.eq(job_number))
            .one(self.db_conn.as_ref())
            .await
            .map_err(|e| AppError::persistence_error(format!("按工号查询测试失败: {}", e)))?;
        Ok(model.map(|m| (&m).into()))
    }

    async fn get_test(&self, test_id: &str) -> AppResult<Option<Test>> {
        let txn = self.begin_txn().await?;

        let model = entities::test::Entity::find_by_id(test_id.to_string())
            .one(&txn)
            .await
            .map_err(|e| AppError::persistence_error(format!("加载测试失败: {}", e)))?;

        let test = match &model {
            Some(m) => {
                let mut test: Test = m.into();
                test.banks = Self::load_banks_for_test(&txn, &m.id).await?;
                Some(test)
            }
            None => None,
        };

        Self::commit_txn(txn).await?;
        Ok(test)
    }

    async fn list_tests(&self, skip: u64, limit: u64) -> AppResult<Vec<Test>> {
        let models = entities::test::Entity::find()
            .order_by_asc(entities::test::Column::CreatedAt)
            .order_by_asc(entities::test::Column::Id)
            .offset(skip)
            .limit(limit)
            .all(self.db_conn.as_ref())
            .await
            .map_err(|e| AppError::persistence_error(format!("分页查询测试失败: {}", e)))?;
        Ok(models.iter().map(|m| m.into()).collect())
    }

    async fn update_test_status(&self, test_id: &str, status: TestStatus) -> AppResult<Option<Test>> {
        let txn = self.begin_txn().await?;

        let model = entities::test::Entity::find_by_id(test_id.to_string())
            .one(&txn)
            .await
            .map_err(|e| AppError::persistence_error(format!("加载测试失败: {}", e)))?;

        // ID不存在时按约定返回None，不产生任何写入
        let model = match model {
            Some(m) => m,
            None => return Ok(None),
        };

        let mut active_model: entities::test::ActiveModel = model.into();
        active_model.status = Set(status.to_string());
        let updated = active_model
            .update(&txn)
            .await
            .map_err(|e| AppError::persistence_error(format!("更新测试状态失败: {}", e)))?;

        Self::commit_txn(txn).await?;
        log::info!("测试状态已更新: id={}, status={}", test_id, status);
        Ok(Some((&updated).into()))
    }

    // --- Bank ---
    async fn create_bank(&self, request: &BankCreate, discharge_current: f64) -> AppResult<Bank> {
        let txn = self.begin_txn().await?;

        // 父测试必须存在
        let parent = entities::test::Entity::find_by_id(request.test_id.clone())
            .one(&txn)
            .await
            .map_err(|e| AppError::persistence_error(format!("查询所属测试失败: {}", e)))?;
        if parent.is_none() {
            return Err(AppError::not_found_error(
                "Test",
                format!("未找到ID为 {} 的测试", request.test_id),
            ));
        }

        // 组号冲突预检查
        let duplicate = entities::bank::Entity::find()
            .filter(entities::bank::Column::TestId.eq(&request.test_id))
            .filter(entities::bank::Column::BankNumber.eq(request.bank_number))
            .one(&txn)
            .await
            .map_err(|e| AppError::persistence_error(format!("查询组号失败: {}", e)))?;
        if duplicate.is_some() {
            return Err(AppError::conflict_error(
                "Bank",
                format!("测试 {} 下组号 {} 已存在", request.test_id, request.bank_number),
            ));
        }

        let bank = Bank::new(request, discharge_current);
        let active_model: entities::bank::ActiveModel = (&bank).into();
        entities::bank::Entity::insert(active_model)
            .exec(&txn)
            .await
            .map_err(|e| {
                Self::map_insert_err(
                    e,
                    "Bank",
                    format!("测试 {} 下组号 {} 已存在", request.test_id, request.bank_number),
                )
            })?;

        Self::commit_txn(txn).await?;
        log::info!(
            "电池组已创建: id={}, test_id={}, bank_number={}",
            bank.id, bank.test_id, bank.bank_number
        );
        Ok(bank)
    }

    async fn get_bank(&self, bank_id: &str) -> AppResult<Option<Bank>> {
        let txn = self.begin_txn().await?;

        let model = entities::bank::Entity::find_by_id(bank_id.to_string())
            .one(&txn)
            .await
            .map_err(|e| AppError::persistence_error(format!("加载电池组失败: {}", e)))?;

        let bank = match &model {
            Some(m) => {
                let mut bank: Bank = m.into();
                bank.cycles = Self::load_cycles_for_bank(&txn, &m.id).await?;
                Some(bank)
            }
            None => None,
        };

        Self::commit_txn(txn).await?;
        Ok(bank)
    }

    // --- Cycle ---
    async fn create_cycle(&self, request: &CycleCreate) -> AppResult<Cycle> {
        let txn = self.begin_txn().await?;

        // 父电池组必须存在
        let parent = entities::bank::Entity::find_by_id(request.bank_id.clone())
            .one(&txn)
            .await
            .map_err(|e| AppError::persistence_error(format!("查询所属电池组失败: {}", e)))?;
        if parent.is_none() {
            return Err(AppError::not_found_error(
                "Bank",
                format!("未找到ID为 {} 的电池组", request.bank_id),
            ));
        }

        let cycle = Cycle::new(request);
        let active_model: entities::cycle::ActiveModel = (&cycle).into();
        entities::cycle::Entity::insert(active_model)
            .exec(&txn)
            .await
            .map_err(|e| AppError::persistence_error(format!("插入Cycle失败: {}", e)))?;

        Self::commit_txn(txn).await?;
        log::info!(
            "循环已创建: id={}, bank_id={}, cycle_number={}",
            cycle.id, cycle.bank_id, cycle.cycle_number
        );
        Ok(cycle)
    }

    async fn complete_cycle(&self, cycle_id: &str) -> AppResult<Option<Cycle>> {
        let txn = self.begin_txn().await?;

        let model = entities::cycle::Entity::find_by_id(cycle_id.to_string())
            .one(&txn)
            .await
            .map_err(|e| AppError::persistence_error(format!("加载循环失败: {}", e)))?;

        let model = match model {
            Some(m) => m,
            None => return Ok(None),
        };

        let mut cycle: Cycle = (&model).into();
        cycle.finish();

        let mut active_model: entities::cycle::ActiveModel = model.into();
        active_model.end_time = Set(cycle.end_time);
        active_model.duration_minutes = Set(cycle.duration_minutes);
        let updated = active_model
            .update(&txn)
            .await
            .map_err(|e| AppError::persistence_error(format!("更新循环结束时间失败: {}", e)))?;

        Self::commit_txn(txn).await?;
        log::info!(
            "循环已结束: id={}, duration_minutes={:?}",
            cycle_id, updated.duration_minutes
        );
        Ok(Some((&updated).into()))
    }

    async fn get_cycle(&self, cycle_id: &str) -> AppResult<Option<Cycle>> {
        let txn = self.begin_txn().await?;

        let model = entities::cycle::Entity::find_by_id(cycle_id.to_string())
            .one(&txn)
            .await
            .map_err(|e| AppError::persistence_error(format!("加载循环失败: {}", e)))?;

        let cycle = match &model {
            Some(m) => {
                let mut cycle: Cycle = m.into();
                cycle.readings = Self::load_readings_for_cycle(&txn, &m.id).await?;
                Some(cycle)
            }
            None => None,
        };

        Self::commit_txn(txn).await?;
        Ok(cycle)
    }

    // --- Reading ---
    async fn create_reading(&self, request: &ReadingCreate) -> AppResult<Reading> {
        let txn = self.begin_txn().await?;

        // 所属循环必须存在
        let cycle_model = entities::cycle::Entity::find_by_id(request.cycle_id.clone())
            .one(&txn)
            .await
            .map_err(|e| AppError::persistence_error(format!("查询所属循环失败: {}", e)))?;
        let cycle_model = match cycle_model {
            Some(m) => m,
            None => {
                return Err(AppError::not_found_error(
                    "Cycle",
                    format!("未找到ID为 {} 的循环", request.cycle_id),
                ));
            }
        };

        // 电压数量必须与电池组单体数量一致
        let bank_model = entities::bank::Entity::find_by_id(cycle_model.bank_id.clone())
            .one(&txn)
            .await
            .map_err(|e| AppError::persistence_error(format!("查询所属电池组失败: {}", e)))?
            .ok_or_else(|| {
                AppError::persistence_error(format!(
                    "数据不一致: 循环 {} 引用的电池组 {} 不存在",
                    cycle_model.id, cycle_model.bank_id
                ))
            })?;
        if request.cell_values.len() != bank_model.number_of_cells as usize {
            return Err(AppError::validation_error(
                "cell_values",
                format!(
                    "长度 {} 与电池组单体数量 {} 不一致",
                    request.cell_values.len(),
                    bank_model.number_of_cells
                ),
            ));
        }

        // 读数号冲突预检查
        let duplicate = entities::reading::Entity::find()
            .filter(entities::reading::Column::CycleId.eq(&request.cycle_id))
            .filter(entities::reading::Column::ReadingNumber.eq(request.reading_number))
            .one(&txn)
            .await
            .map_err(|e| AppError::persistence_error(format!("查询读数号失败: {}", e)))?;
        if duplicate.is_some() {
            return Err(AppError::conflict_error(
                "Reading",
                format!("循环 {} 下读数号 {} 已存在", request.cycle_id, request.reading_number),
            ));
        }

        // 两阶段写入：先读数行，再逐行写入单体电压，全部在同一事务内
        let reading = Reading::new(request);
        let reading_model: entities::reading::ActiveModel = (&reading).into();
        entities::reading::Entity::insert(reading_model)
            .exec(&txn)
            .await
            .map_err(|e| {
                Self::map_insert_err(
                    e,
                    "Reading",
                    format!("循环 {} 下读数号 {} 已存在", request.cycle_id, request.reading_number),
                )
            })?;

        for cell_value in &reading.cell_values {
            let value_model: entities::cell_value::ActiveModel = cell_value.into();
            entities::cell_value::Entity::insert(value_model)
                .exec(&txn)
                .await
                .map_err(|e| AppError::persistence_error(format!("插入单体电压失败: {}", e)))?;
        }

        Self::commit_txn(txn).await?;
        log::info!(
            "读数已创建: id={}, cycle_id={}, reading_number={}, cells={}",
            reading.id, reading.cycle_id, reading.reading_number, reading.cell_values.len()
        );
        Ok(reading)
    }

    async fn get_readings_by_cycle(&self, cycle_id: &str) -> AppResult<Vec<Reading>> {
        let txn = self.begin_txn().await?;
        let readings = Self::load_readings_for_cycle(&txn, cycle_id).await?;
        Self::commit_txn(txn).await?;
        Ok(readings)
    }
}
