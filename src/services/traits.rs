/// 服务层基础trait定义
/// 提供各层服务的接口规范，支持依赖注入和测试

use async_trait::async_trait;
use crate::models::enums::TestStatus;
use crate::models::structs::*;
use crate::utils::error::AppResult;

/// 基础服务trait，所有服务都应实现
#[async_trait]
pub trait BaseService: Send + Sync {
    /// 服务名称
    fn service_name(&self) -> &'static str;

    /// 初始化服务
    async fn initialize(&mut self) -> AppResult<()>;

    /// 关闭服务
    async fn shutdown(&mut self) -> AppResult<()>;

    /// 健康检查
    async fn health_check(&self) -> AppResult<()>;
}

/// 数据持久化服务trait
///
/// 以聚合为单位操作测试数据，每个方法是一个完整的事务边界：
/// 要么全部落库，要么完全回滚，调用方不会观察到部分写入。
///
/// 错误约定：
/// - 查询未命中 -> Ok(None) 或空集合，不作为错误
/// - 创建时父记录不存在 -> NotFoundError
/// - 创建时编号冲突 -> ConflictError
/// - 底层存储故障 -> PersistenceError，原样上抛，不重试
#[async_trait]
pub trait IPersistenceService: BaseService {
    /// 创建测试，工号重复返回ConflictError
    async fn create_test(&self, request: &TestCreate) -> AppResult<Test>;

    /// 按工号查询测试（浅查询，不装配子集合）
    async fn find_test_by_job_number(&self, job_number: &str) -> AppResult<Option<Test>>;

    /// 按ID加载测试，装配完整层级：电池组 -> 循环 -> 读数 -> 单体电压
    async fn get_test(&self, test_id: &str) -> AppResult<Option<Test>>;

    /// 分页列出测试（浅查询），按创建时间稳定排序
    async fn list_tests(&self, skip: u64, limit: u64) -> AppResult<Vec<Test>>;

    /// 更新测试状态，ID不存在时返回Ok(None)且不产生任何写入
    async fn update_test_status(&self, test_id: &str, status: TestStatus) -> AppResult<Option<Test>>;

    /// 创建电池组，放电电流由调用方计算后传入
    async fn create_bank(&self, request: &BankCreate, discharge_current: f64) -> AppResult<Bank>;

    /// 按ID加载电池组及其完整子层级
    async fn get_bank(&self, bank_id: &str) -> AppResult<Option<Bank>>;

    /// 创建循环，开始时间取当前时刻
    async fn create_cycle(&self, request: &CycleCreate) -> AppResult<Cycle>;

    /// 记录循环结束时间并计算时长，ID不存在时返回Ok(None)
    async fn complete_cycle(&self, cycle_id: &str) -> AppResult<Option<Cycle>>;

    /// 按ID加载循环及其读数、单体电压
    async fn get_cycle(&self, cycle_id: &str) -> AppResult<Option<Cycle>>;

    /// 创建读数：读数行与全部单体电压行在同一事务内写入，
    /// 单体编号按电压列表位置从1开始派生
    async fn create_reading(&self, request: &ReadingCreate) -> AppResult<Reading>;

    /// 加载循环下的全部读数（含单体电压），按读数号排序
    async fn get_readings_by_cycle(&self, cycle_id: &str) -> AppResult<Vec<Reading>>;
}
