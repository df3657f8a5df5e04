/// 测试活动服务
///
/// 电池测试活动的统一业务入口，负责：
/// 1. 校验创建请求（范围、必填项）
/// 2. 计算电池组的派生放电电流
/// 3. 委托持久化服务完成事务性读写
///
/// 存在性与唯一性检查统一放在本服务及持久化契约内部，
/// 调用方不做前置检查，直接依据返回的错误类型处理。

use crate::models::enums::TestStatus;
use crate::models::structs::{
    Bank, BankCreate, Cycle, CycleCreate, Reading, ReadingCreate, Test, TestCreate,
};
use crate::services::domain::IDischargeCurrentCalculator;
use crate::services::traits::IPersistenceService;
use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use log::{debug, info};
use std::sync::Arc;

/// 测试活动服务接口
#[async_trait]
pub trait ITestCampaignService: Send + Sync {
    /// 创建测试（工号重复时返回冲突错误）
    async fn create_test(&self, request: TestCreate) -> AppResult<Test>;

    /// 分页列出测试（浅层，不含电池组）
    async fn list_tests(&self, skip: u64, limit: u64) -> AppResult<Vec<Test>>;

    /// 获取完整装配的测试（电池组 -> 循环 -> 读数 -> 单体电压）
    async fn get_test(&self, test_id: &str) -> AppResult<Option<Test>>;

    /// 更新测试状态（id不存在时返回None，不报错）
    async fn update_test_status(
        &self,
        test_id: &str,
        status: TestStatus,
    ) -> AppResult<Option<Test>>;

    /// 创建电池组并计算放电电流
    async fn create_bank(&self, request: BankCreate) -> AppResult<Bank>;

    /// 获取完整装配的电池组
    async fn get_bank(&self, bank_id: &str) -> AppResult<Option<Bank>>;

    /// 创建循环（开始时间为当前时刻）
    async fn create_cycle(&self, request: CycleCreate) -> AppResult<Cycle>;

    /// 结束循环，记录结束时间和时长
    async fn complete_cycle(&self, cycle_id: &str) -> AppResult<Option<Cycle>>;

    /// 获取完整装配的循环
    async fn get_cycle(&self, cycle_id: &str) -> AppResult<Option<Cycle>>;

    /// 记录一次读数（读数行 + 逐单体电压，单事务）
    async fn create_reading(&self, request: ReadingCreate) -> AppResult<Reading>;

    /// 按循环获取读数列表（含单体电压，按读数号升序）
    async fn get_readings_by_cycle(&self, cycle_id: &str) -> AppResult<Vec<Reading>>;
}

/// 测试活动服务实现
pub struct TestCampaignService {
    /// 持久化服务
    persistence_service: Arc<dyn IPersistenceService>,
    /// 放电电流计算器
    discharge_current_calculator: Arc<dyn IDischargeCurrentCalculator>,
}

impl TestCampaignService {
    /// 创建新的测试活动服务
    pub fn new(
        persistence_service: Arc<dyn IPersistenceService>,
        discharge_current_calculator: Arc<dyn IDischargeCurrentCalculator>,
    ) -> Self {
        Self {
            persistence_service,
            discharge_current_calculator,
        }
    }
}

#[async_trait]
impl ITestCampaignService for TestCampaignService {
    async fn create_test(&self, request: TestCreate) -> AppResult<Test> {
        request.validate()?;

        let test = self.persistence_service.create_test(&request).await?;
        info!("创建测试成功: 工号={}, id={}", test.job_number, test.id);
        Ok(test)
    }

    async fn list_tests(&self, skip: u64, limit: u64) -> AppResult<Vec<Test>> {
        if limit < 1 {
            return Err(AppError::validation_error(
                "limit",
                format!("必须至少为 1, 当前值: {}", limit),
            ));
        }

        let tests = self.persistence_service.list_tests(skip, limit).await?;
        debug!("分页查询测试: skip={}, limit={}, 返回{}条", skip, limit, tests.len());
        Ok(tests)
    }

    async fn get_test(&self, test_id: &str) -> AppResult<Option<Test>> {
        self.persistence_service.get_test(test_id).await
    }

    async fn update_test_status(
        &self,
        test_id: &str,
        status: TestStatus,
    ) -> AppResult<Option<Test>> {
        let updated = self
            .persistence_service
            .update_test_status(test_id, status)
            .await?;
        match &updated {
            Some(test) => info!("更新测试状态: id={}, 新状态={}", test.id, test.status),
            None => debug!("更新测试状态: id={} 不存在，未执行写入", test_id),
        }
        Ok(updated)
    }

    async fn create_bank(&self, request: BankCreate) -> AppResult<Bank> {
        request.validate()?;

        // 放电电流只在创建时计算一次，之后只读
        let discharge_current = self.discharge_current_calculator.calc_discharge_current(&request);
        let bank = self
            .persistence_service
            .create_bank(&request, discharge_current)
            .await?;
        info!(
            "创建电池组成功: 测试={}, 组号={}, 放电电流={}A",
            bank.test_id, bank.bank_number, bank.discharge_current
        );
        Ok(bank)
    }

    async fn get_bank(&self, bank_id: &str) -> AppResult<Option<Bank>> {
        self.persistence_service.get_bank(bank_id).await
    }

    async fn create_cycle(&self, request: CycleCreate) -> AppResult<Cycle> {
        request.validate()?;

        let cycle = self.persistence_service.create_cycle(&request).await?;
        info!(
            "创建循环成功: 电池组={}, 循环号={}, 读数类型={}",
            cycle.bank_id, cycle.cycle_number, cycle.reading_type
        );
        Ok(cycle)
    }

    async fn complete_cycle(&self, cycle_id: &str) -> AppResult<Option<Cycle>> {
        let completed = self.persistence_service.complete_cycle(cycle_id).await?;
        if let Some(cycle) = &completed {
            info!(
                "结束循环: id={}, 时长={}分钟",
                cycle.id,
                cycle.duration_minutes.unwrap_or(0)
            );
        }
        Ok(completed)
    }

    async fn get_cycle(&self, cycle_id: &str) -> AppResult<Option<Cycle>> {
        self.persistence_service.get_cycle(cycle_id).await
    }

    async fn create_reading(&self, request: ReadingCreate) -> AppResult<Reading> {
        request.validate()?;

        let reading = self.persistence_service.create_reading(&request).await?;
        info!(
            "记录读数成功: 循环={}, 读数号={}, 单体数={}",
            reading.cycle_id,
            reading.reading_number,
            reading.cell_values.len()
        );
        Ok(reading)
    }

    async fn get_readings_by_cycle(&self, cycle_id: &str) -> AppResult<Vec<Reading>> {
        self.persistence_service.get_readings_by_cycle(cycle_id).await
    }
}
