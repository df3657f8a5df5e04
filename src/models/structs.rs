use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{CellType, TestStatus};
use crate::utils::error::{AppError, AppResult};

/// 生成默认UUID字符串的辅助函数
pub fn default_id() -> String {
    Uuid::new_v4().to_string()
}

/// 电池测试结构体
/// 一次完整测试活动的聚合根，按工号全局唯一
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Test {
    /// 唯一标识符
    #[serde(default = "default_id")]
    pub id: String,
    /// 工号（全局唯一）
    pub job_number: String,
    /// 客户名称
    pub customer_name: String,
    /// 循环次数（1-5）
    pub number_of_cycles: i32,
    /// 读数时间间隔（小时，1-2）
    pub time_interval: i32,
    /// 计划开始日期
    pub start_date: NaiveDate,
    /// 计划开始时间
    pub start_time: NaiveTime,
    /// 测试状态
    pub status: TestStatus,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 所属电池组集合（按组号有序）
    #[serde(default)]
    pub banks: Vec<Bank>,
}

impl Test {
    /// 根据创建请求构造新的测试
    pub fn new(request: &TestCreate) -> Self {
        Self {
            id: default_id(),
            job_number: request.job_number.clone(),
            customer_name: request.customer_name.clone(),
            number_of_cycles: request.number_of_cycles,
            time_interval: request.time_interval,
            start_date: request.start_date,
            start_time: request.start_time,
            status: TestStatus::default(),
            created_at: Utc::now(),
            banks: Vec::new(),
        }
    }
}

/// 电池组结构体
/// 一次测试下的一个被测电池组，组号在测试内唯一
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bank {
    /// 唯一标识符
    #[serde(default = "default_id")]
    pub id: String,
    /// 所属测试ID
    pub test_id: String,
    /// 组号（1-2，测试内唯一）
    pub bank_number: i32,
    /// 电池类型
    pub cell_type: CellType,
    /// 电池额定容量（Ah）
    pub cell_rate: f64,
    /// 放电容量百分比（0-100]
    pub percentage_capacity: f64,
    /// 单体电池数量（10-200）
    pub number_of_cells: i32,
    /// 放电电流（派生字段，创建时计算，只读）
    pub discharge_current: f64,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 所属循环集合（按循环号有序）
    #[serde(default)]
    pub cycles: Vec<Cycle>,
}

impl Bank {
    /// 根据创建请求构造新的电池组，放电电流由调用方计算后传入
    pub fn new(request: &BankCreate, discharge_current: f64) -> Self {
        Self {
            id: default_id(),
            test_id: request.test_id.clone(),
            bank_number: request.bank_number,
            cell_type: request.cell_type,
            cell_rate: request.cell_rate,
            percentage_capacity: request.percentage_capacity,
            number_of_cells: request.number_of_cells,
            discharge_current,
            created_at: Utc::now(),
            cycles: Vec::new(),
        }
    }
}

/// 充放电循环结构体
/// 电池组下的一轮充电或放电过程
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cycle {
    /// 唯一标识符
    #[serde(default = "default_id")]
    pub id: String,
    /// 所属电池组ID
    pub bank_id: String,
    /// 循环号（从1开始）
    pub cycle_number: i32,
    /// 读数类型描述（例如："discharge"）
    pub reading_type: String,
    /// 循环开始时间
    pub start_time: DateTime<Utc>,
    /// 循环结束时间（结束前为空）
    pub end_time: Option<DateTime<Utc>>,
    /// 循环时长（分钟，记录结束时间时计算）
    pub duration_minutes: Option<i64>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 所属读数集合（按读数号有序）
    #[serde(default)]
    pub readings: Vec<Reading>,
}

impl Cycle {
    /// 根据创建请求构造新的循环，开始时间取当前时刻
    pub fn new(request: &CycleCreate) -> Self {
        let now = Utc::now();
        Self {
            id: default_id(),
            bank_id: request.bank_id.clone(),
            cycle_number: request.cycle_number,
            reading_type: request.reading_type.clone(),
            start_time: now,
            end_time: None,
            duration_minutes: None,
            created_at: now,
            readings: Vec::new(),
        }
    }

    /// 记录循环结束时间并计算时长（分钟）
    pub fn finish(&mut self) {
        let end = Utc::now();
        self.duration_minutes = Some((end - self.start_time).num_minutes());
        self.end_time = Some(end);
    }
}

/// 读数结构体
/// 某个循环内一次完整的电压采集，覆盖电池组的全部单体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// 唯一标识符
    #[serde(default = "default_id")]
    pub id: String,
    /// 所属循环ID
    pub cycle_id: String,
    /// 读数号（循环内有序，从1开始）
    pub reading_number: i32,
    /// 是否为开路电压读数（false表示闭路电压）
    pub is_ocv: bool,
    /// 采集时间
    pub timestamp: DateTime<Utc>,
    /// 单体电压集合（按单体编号有序）
    #[serde(default)]
    pub cell_values: Vec<CellValue>,
}

impl Reading {
    /// 根据创建请求构造新的读数
    /// 单体编号由电压列表位置派生（从1开始连续编号），不接受调用方指定
    pub fn new(request: &ReadingCreate) -> Self {
        let reading_id = default_id();
        let cell_values = request
            .cell_values
            .iter()
            .enumerate()
            .map(|(index, value)| CellValue {
                id: default_id(),
                reading_id: reading_id.clone(),
                cell_number: index as i32 + 1,
                value: *value,
            })
            .collect();
        Self {
            id: reading_id,
            cycle_id: request.cycle_id.clone(),
            reading_number: request.reading_number,
            is_ocv: request.is_ocv,
            timestamp: Utc::now(),
            cell_values,
        }
    }
}

/// 单体电压结构体
/// 一次读数中某个单体电池的电压值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellValue {
    /// 唯一标识符
    #[serde(default = "default_id")]
    pub id: String,
    /// 所属读数ID
    pub reading_id: String,
    /// 单体编号（1到电池组单体数量）
    pub cell_number: i32,
    /// 电压值（V）
    pub value: f64,
}

// ==================== 创建请求对象 ====================
//
// 请求对象在提交时一次性构造，替代原来跨页面累积的可变表单状态。
// validate()只做结构性校验（范围、必填、非空），跨记录检查由服务层完成。

/// 测试创建请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCreate {
    /// 工号
    pub job_number: String,
    /// 客户名称
    pub customer_name: String,
    /// 循环次数
    pub number_of_cycles: i32,
    /// 读数时间间隔（小时）
    pub time_interval: i32,
    /// 计划开始日期
    pub start_date: NaiveDate,
    /// 计划开始时间
    pub start_time: NaiveTime,
}

impl TestCreate {
    /// 结构性校验
    pub fn validate(&self) -> AppResult<()> {
        if self.job_number.trim().is_empty() {
            return Err(AppError::validation_error("job_number", "不能为空"));
        }
        if self.customer_name.trim().is_empty() {
            return Err(AppError::validation_error("customer_name", "不能为空"));
        }
        if !(1..=5).contains(&self.number_of_cycles) {
            return Err(AppError::validation_error(
                "number_of_cycles",
                format!("必须在 [1, 5] 范围内, 当前值: {}", self.number_of_cycles),
            ));
        }
        if !(1..=2).contains(&self.time_interval) {
            return Err(AppError::validation_error(
                "time_interval",
                format!("必须在 [1, 2] 范围内（小时）, 当前值: {}", self.time_interval),
            ));
        }
        Ok(())
    }
}

/// 电池组创建请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankCreate {
    /// 所属测试ID
    pub test_id: String,
    /// 组号
    pub bank_number: i32,
    /// 电池类型
    pub cell_type: CellType,
    /// 电池额定容量（Ah）
    pub cell_rate: f64,
    /// 放电容量百分比
    pub percentage_capacity: f64,
    /// 单体电池数量
    pub number_of_cells: i32,
}

impl BankCreate {
    /// 结构性校验
    /// 放电电流是派生字段，不在请求中出现，也不接受外部传入
    pub fn validate(&self) -> AppResult<()> {
        if self.test_id.trim().is_empty() {
            return Err(AppError::validation_error("test_id", "不能为空"));
        }
        if !(1..=2).contains(&self.bank_number) {
            return Err(AppError::validation_error(
                "bank_number",
                format!("必须在 [1, 2] 范围内, 当前值: {}", self.bank_number),
            ));
        }
        if self.cell_rate <= 0.0 {
            return Err(AppError::validation_error(
                "cell_rate",
                format!("必须大于 0, 当前值: {}", self.cell_rate),
            ));
        }
        if self.percentage_capacity <= 0.0 || self.percentage_capacity > 100.0 {
            return Err(AppError::validation_error(
                "percentage_capacity",
                format!("必须在 (0, 100] 范围内, 当前值: {}", self.percentage_capacity),
            ));
        }
        if !(10..=200).contains(&self.number_of_cells) {
            return Err(AppError::validation_error(
                "number_of_cells",
                format!("必须在 [10, 200] 范围内, 当前值: {}", self.number_of_cells),
            ));
        }
        Ok(())
    }
}

/// 循环创建请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleCreate {
    /// 所属电池组ID
    pub bank_id: String,
    /// 循环号
    pub cycle_number: i32,
    /// 读数类型描述
    pub reading_type: String,
}

impl CycleCreate {
    /// 结构性校验
    pub fn validate(&self) -> AppResult<()> {
        if self.bank_id.trim().is_empty() {
            return Err(AppError::validation_error("bank_id", "不能为空"));
        }
        if self.cycle_number < 1 {
            return Err(AppError::validation_error(
                "cycle_number",
                format!("必须大于等于 1, 当前值: {}", self.cycle_number),
            ));
        }
        if self.reading_type.trim().is_empty() {
            return Err(AppError::validation_error("reading_type", "不能为空"));
        }
        Ok(())
    }
}

/// 读数创建请求
/// cell_values按单体顺序排列，编号由位置派生
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingCreate {
    /// 所属循环ID
    pub cycle_id: String,
    /// 读数号
    pub reading_number: i32,
    /// 是否为开路电压读数
    pub is_ocv: bool,
    /// 单体电压列表（长度必须等于电池组单体数量，由服务层校验）
    pub cell_values: Vec<f64>,
}

impl ReadingCreate {
    /// 结构性校验
    pub fn validate(&self) -> AppResult<()> {
        if self.cycle_id.trim().is_empty() {
            return Err(AppError::validation_error("cycle_id", "不能为空"));
        }
        if self.reading_number < 1 {
            return Err(AppError::validation_error(
                "reading_number",
                format!("必须大于等于 1, 当前值: {}", self.reading_number),
            ));
        }
        if self.cell_values.is_empty() {
            return Err(AppError::validation_error("cell_values", "不能为空"));
        }
        Ok(())
    }
}
