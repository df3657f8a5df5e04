/// 报告生成服务
///
/// 负责把测试/电池组/读数数据拍平成逐单体的CSV报告：
/// 1. 元数据头（工号、客户、电池组参数、放电电流）
/// 2. 表格区（Cell Number,OCV,CCV 1..n），按单体号逐行查值
///
/// 报告每次调用都重新生成，不做缓存；查值采用"首个匹配或留空"，
/// 缺值不报错。

use crate::models::structs::{Bank, Reading, Test};
use crate::services::traits::IPersistenceService;
use crate::utils::error::{AppError, AppResult};
use async_trait::async_trait;
use log::info;
use statrs::statistics::Statistics;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// 一组读数值的统计摘要
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingStatistics {
    /// 最小电压
    pub min: f64,
    /// 最大电压
    pub max: f64,
    /// 平均电压
    pub mean: f64,
    /// 总体标准差
    pub std_dev: f64,
}

/// 计算一组读数值的统计摘要，空列表返回None
pub fn reading_statistics(values: &[f64]) -> Option<ReadingStatistics> {
    if values.is_empty() {
        return None;
    }

    Some(ReadingStatistics {
        min: values.min(),
        max: values.max(),
        mean: values.mean(),
        std_dev: values.population_std_dev(),
    })
}

/// 报告生成服务接口
#[async_trait]
pub trait IReportGenerationService: Send + Sync {
    /// 生成CSV报告文本（纯函数，不访问存储）
    fn generate_csv_report(&self, test: &Test, bank: &Bank, readings: &[Reading]) -> String;

    /// 导出CSV报告文件，返回写入的文件路径
    async fn export_csv_report(&self, test_id: &str, bank_id: &str) -> AppResult<PathBuf>;
}

/// 报告生成服务实现
pub struct ReportGenerationService {
    /// 持久化服务
    persistence_service: Arc<dyn IPersistenceService>,
    /// 报告输出目录
    reports_dir: PathBuf,
}

impl ReportGenerationService {
    /// 创建新的报告生成服务
    pub fn new(persistence_service: Arc<dyn IPersistenceService>, reports_dir: PathBuf) -> Self {
        Self {
            persistence_service,
            reports_dir,
        }
    }

    /// 在读数中按单体号查值，首个匹配生效，缺失返回空串
    fn find_cell_value(reading: &Reading, cell_number: i32) -> String {
        reading
            .cell_values
            .iter()
            .find(|cv| cv.cell_number == cell_number)
            .map(|cv| cv.value.to_string())
            .unwrap_or_default()
    }
}

#[async_trait]
impl IReportGenerationService for ReportGenerationService {
    fn generate_csv_report(&self, test: &Test, bank: &Bank, readings: &[Reading]) -> String {
        // OCV列取首个OCV读数，CCV列按输入顺序逐个展开
        let ocv_reading = readings.iter().find(|r| r.is_ocv);
        let ccv_readings: Vec<&Reading> = readings.iter().filter(|r| !r.is_ocv).collect();

        let mut lines: Vec<String> = Vec::new();

        // 元数据头，每行一个键值对
        lines.push(format!("Job Number,{}", test.job_number));
        lines.push(format!("Customer Name,{}", test.customer_name));
        lines.push(format!("Bank Number,{}", bank.bank_number));
        lines.push(format!("Cell Type,{}", bank.cell_type));
        lines.push(format!("Cell Rate,{}", bank.cell_rate));
        lines.push(format!("Percentage Capacity,{}", bank.percentage_capacity));
        lines.push(format!("Discharge Current,{}", bank.discharge_current));
        lines.push(format!("Number of Cells,{}", bank.number_of_cells));
        lines.push(String::new());

        // 表头：Cell Number,OCV,CCV 1..n
        let mut header = String::from("Cell Number,OCV");
        for index in 0..ccv_readings.len() {
            header.push_str(&format!(",CCV {}", index + 1));
        }
        lines.push(header);

        // 逐单体一行
        for cell_number in 1..=bank.number_of_cells {
            let mut row = cell_number.to_string();
            row.push(',');
            if let Some(reading) = ocv_reading {
                row.push_str(&Self::find_cell_value(reading, cell_number));
            }
            for reading in &ccv_readings {
                row.push(',');
                row.push_str(&Self::find_cell_value(reading, cell_number));
            }
            lines.push(row);
        }

        let mut report = lines.join("\n");
        report.push('\n');
        report
    }

    async fn export_csv_report(&self, test_id: &str, bank_id: &str) -> AppResult<PathBuf> {
        let test = self
            .persistence_service
            .get_test(test_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found_error("Test", format!("测试 {} 不存在", test_id))
            })?;

        let bank = test.banks.iter().find(|b| b.id == bank_id).ok_or_else(|| {
            AppError::not_found_error(
                "Bank",
                format!("测试 {} 下不存在电池组 {}", test_id, bank_id),
            )
        })?;

        // 汇总该电池组全部循环的读数，循环和读数已按编号排序
        let readings: Vec<Reading> = bank
            .cycles
            .iter()
            .flat_map(|cycle| cycle.readings.iter().cloned())
            .collect();

        let report = self.generate_csv_report(&test, bank, &readings);

        // 确保报告目录存在
        if !self.reports_dir.exists() {
            fs::create_dir_all(&self.reports_dir).map_err(|e| {
                AppError::io_error(format!("创建报告目录失败: {}", e), e.kind().to_string())
            })?;
        }

        let filename = format!("{}_bank{}_report.csv", test.job_number, bank.bank_number);
        let output_path = self.reports_dir.join(&filename);
        fs::write(&output_path, report)
            .map_err(|e| AppError::report_generation_error(format!("写入报告文件失败: {}", e)))?;

        info!("CSV报告已导出: {:?}", output_path);
        Ok(output_path)
    }
}
