/// 创建电池测试数据库的启动工具
///
/// 用法:
///   create_db          创建数据库文件和表结构
///   create_db --demo   额外写入一套演示测试数据并导出CSV报告
use battery_test_lib::logging::init_logging;
use battery_test_lib::models::enums::{CellType, TestStatus};
use battery_test_lib::models::structs::{BankCreate, CycleCreate, ReadingCreate, TestCreate};
use battery_test_lib::services::application::{
    IReportGenerationService, ITestCampaignService, ReportGenerationService, TestCampaignService,
};
use battery_test_lib::services::domain::DefaultDischargeCurrentCalculator;
use battery_test_lib::services::infrastructure::persistence::SqliteOrmPersistenceService;
use battery_test_lib::utils::config::{get_global_config, init_global_config, AppConfig};
use chrono::{NaiveDate, NaiveTime};
use rand::Rng;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载配置并初始化日志
    init_global_config(None).await?;
    let config = get_global_config()?;
    init_logging(&config.logging_config);

    println!("正在创建SQLite数据库...");

    let db_path = config.persistence_config.database_path.clone();
    let persistence_service = Arc::new(SqliteOrmPersistenceService::new(db_path.as_deref()).await?);

    if let Some(path) = persistence_service.db_file_path() {
        println!("数据库文件位置: {:?}", path);
    }

    println!("数据库创建完成！");

    if std::env::args().any(|arg| arg == "--demo") {
        seed_demo_data(persistence_service, &config).await?;
    }

    Ok(())
}

/// 写入一套演示数据: 1个测试 -> 2个电池组 -> 每组1个放电循环 -> OCV + 3次CCV读数
async fn seed_demo_data(
    persistence_service: Arc<SqliteOrmPersistenceService>,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("正在写入演示数据...");

    let campaign_service = TestCampaignService::new(
        persistence_service.clone(),
        Arc::new(DefaultDischargeCurrentCalculator),
    );
    let report_service = ReportGenerationService::new(
        persistence_service,
        config.report_config.reports_dir.clone(),
    );

    let test = campaign_service
        .create_test(TestCreate {
            job_number: "DEMO-2024-001".to_string(),
            customer_name: "示例客户".to_string(),
            number_of_cycles: 1,
            time_interval: 1,
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1).ok_or("无效的演示日期")?,
            start_time: NaiveTime::from_hms_opt(8, 0, 0).ok_or("无效的演示时间")?,
        })
        .await?;
    println!("  测试: 工号={}", test.job_number);

    let number_of_cells = 10;
    let mut rng = rand::thread_rng();

    for bank_number in 1..=2 {
        let bank = campaign_service
            .create_bank(BankCreate {
                test_id: test.id.clone(),
                bank_number,
                cell_type: CellType::KPM,
                cell_rate: 100.0,
                percentage_capacity: 50.0,
                number_of_cells,
            })
            .await?;
        println!(
            "  电池组 {}: 单体数={}, 放电电流={}A",
            bank.bank_number, bank.number_of_cells, bank.discharge_current
        );

        let cycle = campaign_service
            .create_cycle(CycleCreate {
                bank_id: bank.id.clone(),
                cycle_number: 1,
                reading_type: "discharge".to_string(),
            })
            .await?;

        // 读数1为开路电压，其余为闭路电压
        for reading_number in 1..=4 {
            let is_ocv = reading_number == 1;
            let cell_values: Vec<f64> = (0..number_of_cells)
                .map(|_| {
                    let base = if is_ocv { 3.65 } else { 3.52 };
                    let volts: f64 = base + rng.gen_range(-0.03..0.03);
                    (volts * 1000.0).round() / 1000.0
                })
                .collect();

            campaign_service
                .create_reading(ReadingCreate {
                    cycle_id: cycle.id.clone(),
                    reading_number,
                    is_ocv,
                    cell_values,
                })
                .await?;
        }

        campaign_service.complete_cycle(&cycle.id).await?;
    }

    campaign_service
        .update_test_status(&test.id, TestStatus::Completed)
        .await?;

    // 导出第一个电池组的CSV报告
    let hydrated = campaign_service
        .get_test(&test.id)
        .await?
        .ok_or("演示测试写入后读取失败")?;
    if let Some(first_bank) = hydrated.banks.first() {
        let report_path = report_service
            .export_csv_report(&test.id, &first_bank.id)
            .await?;
        println!("  CSV报告: {:?}", report_path);
    }

    println!("演示数据写入完成！");
    Ok(())
}
