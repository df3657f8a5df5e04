use battery_test_lib::models::enums::{CellType, TestStatus};
use battery_test_lib::models::structs::{BankCreate, CycleCreate, ReadingCreate, TestCreate};
use battery_test_lib::services::application::{
    IReportGenerationService, ITestCampaignService, ReportGenerationService, TestCampaignService,
};
use battery_test_lib::services::domain::DefaultDischargeCurrentCalculator;
use battery_test_lib::services::infrastructure::persistence::SqliteOrmPersistenceService;
use battery_test_lib::services::traits::IPersistenceService;
use battery_test_lib::utils::error::AppError;
use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;
use tempfile::TempDir;
use tokio_test::assert_ok;

fn create_test_request(job_number: &str) -> TestCreate {
    TestCreate {
        job_number: job_number.to_string(),
        customer_name: "华东电力".to_string(),
        number_of_cycles: 2,
        time_interval: 1,
        start_date: NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date"),
        start_time: NaiveTime::from_hms_opt(8, 0, 0).expect("valid time"),
    }
}

/// 首个单体电压与其余不同，便于断言报告首尾两行
fn cell_values(first: f64, rest: f64) -> Vec<f64> {
    let mut values = vec![rest; 10];
    values[0] = first;
    values
}

#[tokio::test]
async fn test_full_campaign_to_csv_report() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let db_path = temp_dir.path().join("data").join("battery_test.sqlite");
    let reports_dir = temp_dir.path().join("reports");

    let persistence_service = Arc::new(
        SqliteOrmPersistenceService::new(Some(&db_path))
            .await
            .expect("create file-backed service"),
    );
    let campaign_service = TestCampaignService::new(
        persistence_service.clone(),
        Arc::new(DefaultDischargeCurrentCalculator),
    );
    let report_service =
        ReportGenerationService::new(persistence_service.clone(), reports_dir.clone());

    // 完整的测试活动: 测试 -> 电池组 -> 循环 -> OCV + 2次CCV读数
    let test = campaign_service
        .create_test(create_test_request("JOB-IT-001"))
        .await
        .expect("create test");

    let bank = campaign_service
        .create_bank(BankCreate {
            test_id: test.id.clone(),
            bank_number: 1,
            cell_type: CellType::KPM,
            cell_rate: 100.0,
            percentage_capacity: 40.0,
            number_of_cells: 10,
        })
        .await
        .expect("create bank");
    assert_eq!(bank.discharge_current, 40.0);

    let cycle = campaign_service
        .create_cycle(CycleCreate {
            bank_id: bank.id.clone(),
            cycle_number: 1,
            reading_type: "discharge".to_string(),
        })
        .await
        .expect("create cycle");

    for (reading_number, is_ocv, first, rest) in [
        (1, true, 3.7, 3.68),
        (2, false, 3.5, 3.48),
        (3, false, 3.45, 3.43),
    ] {
        campaign_service
            .create_reading(ReadingCreate {
                cycle_id: cycle.id.clone(),
                reading_number,
                is_ocv,
                cell_values: cell_values(first, rest),
            })
            .await
            .expect("create reading");
    }

    let completed_cycle = campaign_service
        .complete_cycle(&cycle.id)
        .await
        .expect("complete cycle")
        .expect("cycle exists");
    assert!(completed_cycle.end_time.is_some());

    tokio_test::assert_ok!(
        campaign_service
            .update_test_status(&test.id, TestStatus::Completed)
            .await
    );

    // 导出CSV报告并核对内容
    let report_path = report_service
        .export_csv_report(&test.id, &bank.id)
        .await
        .expect("export csv report");
    assert_eq!(
        report_path.file_name().and_then(|n| n.to_str()),
        Some("JOB-IT-001_bank1_report.csv")
    );
    assert!(report_path.starts_with(&reports_dir));

    let content = std::fs::read_to_string(&report_path).expect("read report file");
    let lines: Vec<&str> = content.lines().collect();
    // 8行元数据 + 空行 + 表头 + 10行单体
    assert_eq!(lines.len(), 20);
    assert_eq!(lines[0], "Job Number,JOB-IT-001");
    assert_eq!(lines[6], "Discharge Current,40");
    assert_eq!(lines[9], "Cell Number,OCV,CCV 1,CCV 2");
    assert_eq!(lines[10], "1,3.7,3.5,3.45");
    assert_eq!(lines[19], "10,3.68,3.48,3.43");

    // 重开数据库文件，验证数据确实落盘
    let reopened = SqliteOrmPersistenceService::new(Some(&db_path))
        .await
        .expect("reopen db file");

    // 按工号查询只返回测试本身，不装配层级
    let found = reopened
        .find_test_by_job_number("JOB-IT-001")
        .await
        .expect("find by job number")
        .expect("test persisted");
    assert_eq!(found.status, TestStatus::Completed);
    assert!(found.banks.is_empty());

    // 按ID加载返回完整层级
    let reloaded = reopened
        .get_test(&found.id)
        .await
        .expect("load test")
        .expect("test exists");
    assert_eq!(reloaded.banks.len(), 1);
    let reloaded_bank = &reloaded.banks[0];
    assert_eq!(reloaded_bank.discharge_current, 40.0);
    assert_eq!(reloaded_bank.cycles.len(), 1);
    let reloaded_cycle = &reloaded_bank.cycles[0];
    assert!(reloaded_cycle.end_time.is_some());
    assert_eq!(reloaded_cycle.readings.len(), 3);
    for reading in &reloaded_cycle.readings {
        assert_eq!(reading.cell_values.len(), 10);
    }
}

#[tokio::test]
async fn test_export_report_for_unknown_bank_fails() {
    let temp_dir = TempDir::new().expect("create temp dir");

    let persistence_service = Arc::new(
        SqliteOrmPersistenceService::new_in_memory()
            .await
            .expect("create in-memory service"),
    );
    let campaign_service = TestCampaignService::new(
        persistence_service.clone(),
        Arc::new(DefaultDischargeCurrentCalculator),
    );
    let report_service = ReportGenerationService::new(
        persistence_service,
        temp_dir.path().join("reports"),
    );

    let test = campaign_service
        .create_test(create_test_request("JOB-IT-002"))
        .await
        .expect("create test");

    let missing_bank = report_service
        .export_csv_report(&test.id, "no_such_bank")
        .await;
    assert!(matches!(
        missing_bank,
        Err(AppError::NotFoundError { .. })
    ));

    let missing_test = report_service
        .export_csv_report("no_such_test", "no_such_bank")
        .await;
    assert!(matches!(
        missing_test,
        Err(AppError::NotFoundError { .. })
    ));
}
