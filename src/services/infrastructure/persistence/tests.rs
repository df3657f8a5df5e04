#[cfg(test)]
mod tests {
    use crate::models::enums::*;
    use crate::models::structs::*;
    use crate::services::infrastructure::persistence::SqliteOrmPersistenceService;
    use crate::services::traits::{BaseService, IPersistenceService};
    use crate::utils::error::AppError;
    use chrono::{NaiveDate, NaiveTime};
    use tempfile::TempDir;
    use tokio;

    /// 创建测试用的持久化服务（内存库）
    async fn create_test_service() -> SqliteOrmPersistenceService {
        SqliteOrmPersistenceService::new_in_memory().await.unwrap()
    }

    /// 创建测试用的测试创建请求
    fn create_test_request(job_number: &str) -> TestCreate {
        TestCreate {
            job_number: job_number.to_string(),
            customer_name: "华东电力".to_string(),
            number_of_cycles: 2,
            time_interval: 1,
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        }
    }

    /// 创建测试用的电池组创建请求
    fn create_bank_request(test_id: &str, bank_number: i32, number_of_cells: i32) -> BankCreate {
        BankCreate {
            test_id: test_id.to_string(),
            bank_number,
            cell_type: CellType::KPL,
            cell_rate: 100.0,
            percentage_capacity: 40.0,
            number_of_cells,
        }
    }

    /// 创建测试用的循环创建请求
    fn create_cycle_request(bank_id: &str, cycle_number: i32) -> CycleCreate {
        CycleCreate {
            bank_id: bank_id.to_string(),
            cycle_number,
            reading_type: "discharge".to_string(),
        }
    }

    /// 创建测试用的读数创建请求
    fn create_reading_request(
        cycle_id: &str,
        reading_number: i32,
        is_ocv: bool,
        cell_values: &[f64],
    ) -> ReadingCreate {
        ReadingCreate {
            cycle_id: cycle_id.to_string(),
            reading_number,
            is_ocv,
            cell_values: cell_values.to_vec(),
        }
    }

    /// 测试基础服务功能
    #[tokio::test]
    async fn test_base_service_functionality() {
        let mut service = create_test_service().await;

        // 测试服务名称
        assert_eq!(service.service_name(), "SqliteOrmPersistenceService");

        // 测试健康检查
        service.health_check().await.unwrap();

        // 初始化和关闭都应成功
        service.initialize().await.unwrap();
        service.shutdown().await.unwrap();
    }

    /// 文件库：不存在的嵌套目录和文件应自动创建
    #[tokio::test]
    async fn test_file_backed_database_created() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("data").join("campaign.sqlite");

        let service = SqliteOrmPersistenceService::new(Some(&db_path)).await.unwrap();

        assert_eq!(service.db_file_path(), Some(db_path.as_path()));
        assert!(db_path.exists());
        service.health_check().await.unwrap();
    }

    /// 新建测试装配出来是空电池组集合，不是缺失
    #[tokio::test]
    async fn test_fresh_test_hydrates_with_empty_banks() {
        let service = create_test_service().await;

        let created = service.create_test(&create_test_request("JOB-001")).await.unwrap();
        assert_eq!(created.status, TestStatus::Scheduled);
        assert!(created.banks.is_empty());

        let loaded = service.get_test(&created.id).await.unwrap().unwrap();
        assert_eq!(loaded.job_number, "JOB-001");
        assert!(loaded.banks.is_empty());

        // 不存在的ID返回None
        assert!(service.get_test("no_such_id").await.unwrap().is_none());
    }

    /// 工号重复时创建失败且不改变已存数据
    #[tokio::test]
    async fn test_duplicate_job_number_rejected() {
        let service = create_test_service().await;

        service.create_test(&create_test_request("JOB-002")).await.unwrap();

        let mut duplicate = create_test_request("JOB-002");
        duplicate.customer_name = "另一个客户".to_string();
        let result = service.create_test(&duplicate).await;
        assert!(matches!(result, Err(AppError::ConflictError { .. })));

        // 冲突之后仍然只有一条记录，且内容未被覆盖
        let tests = service.list_tests(0, 10).await.unwrap();
        assert_eq!(tests.len(), 1);
        assert_eq!(tests[0].customer_name, "华东电力");
    }

    /// 按工号查询（浅层）
    #[tokio::test]
    async fn test_find_test_by_job_number() {
        let service = create_test_service().await;

        service.create_test(&create_test_request("JOB-003")).await.unwrap();

        let found = service.find_test_by_job_number("JOB-003").await.unwrap();
        assert!(found.is_some());
        assert!(service.find_test_by_job_number("JOB-999").await.unwrap().is_none());
    }

    /// 分页：两条记录分两页取，不重不漏
    #[tokio::test]
    async fn test_list_tests_pagination() {
        let service = create_test_service().await;

        service.create_test(&create_test_request("JOB-A")).await.unwrap();
        service.create_test(&create_test_request("JOB-B")).await.unwrap();

        let first_page = service.list_tests(0, 1).await.unwrap();
        let second_page = service.list_tests(1, 1).await.unwrap();
        assert_eq!(first_page.len(), 1);
        assert_eq!(second_page.len(), 1);
        assert_ne!(first_page[0].id, second_page[0].id);

        let jobs: Vec<&str> = first_page
            .iter()
            .chain(second_page.iter())
            .map(|t| t.job_number.as_str())
            .collect();
        assert!(jobs.contains(&"JOB-A"));
        assert!(jobs.contains(&"JOB-B"));

        // 越过末尾的页为空
        assert!(service.list_tests(2, 1).await.unwrap().is_empty());
    }

    /// 状态更新：存在的ID持久化新状态，不存在的ID返回None且无写入
    #[tokio::test]
    async fn test_update_test_status() {
        let service = create_test_service().await;

        let test = service.create_test(&create_test_request("JOB-004")).await.unwrap();

        let updated = service
            .update_test_status(&test.id, TestStatus::InProgress)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, TestStatus::InProgress);

        let reloaded = service.get_test(&test.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, TestStatus::InProgress);

        let missing = service
            .update_test_status("no_such_id", TestStatus::Completed)
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    /// 电池组创建：父测试必须存在，测试内组号唯一
    #[tokio::test]
    async fn test_create_bank_parent_and_uniqueness() {
        let service = create_test_service().await;

        // 父测试不存在
        let orphan = service
            .create_bank(&create_bank_request("no_such_test", 1, 10), 40.0)
            .await;
        assert!(matches!(orphan, Err(AppError::NotFoundError { .. })));

        let test = service.create_test(&create_test_request("JOB-005")).await.unwrap();
        let bank = service
            .create_bank(&create_bank_request(&test.id, 1, 10), 40.0)
            .await
            .unwrap();
        assert_eq!(bank.discharge_current, 40.0);

        // 同测试下组号重复
        let duplicate = service
            .create_bank(&create_bank_request(&test.id, 1, 10), 40.0)
            .await;
        assert!(matches!(duplicate, Err(AppError::ConflictError { .. })));

        // 另一个测试下可以复用同一组号
        let other_test = service.create_test(&create_test_request("JOB-006")).await.unwrap();
        service
            .create_bank(&create_bank_request(&other_test.id, 1, 10), 40.0)
            .await
            .unwrap();
    }

    /// 循环创建：父电池组必须存在
    #[tokio::test]
    async fn test_create_cycle_requires_existing_bank() {
        let service = create_test_service().await;

        let orphan = service.create_cycle(&create_cycle_request("no_such_bank", 1)).await;
        assert!(matches!(orphan, Err(AppError::NotFoundError { .. })));

        let test = service.create_test(&create_test_request("JOB-007")).await.unwrap();
        let bank = service
            .create_bank(&create_bank_request(&test.id, 1, 10), 40.0)
            .await
            .unwrap();

        let cycle = service.create_cycle(&create_cycle_request(&bank.id, 1)).await.unwrap();
        assert!(cycle.end_time.is_none());
        assert!(cycle.duration_minutes.is_none());
        assert!(cycle.readings.is_empty());
    }

    /// 结束循环：记录结束时间并计算时长；不存在的ID返回None
    #[tokio::test]
    async fn test_complete_cycle() {
        let service = create_test_service().await;

        let test = service.create_test(&create_test_request("JOB-008")).await.unwrap();
        let bank = service
            .create_bank(&create_bank_request(&test.id, 1, 10), 40.0)
            .await
            .unwrap();
        let cycle = service.create_cycle(&create_cycle_request(&bank.id, 1)).await.unwrap();

        let completed = service.complete_cycle(&cycle.id).await.unwrap().unwrap();
        assert!(completed.end_time.is_some());
        assert_eq!(completed.duration_minutes, Some(0));

        let reloaded = service.get_cycle(&cycle.id).await.unwrap().unwrap();
        assert!(reloaded.end_time.is_some());

        assert!(service.complete_cycle("no_such_cycle").await.unwrap().is_none());
    }

    /// 读数创建：单体编号由电压列表位置派生，从1开始连续编号
    #[tokio::test]
    async fn test_create_reading_maps_values_by_position() {
        let service = create_test_service().await;

        let test = service.create_test(&create_test_request("JOB-009")).await.unwrap();
        let bank = service
            .create_bank(&create_bank_request(&test.id, 1, 3), 40.0)
            .await
            .unwrap();
        let cycle = service.create_cycle(&create_cycle_request(&bank.id, 1)).await.unwrap();

        let reading = service
            .create_reading(&create_reading_request(&cycle.id, 1, true, &[1.1, 2.2, 3.3]))
            .await
            .unwrap();

        assert_eq!(reading.cell_values.len(), 3);
        for (index, cell_value) in reading.cell_values.iter().enumerate() {
            assert_eq!(cell_value.cell_number, index as i32 + 1);
        }
        assert_eq!(reading.cell_values[0].value, 1.1);
        assert_eq!(reading.cell_values[1].value, 2.2);
        assert_eq!(reading.cell_values[2].value, 3.3);

        // 入库后的装配结果与返回值一致
        let loaded = service.get_readings_by_cycle(&cycle.id).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].cell_values.len(), 3);
        assert_eq!(loaded[0].cell_values[2].value, 3.3);
    }

    /// 读数创建的三类失败：循环不存在、数量不一致、读数号重复
    #[tokio::test]
    async fn test_create_reading_failure_modes() {
        let service = create_test_service().await;

        let missing_cycle = service
            .create_reading(&create_reading_request("no_such_cycle", 1, true, &[3.7]))
            .await;
        assert!(matches!(missing_cycle, Err(AppError::NotFoundError { .. })));

        let test = service.create_test(&create_test_request("JOB-010")).await.unwrap();
        let bank = service
            .create_bank(&create_bank_request(&test.id, 1, 3), 40.0)
            .await
            .unwrap();
        let cycle = service.create_cycle(&create_cycle_request(&bank.id, 1)).await.unwrap();

        // 电压数量与单体数量不一致
        let short_list = service
            .create_reading(&create_reading_request(&cycle.id, 1, true, &[3.7, 3.8]))
            .await;
        assert!(matches!(short_list, Err(AppError::ValidationError { .. })));

        // 失败的写入不应留下任何读数
        assert!(service.get_readings_by_cycle(&cycle.id).await.unwrap().is_empty());

        service
            .create_reading(&create_reading_request(&cycle.id, 1, true, &[3.7, 3.8, 3.9]))
            .await
            .unwrap();

        // 同循环下读数号重复
        let duplicate = service
            .create_reading(&create_reading_request(&cycle.id, 1, false, &[3.5, 3.6, 3.7]))
            .await;
        assert!(matches!(duplicate, Err(AppError::ConflictError { .. })));
    }

    /// 完整装配：各层级都按编号升序返回
    #[tokio::test]
    async fn test_full_hierarchy_hydration_ordering() {
        let service = create_test_service().await;

        let test = service.create_test(&create_test_request("JOB-011")).await.unwrap();

        // 故意先建2号组再建1号组
        let bank2 = service
            .create_bank(&create_bank_request(&test.id, 2, 3), 40.0)
            .await
            .unwrap();
        let bank1 = service
            .create_bank(&create_bank_request(&test.id, 1, 3), 40.0)
            .await
            .unwrap();

        // 1号组下先建2号循环再建1号循环
        let cycle2 = service.create_cycle(&create_cycle_request(&bank1.id, 2)).await.unwrap();
        let cycle1 = service.create_cycle(&create_cycle_request(&bank1.id, 1)).await.unwrap();

        // 1号循环下先写2号读数再写1号读数
        service
            .create_reading(&create_reading_request(&cycle1.id, 2, false, &[3.5, 3.6, 3.7]))
            .await
            .unwrap();
        service
            .create_reading(&create_reading_request(&cycle1.id, 1, true, &[3.7, 3.8, 3.9]))
            .await
            .unwrap();

        let hydrated = service.get_test(&test.id).await.unwrap().unwrap();
        assert_eq!(hydrated.banks.len(), 2);
        assert_eq!(hydrated.banks[0].id, bank1.id);
        assert_eq!(hydrated.banks[1].id, bank2.id);

        let hydrated_bank1 = &hydrated.banks[0];
        assert_eq!(hydrated_bank1.cycles.len(), 2);
        assert_eq!(hydrated_bank1.cycles[0].id, cycle1.id);
        assert_eq!(hydrated_bank1.cycles[1].id, cycle2.id);

        let hydrated_cycle1 = &hydrated_bank1.cycles[0];
        assert_eq!(hydrated_cycle1.readings.len(), 2);
        assert_eq!(hydrated_cycle1.readings[0].reading_number, 1);
        assert!(hydrated_cycle1.readings[0].is_ocv);
        assert_eq!(hydrated_cycle1.readings[1].reading_number, 2);

        // 单体电压按编号升序
        let cell_numbers: Vec<i32> = hydrated_cycle1.readings[0]
            .cell_values
            .iter()
            .map(|cv| cv.cell_number)
            .collect();
        assert_eq!(cell_numbers, vec![1, 2, 3]);

        // get_bank 从电池组往下装配同样有序
        let loaded_bank = service.get_bank(&bank1.id).await.unwrap().unwrap();
        assert_eq!(loaded_bank.cycles.len(), 2);
        assert_eq!(loaded_bank.cycles[0].readings.len(), 2);

        // get_readings_by_cycle 按读数号升序
        let readings = service.get_readings_by_cycle(&cycle1.id).await.unwrap();
        assert_eq!(readings[0].reading_number, 1);
        assert_eq!(readings[1].reading_number, 2);
    }
}
