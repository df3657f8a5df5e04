/// 应用层服务模块
///
/// 应用层负责协调领域服务和基础设施服务，实现完整的业务流程
/// 提供面向调用方的高级API

/// 测试活动服务 - 测试活动的统一业务入口
pub mod test_campaign_service;

/// 报告生成服务 - 生成逐单体CSV报告
pub mod report_generation_service;

// 重新导出常用类型
pub use test_campaign_service::{ITestCampaignService, TestCampaignService};

// 重新导出服务接口和实现
pub use report_generation_service::{
    reading_statistics, IReportGenerationService, ReadingStatistics, ReportGenerationService,
};
