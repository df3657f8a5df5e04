/// 领域服务层模块
/// 包含核心业务逻辑和领域对象

/// 放电电流计算器 - 电池组创建时的派生字段计算
pub mod discharge_current;

// 重新导出常用类型
pub use discharge_current::{
    compute_discharge_current, DefaultDischargeCurrentCalculator, IDischargeCurrentCalculator,
};
