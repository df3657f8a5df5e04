//! 放电电流计算器
//! 根据电池组的单体倍率和容量百分比推导放电电流

use crate::models::structs::BankCreate;

/// 放电电流的推导公式
///
/// 报告与存储使用同一结果，电流只在创建电池组时计算一次
pub fn compute_discharge_current(cell_rate: f64, percentage_capacity: f64) -> f64 {
    percentage_capacity * cell_rate / 100.0
}

pub trait IDischargeCurrentCalculator: Send + Sync {
    fn calc_discharge_current(&self, request: &BankCreate) -> f64;
}

pub struct DefaultDischargeCurrentCalculator;

impl IDischargeCurrentCalculator for DefaultDischargeCurrentCalculator {
    fn calc_discharge_current(&self, request: &BankCreate) -> f64 {
        compute_discharge_current(request.cell_rate, request.percentage_capacity)
    }
}
