// 声明 entities 模块下的所有实体
// 表结构：tests -> banks -> cycles -> readings -> cell_values

pub mod test;
pub mod bank;
pub mod cycle;
pub mod reading;
pub mod cell_value;
