use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use crate::models::structs::default_id;
use crate::models::enums::TestStatus;

/// 电池测试实体
///
/// 一次测试活动的持久化记录，工号全局唯一
/// 一个测试下挂多个电池组
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(default = "default_id")]
    pub id: String,                         // 测试ID

    #[sea_orm(unique)]
    pub job_number: String,                 // 工号（全局唯一）
    pub customer_name: String,              // 客户名称

    pub number_of_cycles: i32,              // 循环次数（1-5）
    pub time_interval: i32,                 // 读数时间间隔（小时）
    pub start_date: NaiveDate,              // 计划开始日期
    pub start_time: NaiveTime,              // 计划开始时间

    #[sea_orm(column_type = "Text")]
    pub status: String,                     // 测试状态

    pub created_at: DateTime<Utc>,          // 创建时间
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bank::Entity")]
    Bank,
}

impl Related<super::bank::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bank.def()
    }
}

impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            id: Set(default_id()),
            created_at: Set(Utc::now()),
            ..ActiveModelTrait::default()
        }
    }
}

impl From<&crate::models::structs::Test> for ActiveModel {
    fn from(original: &crate::models::structs::Test) -> Self {
        Self {
            id: Set(original.id.clone()),
            job_number: Set(original.job_number.clone()),
            customer_name: Set(original.customer_name.clone()),
            number_of_cycles: Set(original.number_of_cycles),
            time_interval: Set(original.time_interval),
            start_date: Set(original.start_date),
            start_time: Set(original.start_time),
            status: Set(original.status.to_string()),
            created_at: Set(original.created_at),
        }
    }
}

impl From<&Model> for crate::models::structs::Test {
    fn from(model: &Model) -> Self {
        crate::models::structs::Test {
            id: model.id.clone(),
            job_number: model.job_number.clone(),
            customer_name: model.customer_name.clone(),
            number_of_cycles: model.number_of_cycles,
            time_interval: model.time_interval,
            start_date: model.start_date,
            start_time: model.start_time,
            status: model.status.parse().unwrap_or_default(),
            created_at: model.created_at,
            // 子集合由持久化层按需装配
            banks: Vec::new(),
        }
    }
}

impl Model {
    /// 获取测试状态枚举
    pub fn get_status(&self) -> Result<TestStatus, String> {
        self.status.parse()
    }
}
