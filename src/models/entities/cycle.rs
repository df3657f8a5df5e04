use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::models::structs::default_id;

/// 充放电循环实体
///
/// 电池组下的一轮充电或放电过程
/// 时长在记录结束时间时计算（分钟）
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cycles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(default = "default_id")]
    pub id: String,                              // 循环ID

    pub bank_id: String,                         // 所属电池组ID
    pub cycle_number: i32,                       // 循环号（从1开始）

    #[sea_orm(column_type = "Text")]
    pub reading_type: String,                    // 读数类型描述

    pub start_time: DateTime<Utc>,               // 循环开始时间
    #[sea_orm(nullable)]
    pub end_time: Option<DateTime<Utc>>,         // 循环结束时间
    #[sea_orm(nullable)]
    pub duration_minutes: Option<i64>,           // 循环时长（分钟）

    pub created_at: DateTime<Utc>,               // 创建时间
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bank::Entity",
        from = "Column::BankId",
        to = "super::bank::Column::Id"
    )]
    Bank,
    #[sea_orm(has_many = "super::reading::Entity")]
    Reading,
}

impl Related<super::bank::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bank.def()
    }
}

impl Related<super::reading::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reading.def()
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

impl From<&crate::models::structs::Cycle> for ActiveModel {
    fn from(original: &crate::models::structs::Cycle) -> Self {
        Self {
            id: Set(original.id.clone()),
            bank_id: Set(original.bank_id.clone()),
            cycle_number: Set(original.cycle_number),
            reading_type: Set(original.reading_type.clone()),
            start_time: Set(original.start_time),
            end_time: Set(original.end_time),
            duration_minutes: Set(original.duration_minutes),
            created_at: Set(original.created_at),
        }
    }
}

impl From<&Model> for crate::models::structs::Cycle {
    fn from(model: &Model) -> Self {
        crate::models::structs::Cycle {
            id: model.id.clone(),
            bank_id: model.bank_id.clone(),
            cycle_number: model.cycle_number,
            reading_type: model.reading_type.clone(),
            start_time: model.start_time,
            end_time: model.end_time,
            duration_minutes: model.duration_minutes,
            created_at: model.created_at,
            // 子集合由持久化层按需装配
            readings: Vec::new(),
        }
    }
}
