use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::models::structs::default_id;

/// 读数实体
///
/// 循环内的一次完整电压采集，读数号在所属循环内唯一
/// 单体电压行与读数行在同一事务内写入
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "readings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(default = "default_id")]
    pub id: String,                         // 读数ID

    pub cycle_id: String,                   // 所属循环ID
    pub reading_number: i32,                // 读数号（循环内从1开始）
    pub is_ocv: bool,                       // 是否开路电压读数

    pub timestamp: DateTime<Utc>,           // 采集时间
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cycle::Entity",
        from = "Column::CycleId",
        to = "super::cycle::Column::Id"
    )]
    Cycle,
    #[sea_orm(has_many = "super::cell_value::Entity")]
    CellValue,
}

impl Related<super::cycle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cycle.def()
    }
}

impl Related<super::cell_value::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CellValue.def()
    }
}

impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            id: Set(default_id()),
            timestamp: Set(Utc::now()),
            ..ActiveModelTrait::default()
        }
    }
}

impl From<&crate::models::structs::Reading> for ActiveModel {
    fn from(original: &crate::models::structs::Reading) -> Self {
        Self {
            id: Set(original.id.clone()),
            cycle_id: Set(original.cycle_id.clone()),
            reading_number: Set(original.reading_number),
            is_ocv: Set(original.is_ocv),
            timestamp: Set(original.timestamp),
        }
    }
}

impl From<&Model> for crate::models::structs::Reading {
    fn from(model: &Model) -> Self {
        crate::models::structs::Reading {
            id: model.id.clone(),
            cycle_id: model.cycle_id.clone(),
            reading_number: model.reading_number,
            is_ocv: model.is_ocv,
            timestamp: model.timestamp,
            // 子集合由持久化层按需装配
            cell_values: Vec::new(),
        }
    }
}
