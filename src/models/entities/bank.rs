use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::models::structs::default_id;
use crate::models::enums::CellType;

/// 电池组实体
///
/// 测试下的一个被测电池组，组号在所属测试内唯一
/// 放电电流在创建时由额定容量和容量百分比计算后写入，之后只读
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "banks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(default = "default_id")]
    pub id: String,                         // 电池组ID

    pub test_id: String,                    // 所属测试ID
    pub bank_number: i32,                   // 组号（1-2）

    #[sea_orm(column_type = "Text")]
    pub cell_type: String,                  // 电池类型
    pub cell_rate: f64,                     // 额定容量（Ah）
    pub percentage_capacity: f64,           // 放电容量百分比
    pub number_of_cells: i32,               // 单体电池数量
    pub discharge_current: f64,             // 放电电流（派生字段）

    pub created_at: DateTime<Utc>,          // 创建时间
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::test::Entity",
        from = "Column::TestId",
        to = "super::test::Column::Id"
    )]
    Test,
    #[sea_orm(has_many = "super::cycle::Entity")]
    Cycle,
}

impl Related<super::test::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Test.def()
    }
}

impl Related<super::cycle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cycle.def()
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

impl From<&crate::models::structs::Bank> for ActiveModel {
    fn from(original: &crate::models::structs::Bank) -> Self {
        Self {
            id: Set(original.id.clone()),
            test_id: Set(original.test_id.clone()),
            bank_number: Set(original.bank_number),
            cell_type: Set(original.cell_type.to_string()),
            cell_rate: Set(original.cell_rate),
            percentage_capacity: Set(original.percentage_capacity),
            number_of_cells: Set(original.number_of_cells),
            discharge_current: Set(original.discharge_current),
            created_at: Set(original.created_at),
        }
    }
}

impl From<&Model> for crate::models::structs::Bank {
    fn from(model: &Model) -> Self {
        crate::models::structs::Bank {
            id: model.id.clone(),
            test_id: model.test_id.clone(),
            bank_number: model.bank_number,
            cell_type: model.cell_type.parse().unwrap_or_default(),
            cell_rate: model.cell_rate,
            percentage_capacity: model.percentage_capacity,
            number_of_cells: model.number_of_cells,
            discharge_current: model.discharge_current,
            created_at: model.created_at,
            // 子集合由持久化层按需装配
            cycles: Vec::new(),
        }
    }
}

impl Model {
    /// 获取电池类型枚举
    pub fn get_cell_type(&self) -> Result<CellType, String> {
        self.cell_type.parse()
    }
}
