use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};
use crate::models::structs::default_id;

/// 单体电压实体
///
/// 一次读数中某个单体电池的电压值
/// 单体编号由服务端按电压列表位置派生，从1开始连续
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cell_values")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(default = "default_id")]
    pub id: String,                         // 单体电压ID

    pub reading_id: String,                 // 所属读数ID
    pub cell_number: i32,                   // 单体编号（从1开始）
    pub value: f64,                         // 电压值（V）
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::reading::Entity",
        from = "Column::ReadingId",
        to = "super::reading::Column::Id"
    )]
    Reading,
}

impl Related<super::reading::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reading.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&crate::models::structs::CellValue> for ActiveModel {
    fn from(original: &crate::models::structs::CellValue) -> Self {
        Self {
            id: Set(original.id.clone()),
            reading_id: Set(original.reading_id.clone()),
            cell_number: Set(original.cell_number),
            value: Set(original.value),
        }
    }
}

impl From<&Model> for crate::models::structs::CellValue {
    fn from(model: &Model) -> Self {
        crate::models::structs::CellValue {
            id: model.id.clone(),
            reading_id: model.reading_id.clone(),
            cell_number: model.cell_number,
            value: model.value,
        }
    }
}
