//! # 模型枚举类型模块
//!
//! 定义电池测试业务中使用的枚举类型：
//! - **测试状态枚举**: 表示一次测试从排期到完成的状态
//! - **电池类型枚举**: 区分不同规格的电池单体
//!
//! 所有枚举都支持JSON序列化，并提供与持久化字符串的双向转换

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// 测试状态枚举
/// 表示一个电池测试的总体进度状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    /// 已排期，尚未开始
    Scheduled,
    /// 测试进行中
    InProgress,
    /// 测试已完成
    Completed,
}

impl Default for TestStatus {
    fn default() -> Self {
        Self::Scheduled
    }
}

impl Display for TestStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TestStatus::Scheduled => "scheduled",
            TestStatus::InProgress => "in_progress",
            TestStatus::Completed => "completed",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for TestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(TestStatus::Scheduled),
            "in_progress" => Ok(TestStatus::InProgress),
            "completed" => Ok(TestStatus::Completed),
            _ => Err(format!("Invalid TestStatus: {}", s)),
        }
    }
}

/// 电池类型枚举
/// 表示电池组中单体电池的规格型号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellType {
    /// KPL型（低倍率）
    KPL,
    /// KPM型（中倍率）
    KPM,
    /// KPH型（高倍率）
    KPH,
}

impl Default for CellType {
    fn default() -> Self {
        Self::KPL
    }
}

impl Display for CellType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CellType::KPL => "KPL",
            CellType::KPM => "KPM",
            CellType::KPH => "KPH",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for CellType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "KPL" => Ok(CellType::KPL),
            "KPM" => Ok(CellType::KPM),
            "KPH" => Ok(CellType::KPH),
            _ => Err(format!("Invalid CellType: {}", s)),
        }
    }
}
