use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 班期状态
#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/promotion.ts")]
pub enum PromotionStatus {
    Active,   // 进行中
    Archived, // 已归档
}

impl<'de> Deserialize<'de> for PromotionStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "active" => Ok(PromotionStatus::Active),
            "archived" => Ok(PromotionStatus::Archived),
            _ => Err(serde::de::Error::custom(format!(
                "无效的班期状态: '{s}'. 支持的状态: active, archived"
            ))),
        }
    }
}

impl std::fmt::Display for PromotionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PromotionStatus::Active => write!(f, "active"),
            PromotionStatus::Archived => write!(f, "archived"),
        }
    }
}

impl std::str::FromStr for PromotionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(PromotionStatus::Active),
            "archived" => Ok(PromotionStatus::Archived),
            _ => Err(format!("Invalid promotion status: {s}")),
        }
    }
}

// 班期实体
//
// 一个班期 = 一届学生 + 固定的课程列表（多对多关系挂在 course_ids 上）。
// 学生名单通过 users.current_promotion_id 反查。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/promotion.ts")]
pub struct Promotion {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub course_ids: Vec<i64>,
    pub status: PromotionStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
