//! 班期实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "promotions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    // 班期课程列表 JSON 数组，如 "[1,2,3]"
    #[sea_orm(column_type = "Text")]
    pub course_ids: String,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::promotion_progress::Entity")]
    PromotionProgress,
}

impl Related<super::promotion_progress::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PromotionProgress.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_promotion(self) -> crate::models::promotions::entities::Promotion {
        use crate::models::promotions::entities::{Promotion, PromotionStatus};
        use chrono::{DateTime, Utc};

        Promotion {
            id: self.id,
            name: self.name,
            course_ids: serde_json::from_str(&self.course_ids).unwrap_or_default(),
            status: self
                .status
                .parse::<PromotionStatus>()
                .unwrap_or(PromotionStatus::Active),
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
