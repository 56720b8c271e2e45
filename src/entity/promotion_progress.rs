//! 班期进度实体（选课记录）

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "promotion_progress")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub promotion_id: i64,
    pub student_id: i64,
    // CourseProgress 数组 JSON
    #[sea_orm(column_type = "Text")]
    pub courses: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::promotions::Entity",
        from = "Column::PromotionId",
        to = "super::promotions::Column::Id"
    )]
    Promotion,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::StudentId",
        to = "super::users::Column::Id"
    )]
    Student,
}

impl Related<super::promotions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Promotion.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    /// courses 列是回写列，损坏的 JSON 必须报错而不能降级成空列表，
    /// 否则下一次 save_progress 会把空列表持久化、丢掉整条记录。
    pub fn into_progress(self) -> crate::errors::Result<crate::models::progress::entities::PromotionProgress> {
        use crate::models::progress::entities::PromotionProgress;
        use chrono::{DateTime, Utc};

        Ok(PromotionProgress {
            id: self.id,
            promotion_id: self.promotion_id,
            student_id: self.student_id,
            courses: serde_json::from_str(&self.courses)?,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LPSystemError;

    fn model_with_courses(courses: &str) -> Model {
        Model {
            id: 1,
            promotion_id: 1,
            student_id: 100,
            courses: courses.to_string(),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_valid_course_json_converts() {
        let progress = model_with_courses("[]").into_progress().unwrap();
        assert!(progress.courses.is_empty());
    }

    #[test]
    fn test_corrupt_course_json_is_an_error_not_an_empty_list() {
        let err = model_with_courses("{损坏的列").into_progress().unwrap_err();
        assert!(matches!(err, LPSystemError::Serialization(_)));
    }
}
