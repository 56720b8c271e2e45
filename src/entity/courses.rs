//! 课程实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub instructor_id: i64,
    // JSON 数组，如 "[2,5]"
    #[sea_orm(column_type = "Text")]
    pub collaborator_ids: String,
    pub status: String,
    // 章节树 JSON（Chapter -> Section -> ContentItem）
    #[sea_orm(column_type = "Text")]
    pub chapters: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::submissions::Entity")]
    Submissions,
}

impl Related<super::submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submissions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_course(self) -> crate::models::courses::entities::Course {
        use crate::models::courses::entities::{Course, CourseStatus};
        use chrono::{DateTime, Utc};

        Course {
            id: self.id,
            title: self.title,
            instructor_id: self.instructor_id,
            collaborator_ids: serde_json::from_str(&self.collaborator_ids).unwrap_or_default(),
            status: self
                .status
                .parse::<CourseStatus>()
                .unwrap_or(CourseStatus::Draft),
            chapters: serde_json::from_str(&self.chapters).unwrap_or_default(),
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
