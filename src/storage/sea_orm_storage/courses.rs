use super::SeaOrmStorage;
use crate::entity::courses::{Column, Entity as Courses};
use crate::errors::{LPSystemError, Result};
use crate::models::courses::entities::Course;
use sea_orm::{ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};

impl SeaOrmStorage {
    /// 通过 ID 获取课程
    pub async fn find_course_by_id_impl(&self, id: i64) -> Result<Option<Course>> {
        let result = Courses::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LPSystemError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(result.map(|m| m.into_course()))
    }

    /// 批量获取课程
    pub async fn find_courses_by_ids_impl(&self, ids: &[i64]) -> Result<Vec<Course>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = Courses::find()
            .filter(Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(|e| LPSystemError::database_operation(format!("批量查询课程失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_course()).collect())
    }

    /// 列出某用户作为讲师或协作者的课程
    ///
    /// collaborator_ids 是 JSON 文本列，SQL 侧只做粗匹配，
    /// 解析后在 Rust 侧做精确过滤（避免 "2" 命中 "12"）。
    pub async fn find_courses_by_instructor_or_collaborator_impl(
        &self,
        user_id: i64,
    ) -> Result<Vec<Course>> {
        let result = Courses::find()
            .filter(
                Condition::any()
                    .add(Column::InstructorId.eq(user_id))
                    .add(Column::CollaboratorIds.contains(user_id.to_string())),
            )
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| LPSystemError::database_operation(format!("查询教师课程失败: {e}")))?;

        Ok(result
            .into_iter()
            .map(|m| m.into_course())
            .filter(|c| c.instructor_id == user_id || c.collaborator_ids.contains(&user_id))
            .collect())
    }

    /// 统计课程总数
    pub async fn count_courses_impl(&self) -> Result<i64> {
        let count = Courses::find()
            .count(&self.db)
            .await
            .map_err(|e| LPSystemError::database_operation(format!("统计课程数量失败: {e}")))?;

        Ok(count as i64)
    }
}
