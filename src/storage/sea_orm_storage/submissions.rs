use super::SeaOrmStorage;
use crate::entity::submissions::{Column, Entity as Submissions};
use crate::errors::{LPSystemError, Result};
use crate::models::submissions::entities::ExerciseSubmission;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};

impl SeaOrmStorage {
    /// 列出学生的全部提交
    pub async fn find_submissions_by_student_impl(
        &self,
        student_id: i64,
    ) -> Result<Vec<ExerciseSubmission>> {
        let result = Submissions::find()
            .filter(Column::StudentId.eq(student_id))
            .order_by_desc(Column::SubmittedAt)
            .all(&self.db)
            .await
            .map_err(|e| LPSystemError::database_operation(format!("查询学生提交失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_submission()).collect())
    }

    /// 列出命中练习ID集合的提交
    pub async fn find_submissions_by_exercise_ids_impl(
        &self,
        exercise_ids: &[String],
    ) -> Result<Vec<ExerciseSubmission>> {
        if exercise_ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = Submissions::find()
            .filter(Column::ExerciseId.is_in(exercise_ids.iter().cloned()))
            .order_by_desc(Column::SubmittedAt)
            .all(&self.db)
            .await
            .map_err(|e| LPSystemError::database_operation(format!("查询练习提交失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_submission()).collect())
    }

    /// 统计提交总数
    pub async fn count_submissions_impl(&self) -> Result<i64> {
        let count = Submissions::find()
            .count(&self.db)
            .await
            .map_err(|e| {
                LPSystemError::database_operation(format!("统计提交数量失败: {e}"))
            })?;

        Ok(count as i64)
    }
}
