use super::SeaOrmStorage;
use crate::entity::promotions::{Column, Entity as Promotions};
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{LPSystemError, Result};
use crate::models::promotions::entities::Promotion;
use crate::models::users::entities::UserRole;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};

impl SeaOrmStorage {
    /// 列出课程列表包含某课程的班期
    ///
    /// course_ids 是 JSON 文本列，SQL 侧粗匹配 + Rust 侧精确过滤。
    pub async fn find_promotions_containing_course_impl(
        &self,
        course_id: i64,
    ) -> Result<Vec<Promotion>> {
        let result = Promotions::find()
            .filter(Column::CourseIds.contains(course_id.to_string()))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| LPSystemError::database_operation(format!("查询班期失败: {e}")))?;

        Ok(result
            .into_iter()
            .map(|m| m.into_promotion())
            .filter(|p| p.course_ids.contains(&course_id))
            .collect())
    }

    /// 列出班期（带上限）
    pub async fn list_promotions_impl(&self, limit: u64) -> Result<Vec<Promotion>> {
        let result = Promotions::find()
            .order_by_desc(Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| LPSystemError::database_operation(format!("列出班期失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_promotion()).collect())
    }

    /// 统计班期总数
    pub async fn count_promotions_impl(&self) -> Result<i64> {
        let count = Promotions::find()
            .count(&self.db)
            .await
            .map_err(|e| LPSystemError::database_operation(format!("统计班期数量失败: {e}")))?;

        Ok(count as i64)
    }

    /// 统计班期内学生数
    pub async fn count_students_in_promotion_impl(&self, promotion_id: i64) -> Result<i64> {
        let count = Users::find()
            .filter(UserColumn::CurrentPromotionId.eq(promotion_id))
            .filter(UserColumn::Role.eq(UserRole::Student.to_string()))
            .count(&self.db)
            .await
            .map_err(|e| {
                LPSystemError::database_operation(format!("统计班期学生数量失败: {e}"))
            })?;

        Ok(count as i64)
    }
}
