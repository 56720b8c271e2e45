use super::SeaOrmStorage;
use crate::entity::promotion_progress::{ActiveModel, Column, Entity as ProgressRecords};
use crate::entity::promotions::Entity as Promotions;
use crate::errors::{LPSystemError, Result};
use crate::models::progress::entities::{CourseProgress, PromotionProgress};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};

impl SeaOrmStorage {
    /// 获取或懒创建 (promotion, student) 的进度记录
    ///
    /// 首次创建时按班期课程列表初始化空的 CourseProgress 数组。
    pub async fn find_or_create_progress_impl(
        &self,
        promotion_id: i64,
        student_id: i64,
    ) -> Result<PromotionProgress> {
        let existing = ProgressRecords::find()
            .filter(Column::PromotionId.eq(promotion_id))
            .filter(Column::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(|e| LPSystemError::database_operation(format!("查询进度记录失败: {e}")))?;

        if let Some(model) = existing {
            return model.into_progress();
        }

        // 懒创建：按班期课程列表初始化
        let promotion = Promotions::find_by_id(promotion_id)
            .one(&self.db)
            .await
            .map_err(|e| LPSystemError::database_operation(format!("查询班期失败: {e}")))?
            .ok_or_else(|| LPSystemError::not_found(format!("班期不存在: {promotion_id}")))?
            .into_promotion();

        let courses: Vec<CourseProgress> = promotion
            .course_ids
            .iter()
            .map(|&course_id| CourseProgress::empty(course_id))
            .collect();

        let now = chrono::Utc::now().timestamp();
        let model = ActiveModel {
            promotion_id: Set(promotion_id),
            student_id: Set(student_id),
            courses: Set(serde_json::to_string(&courses)?),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| LPSystemError::database_operation(format!("创建进度记录失败: {e}")))?;

        result.into_progress()
    }

    /// 列出班期的全部进度记录
    pub async fn find_progress_by_promotion_impl(
        &self,
        promotion_id: i64,
    ) -> Result<Vec<PromotionProgress>> {
        let result = ProgressRecords::find()
            .filter(Column::PromotionId.eq(promotion_id))
            .all(&self.db)
            .await
            .map_err(|e| LPSystemError::database_operation(format!("查询进度记录失败: {e}")))?;

        result.into_iter().map(|m| m.into_progress()).collect()
    }

    /// 保存进度记录
    ///
    /// 乐观写：不加行锁，最后写入者胜出。并发丢失的小节标记可由
    /// 客户端重试补偿（section_complete 对完成集合幂等）。
    pub async fn save_progress_impl(&self, record: PromotionProgress) -> Result<PromotionProgress> {
        let model = ActiveModel {
            id: Set(record.id),
            promotion_id: Set(record.promotion_id),
            student_id: Set(record.student_id),
            courses: Set(serde_json::to_string(&record.courses)?),
            created_at: Set(record.created_at.timestamp()),
            updated_at: Set(chrono::Utc::now().timestamp()),
        };

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| LPSystemError::database_operation(format!("保存进度记录失败: {e}")))?;

        result.into_progress()
    }

    /// 统计进度记录总数
    pub async fn count_progress_records_impl(&self) -> Result<i64> {
        let count = ProgressRecords::find()
            .count(&self.db)
            .await
            .map_err(|e| {
                LPSystemError::database_operation(format!("统计进度记录数量失败: {e}"))
            })?;

        Ok(count as i64)
    }
}
