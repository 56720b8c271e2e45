use std::sync::Arc;

use crate::models::{
    courses::entities::Course,
    progress::entities::PromotionProgress,
    promotions::entities::Promotion,
    submissions::entities::ExerciseSubmission,
    users::{entities::User, entities::UserRole, responses::UserRoleCounts},
};

use crate::errors::Result;

pub mod memory;
pub mod sea_orm_storage;

/// 记录存储查询契约
///
/// 聚合引擎只通过该接口访问五类集合（用户/课程/班期/班期进度/提交）。
/// 除 find_or_create_progress 和 save_progress 外全部只读。
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// 用户查询方法
    // 通过ID获取用户
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 按角色统计用户数量
    async fn count_users_by_role(&self) -> Result<UserRoleCounts>;
    // 列出班期内的用户（可按角色过滤）
    async fn find_users_by_promotion(
        &self,
        promotion_id: i64,
        role: Option<UserRole>,
    ) -> Result<Vec<User>>;
    // 统计某时间点后登录过的用户数
    async fn count_active_users_since(
        &self,
        since: chrono::DateTime<chrono::Utc>,
    ) -> Result<i64>;

    /// 课程查询方法
    // 通过ID获取课程
    async fn find_course_by_id(&self, id: i64) -> Result<Option<Course>>;
    // 批量获取课程（用于标题联结）
    async fn find_courses_by_ids(&self, ids: &[i64]) -> Result<Vec<Course>>;
    // 列出某用户作为讲师或协作者的课程
    async fn find_courses_by_instructor_or_collaborator(&self, user_id: i64)
        -> Result<Vec<Course>>;
    // 统计课程总数
    async fn count_courses(&self) -> Result<i64>;

    /// 班期查询方法
    // 列出课程列表包含某课程的班期
    async fn find_promotions_containing_course(&self, course_id: i64) -> Result<Vec<Promotion>>;
    // 列出班期（带上限，供平台级聚合使用）
    async fn list_promotions(&self, limit: u64) -> Result<Vec<Promotion>>;
    // 统计班期总数
    async fn count_promotions(&self) -> Result<i64>;
    // 统计班期内学生数
    async fn count_students_in_promotion(&self, promotion_id: i64) -> Result<i64>;

    /// 进度记录方法
    // 获取或懒创建 (promotion, student) 的进度记录
    async fn find_or_create_progress(
        &self,
        promotion_id: i64,
        student_id: i64,
    ) -> Result<PromotionProgress>;
    // 列出班期的全部进度记录
    async fn find_progress_by_promotion(&self, promotion_id: i64)
        -> Result<Vec<PromotionProgress>>;
    // 保存进度记录（乐观写，最后写入者胜出）
    async fn save_progress(&self, record: PromotionProgress) -> Result<PromotionProgress>;
    // 统计进度记录总数
    async fn count_progress_records(&self) -> Result<i64>;

    /// 提交查询方法
    // 列出学生的全部提交
    async fn find_submissions_by_student(&self, student_id: i64)
        -> Result<Vec<ExerciseSubmission>>;
    // 列出命中练习ID集合的提交
    async fn find_submissions_by_exercise_ids(
        &self,
        exercise_ids: &[String],
    ) -> Result<Vec<ExerciseSubmission>>;
    // 统计提交总数
    async fn count_submissions(&self) -> Result<i64>;
}

pub async fn create_storage() -> Result<Arc<dyn RecordStore>> {
    let config = crate::config::AppConfig::get();
    if config.database.url == "memory" {
        tracing::warn!("Using in-memory record store; data will not survive a restart");
        return Ok(Arc::new(memory::MemoryRecordStore::new()));
    }

    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
