//! 仪表盘提供者
//!
//! 同一组聚合接口的两个实现：
//! - RealAggregator：真实聚合，走存储层
//! - PlaceholderAggregator：固定确定性样例数据，供前端早期联调
//!
//! 用哪个由 `dashboard.provider` 配置在启动时决定，
//! 绝不由引用了哪个源文件决定。

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use crate::config::AppConfig;
use crate::models::ServiceError;
use crate::models::analytics::responses::CourseAnalyticsResponse;
use crate::models::dashboards::responses::{
    AdminDashboardResponse, StudentDashboardResponse, TeacherDashboardResponse,
};
use crate::storage::RecordStore;

use super::{admin, placeholder, student, teacher};
use crate::services::analytics::course;

#[async_trait]
pub trait DashboardProvider: Send + Sync {
    async fn student_dashboard(
        &self,
        store: &dyn RecordStore,
        student_id: i64,
    ) -> Result<StudentDashboardResponse, ServiceError>;

    async fn teacher_dashboard(
        &self,
        store: &dyn RecordStore,
        teacher_id: i64,
    ) -> Result<TeacherDashboardResponse, ServiceError>;

    async fn admin_dashboard(
        &self,
        store: &dyn RecordStore,
    ) -> Result<AdminDashboardResponse, ServiceError>;

    async fn course_analytics(
        &self,
        store: &dyn RecordStore,
        course_id: i64,
    ) -> Result<CourseAnalyticsResponse, ServiceError>;
}

/// 真实聚合器
pub struct RealAggregator;

#[async_trait]
impl DashboardProvider for RealAggregator {
    async fn student_dashboard(
        &self,
        store: &dyn RecordStore,
        student_id: i64,
    ) -> Result<StudentDashboardResponse, ServiceError> {
        student::compute_student_dashboard(store, student_id).await
    }

    async fn teacher_dashboard(
        &self,
        store: &dyn RecordStore,
        teacher_id: i64,
    ) -> Result<TeacherDashboardResponse, ServiceError> {
        teacher::compute_teacher_dashboard(store, teacher_id).await
    }

    async fn admin_dashboard(
        &self,
        store: &dyn RecordStore,
    ) -> Result<AdminDashboardResponse, ServiceError> {
        admin::compute_admin_dashboard(store).await
    }

    async fn course_analytics(
        &self,
        store: &dyn RecordStore,
        course_id: i64,
    ) -> Result<CourseAnalyticsResponse, ServiceError> {
        course::compute_course_analytics(store, course_id).await
    }
}

/// 按配置创建提供者
///
/// 未知的配置值按 real 处理并告警，不让拼写错误悄悄换成样例数据。
pub fn create_provider() -> Arc<dyn DashboardProvider> {
    let config = AppConfig::get();
    match config.dashboard.provider.as_str() {
        "placeholder" => Arc::new(placeholder::PlaceholderAggregator),
        "real" => Arc::new(RealAggregator),
        other => {
            warn!("未知的仪表盘提供者配置 '{}'，使用 real", other);
            Arc::new(RealAggregator)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryRecordStore;

    #[tokio::test]
    async fn test_placeholder_is_deterministic() {
        let store = MemoryRecordStore::new();
        let provider = placeholder::PlaceholderAggregator;

        // 不依赖存储内容，重复调用结果一致
        let a = provider.student_dashboard(&store, 1).await.unwrap();
        let b = provider.student_dashboard(&store, 1).await.unwrap();
        assert_eq!(
            a.learning_stats.total_courses,
            b.learning_stats.total_courses
        );
        assert_eq!(a.course_progress.len(), b.course_progress.len());
    }
}
