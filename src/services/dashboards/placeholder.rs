//! 样例数据提供者
//!
//! 固定、确定性的样例载荷，供前端在真实数据就绪前联调使用。
//! 不产生随机数，不读存储；时间戳统一取一个固定的参考时刻，
//! 重复请求返回完全相同的数值。

use async_trait::async_trait;

use crate::models::ServiceError;
use crate::models::analytics::responses::{
    CourseAnalyticsResponse, CourseOverview, EngagementMetric, PerformanceMetric, ProgressBucket,
    Trend,
};
use crate::models::dashboards::responses::{
    Achievement, AdminCourseMetrics, AdminDashboardResponse, CourseMetricsRow, CourseProgressRow,
    LearningStats, PlatformStats, PopularCourseRow, RecentActivity, StudentDashboardResponse,
    StudentProgressRow, SystemHealth, TeacherDashboardResponse, TeachingStats, TopCourseRow,
    UserBreakdown,
};
use crate::storage::RecordStore;

use super::provider::DashboardProvider;

pub struct PlaceholderAggregator;

// 固定参考时刻，保证载荷字节级可重复
fn reference_time() -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::from_timestamp(1_750_000_000, 0).expect("valid fixed timestamp")
}

#[async_trait]
impl DashboardProvider for PlaceholderAggregator {
    async fn student_dashboard(
        &self,
        _store: &dyn RecordStore,
        _student_id: i64,
    ) -> Result<StudentDashboardResponse, ServiceError> {
        let ts = reference_time();
        Ok(StudentDashboardResponse {
            learning_stats: LearningStats {
                total_courses: 3,
                active_courses: 2,
                completed_courses: 1,
                average_progress: 62,
                total_time_spent: 540,
                weekly_progress_estimated: 67,
            },
            course_progress: vec![
                CourseProgressRow {
                    course_id: 1,
                    course_title: "Rust 程序设计（样例）".to_string(),
                    progress_percentage: 100,
                    completed_sections: 12,
                    completed_exercises: 8,
                    time_spent: 300,
                    last_activity_at: Some(ts),
                },
                CourseProgressRow {
                    course_id: 2,
                    course_title: "网络编程基础（样例）".to_string(),
                    progress_percentage: 55,
                    completed_sections: 6,
                    completed_exercises: 3,
                    time_spent: 180,
                    last_activity_at: Some(ts),
                },
                CourseProgressRow {
                    course_id: 3,
                    course_title: "数据库原理（样例）".to_string(),
                    progress_percentage: 30,
                    completed_sections: 3,
                    completed_exercises: 1,
                    time_spent: 60,
                    last_activity_at: Some(ts),
                },
            ],
            recent_activity: vec![RecentActivity {
                course_id: 1,
                course_title: "Rust 程序设计（样例）".to_string(),
                action: "course_completed".to_string(),
                timestamp: ts,
            }],
            achievements: vec![Achievement {
                id: "course_completer".to_string(),
                title: "Course Completer".to_string(),
                description: "完成第一门课程".to_string(),
                category: "course".to_string(),
                unlocked_at: ts,
            }],
        })
    }

    async fn teacher_dashboard(
        &self,
        _store: &dyn RecordStore,
        _teacher_id: i64,
    ) -> Result<TeacherDashboardResponse, ServiceError> {
        let ts = reference_time();
        Ok(TeacherDashboardResponse {
            teaching_stats: TeachingStats {
                total_courses: 2,
                total_students: 48,
                average_progress: 58,
                pending_grading: 7,
            },
            course_metrics: vec![
                CourseMetricsRow {
                    course_id: 1,
                    course_title: "Rust 程序设计（样例）".to_string(),
                    enrolled_students: 30,
                    average_progress: 64,
                    average_score: Some(82.5),
                },
                CourseMetricsRow {
                    course_id: 2,
                    course_title: "网络编程基础（样例）".to_string(),
                    enrolled_students: 18,
                    average_progress: 49,
                    average_score: None,
                },
            ],
            recent_activity: vec![RecentActivity {
                course_id: 1,
                course_title: "Rust 程序设计（样例）".to_string(),
                action: "progress_update".to_string(),
                timestamp: ts,
            }],
            student_progress: vec![StudentProgressRow {
                student_id: 1001,
                student_name: "示例学生".to_string(),
                course_id: 1,
                course_title: "Rust 程序设计（样例）".to_string(),
                progress_percentage: 72,
                last_activity_at: Some(ts),
            }],
        })
    }

    async fn admin_dashboard(
        &self,
        _store: &dyn RecordStore,
    ) -> Result<AdminDashboardResponse, ServiceError> {
        Ok(AdminDashboardResponse {
            platform_stats: PlatformStats {
                total_users: 520,
                total_courses: 24,
                total_promotions: 8,
                total_progress_records: 410,
                total_submissions: 1870,
                platform_engagement: 73,
            },
            user_breakdown: UserBreakdown {
                students: 480,
                teachers: 28,
                staff: 8,
                admins: 4,
            },
            course_metrics: AdminCourseMetrics {
                most_popular: vec![PopularCourseRow {
                    course_id: 1,
                    course_title: "Rust 程序设计（样例）".to_string(),
                    enrollments: 120,
                }],
                top_performing: vec![TopCourseRow {
                    course_id: 2,
                    course_title: "网络编程基础（样例）".to_string(),
                    completion_rate: 68,
                }],
            },
            system_health: SystemHealth::default(),
        })
    }

    async fn course_analytics(
        &self,
        _store: &dyn RecordStore,
        course_id: i64,
    ) -> Result<CourseAnalyticsResponse, ServiceError> {
        Ok(CourseAnalyticsResponse {
            overview: CourseOverview {
                course_id,
                course_title: "样例课程".to_string(),
                total_enrollments: 40,
                average_progress: 57,
                completion_rate: 35,
                dropout_rate: 5,
            },
            // 四桶之和 == 40，与 total_enrollments 的不变量一致
            progress_distribution: vec![
                ProgressBucket {
                    range: "0-25".to_string(),
                    count: 8,
                },
                ProgressBucket {
                    range: "26-50".to_string(),
                    count: 10,
                },
                ProgressBucket {
                    range: "51-75".to_string(),
                    count: 12,
                },
                ProgressBucket {
                    range: "76-100".to_string(),
                    count: 10,
                },
            ],
            performance_metrics: vec![
                PerformanceMetric {
                    metric: "average_progress".to_string(),
                    value: 57.0,
                    trend: Trend::Stable,
                },
                PerformanceMetric {
                    metric: "completion_rate".to_string(),
                    value: 35.0,
                    trend: Trend::Stable,
                },
                PerformanceMetric {
                    metric: "average_time_spent_minutes".to_string(),
                    value: 210.0,
                    trend: Trend::Stable,
                },
            ],
            engagement_metrics: vec![
                EngagementMetric {
                    metric: "active_students_7d".to_string(),
                    value: 22.0,
                },
                EngagementMetric {
                    metric: "participation_rate".to_string(),
                    value: 80.0,
                },
                EngagementMetric {
                    metric: "average_time_spent_minutes".to_string(),
                    value: 210.0,
                },
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_placeholder_analytics_buckets_sum_to_total() {
        let store = crate::storage::memory::MemoryRecordStore::new();
        let analytics = PlaceholderAggregator
            .course_analytics(&store, 42)
            .await
            .unwrap();
        let sum: i64 = analytics
            .progress_distribution
            .iter()
            .map(|b| b.count)
            .sum();
        assert_eq!(sum, analytics.overview.total_enrollments);
        assert_eq!(analytics.overview.course_id, 42);
    }
}
