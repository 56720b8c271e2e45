//! 查询熔断
//!
//! 聚合计算触达的记录数超过阈值时不再完成完整计算，改为返回
//! 固定的最小降级结果（一门课程、一条活动、一个成就），把最坏
//! 情况的开销限制在 O(阈值)。牺牲精确性换可用性，触发时只发
//! warn 级诊断，不重试。
//!
//! 阈值来自 `dashboard.guard` 配置（样例值出身，按部署调整）。

use tracing::warn;

use crate::models::analytics::responses::{
    CourseAnalyticsResponse, CourseOverview, EngagementMetric, PerformanceMetric, ProgressBucket,
    Trend,
};
use crate::models::dashboards::responses::{
    Achievement, AdminCourseMetrics, CourseMetricsRow, CourseProgressRow, LearningStats,
    PopularCourseRow, RecentActivity, StudentDashboardResponse, StudentProgressRow, TeachingStats,
    TeacherDashboardResponse, TopCourseRow,
};

/// 阈值检查
///
/// 返回 true 表示熔断触发，调用方应改用对应的降级结果。
/// 必须作为显式检查调用，保证可测试。
pub fn check(len: usize, threshold: usize, context: &str) -> bool {
    if len > threshold {
        warn!(
            "查询熔断触发: {} 记录数 {} 超过阈值 {}，返回降级结果",
            context, len, threshold
        );
        true
    } else {
        false
    }
}

/// 降级学生仪表盘
///
/// 一门课程、一条活动、一个成就，内部数值自洽
/// （统计字段与课程行一致）。
pub fn fallback_student_dashboard() -> StudentDashboardResponse {
    let now = chrono::Utc::now();
    StudentDashboardResponse {
        learning_stats: LearningStats {
            total_courses: 1,
            active_courses: 1,
            completed_courses: 0,
            average_progress: 50,
            total_time_spent: 0,
            weekly_progress_estimated: 0,
        },
        course_progress: vec![CourseProgressRow {
            course_id: 0,
            course_title: "数据量过大，已降级展示".to_string(),
            progress_percentage: 50,
            completed_sections: 0,
            completed_exercises: 0,
            time_spent: 0,
            last_activity_at: Some(now),
        }],
        recent_activity: vec![RecentActivity {
            course_id: 0,
            course_title: "数据量过大，已降级展示".to_string(),
            action: "dashboard_degraded".to_string(),
            timestamp: now,
        }],
        achievements: vec![Achievement {
            id: "first_steps".to_string(),
            title: "First Steps".to_string(),
            description: "完成第一个练习".to_string(),
            category: "exercise".to_string(),
            unlocked_at: now,
        }],
    }
}

/// 降级教师仪表盘
pub fn fallback_teacher_dashboard() -> TeacherDashboardResponse {
    let now = chrono::Utc::now();
    TeacherDashboardResponse {
        teaching_stats: TeachingStats {
            total_courses: 1,
            total_students: 1,
            average_progress: 50,
            pending_grading: 0,
        },
        course_metrics: vec![CourseMetricsRow {
            course_id: 0,
            course_title: "数据量过大，已降级展示".to_string(),
            enrolled_students: 1,
            average_progress: 50,
            average_score: None,
        }],
        recent_activity: vec![RecentActivity {
            course_id: 0,
            course_title: "数据量过大，已降级展示".to_string(),
            action: "dashboard_degraded".to_string(),
            timestamp: now,
        }],
        student_progress: vec![StudentProgressRow {
            student_id: 0,
            student_name: "已降级".to_string(),
            course_id: 0,
            course_title: "数据量过大，已降级展示".to_string(),
            progress_percentage: 50,
            last_activity_at: Some(now),
        }],
    }
}

/// 降级管理员课程指标块
///
/// 平台计数本身是廉价查询不降级，只有课程排行的联表部分
/// 超阈值时换成这个最小块。
pub fn fallback_admin_course_metrics() -> AdminCourseMetrics {
    AdminCourseMetrics {
        most_popular: vec![PopularCourseRow {
            course_id: 0,
            course_title: "数据量过大，已降级展示".to_string(),
            enrollments: 1,
        }],
        top_performing: vec![TopCourseRow {
            course_id: 0,
            course_title: "数据量过大，已降级展示".to_string(),
            completion_rate: 0,
        }],
    }
}

/// 降级课程分析
///
/// 单人样本：四桶之和 == 总人数的不变量在降级结果里同样成立。
pub fn fallback_course_analytics(course_id: i64, course_title: &str) -> CourseAnalyticsResponse {
    CourseAnalyticsResponse {
        overview: CourseOverview {
            course_id,
            course_title: course_title.to_string(),
            total_enrollments: 1,
            average_progress: 50,
            completion_rate: 0,
            dropout_rate: 0,
        },
        progress_distribution: vec![
            ProgressBucket {
                range: "0-25".to_string(),
                count: 0,
            },
            ProgressBucket {
                range: "26-50".to_string(),
                count: 1,
            },
            ProgressBucket {
                range: "51-75".to_string(),
                count: 0,
            },
            ProgressBucket {
                range: "76-100".to_string(),
                count: 0,
            },
        ],
        performance_metrics: vec![PerformanceMetric {
            metric: "average_progress".to_string(),
            value: 50.0,
            trend: Trend::Stable,
        }],
        engagement_metrics: vec![EngagementMetric {
            metric: "active_students".to_string(),
            value: 1.0,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_under_and_over_threshold() {
        assert!(!check(10, 20, "student_enrollments"));
        assert!(!check(20, 20, "student_enrollments")); // 等于阈值不触发
        assert!(check(21, 20, "student_enrollments"));
    }

    #[test]
    fn test_student_fallback_is_internally_consistent() {
        let fallback = fallback_student_dashboard();
        let stats = &fallback.learning_stats;
        assert_eq!(
            stats.total_courses,
            fallback.course_progress.len() as i64
        );
        assert_eq!(fallback.course_progress.len(), 1);
        assert_eq!(fallback.recent_activity.len(), 1);
        assert_eq!(fallback.achievements.len(), 1);
        // 统计字段与唯一课程行一致
        assert_eq!(
            stats.average_progress,
            fallback.course_progress[0].progress_percentage as i64
        );
    }

    #[test]
    fn test_analytics_fallback_buckets_sum_to_total() {
        let fallback = fallback_course_analytics(7, "测试课程");
        let sum: i64 = fallback
            .progress_distribution
            .iter()
            .map(|b| b.count)
            .sum();
        assert_eq!(sum, fallback.overview.total_enrollments);
        assert_eq!(fallback.progress_distribution.len(), 4);
    }
}
