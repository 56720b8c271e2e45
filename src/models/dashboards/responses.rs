use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 成就徽章
///
/// 按需从当前统计派生，不落库。unlocked_at 是读取时合成的估计值，
/// 不是真实的首次解锁时间。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub unlocked_at: chrono::DateTime<chrono::Utc>,
}

/// 学生学习统计
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct LearningStats {
    pub total_courses: i64,
    pub active_courses: i64,
    pub completed_courses: i64,
    // 各课程百分比均值，没有课程时为 0
    pub average_progress: i64,
    // 累计学习时长（分钟）
    pub total_time_spent: i64,
    // 启发式估计，不是精确测量
    pub weekly_progress_estimated: i64,
}

/// 学生单课程进度行
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct CourseProgressRow {
    pub course_id: i64,
    pub course_title: String,
    pub progress_percentage: u8,
    pub completed_sections: u32,
    pub completed_exercises: u32,
    pub time_spent: i64,
    pub last_activity_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// 最近活动条目
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct RecentActivity {
    pub course_id: i64,
    pub course_title: String,
    pub action: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// 学生仪表盘响应
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct StudentDashboardResponse {
    pub learning_stats: LearningStats,
    pub course_progress: Vec<CourseProgressRow>,
    pub recent_activity: Vec<RecentActivity>,
    pub achievements: Vec<Achievement>,
}

/// 教学统计
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct TeachingStats {
    pub total_courses: i64,
    pub total_students: i64,
    pub average_progress: i64,
    pub pending_grading: i64,
}

/// 教师单课程分析行
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct CourseMetricsRow {
    pub course_id: i64,
    pub course_title: String,
    pub enrolled_students: i64,
    pub average_progress: i64,
    // 已评分提交的平均分，无提交时为 None
    pub average_score: Option<f64>,
}

/// 学生进度扁平行（教师视角）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct StudentProgressRow {
    pub student_id: i64,
    pub student_name: String,
    pub course_id: i64,
    pub course_title: String,
    pub progress_percentage: u8,
    pub last_activity_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// 教师仪表盘响应
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct TeacherDashboardResponse {
    pub teaching_stats: TeachingStats,
    pub course_metrics: Vec<CourseMetricsRow>,
    pub recent_activity: Vec<RecentActivity>,
    pub student_progress: Vec<StudentProgressRow>,
}

/// 平台统计
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct PlatformStats {
    pub total_users: i64,
    pub total_courses: i64,
    pub total_promotions: i64,
    pub total_progress_records: i64,
    pub total_submissions: i64,
    // round(活跃用户 / 总用户 * 100)
    pub platform_engagement: i64,
}

/// 用户角色分布
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct UserBreakdown {
    pub students: i64,
    pub teachers: i64,
    pub staff: i64,
    pub admins: i64,
}

/// 课程热度行（按班期选课人数合计）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct PopularCourseRow {
    pub course_id: i64,
    pub course_title: String,
    pub enrollments: i64,
}

/// 课程表现行（按完成率）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct TopCourseRow {
    pub course_id: i64,
    pub course_title: String,
    pub completion_rate: i64,
}

/// 管理员课程指标块
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct AdminCourseMetrics {
    pub most_popular: Vec<PopularCourseRow>,
    pub top_performing: Vec<TopCourseRow>,
}

/// 协作服务健康块
///
/// 本服务不做真实健康探测，固定报告已知协作方为 healthy。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct SystemHealth {
    pub database: String,
    pub cache: String,
    pub identity_service: String,
    pub grading_service: String,
}

impl Default for SystemHealth {
    fn default() -> Self {
        Self {
            database: "healthy".to_string(),
            cache: "healthy".to_string(),
            identity_service: "healthy".to_string(),
            grading_service: "healthy".to_string(),
        }
    }
}

/// 管理员仪表盘响应
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct AdminDashboardResponse {
    pub platform_stats: PlatformStats,
    pub user_breakdown: UserBreakdown,
    pub course_metrics: AdminCourseMetrics,
    pub system_health: SystemHealth,
}
